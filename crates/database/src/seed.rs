//! Initial catalog data
//!
//! Seeds a fresh database with a starter set of categories and classic books
//! so the catalog is browsable before anyone uploads. Seeded books read from
//! external URLs; uploads only enter through the normal create flow.

use crate::queries::{books, categories};
use crate::DbPool;
use chrono::NaiveDate;
use openshelf_core::{AppError, BookSource, CategoryId, NewBook};

/// Seeds categories and sample books, but only into an empty database
///
/// Returns whether seeding actually ran. Any existing category or book row
/// makes this a no-op, so calling it on every startup is safe.
pub async fn seed_if_empty(pool: &DbPool) -> Result<bool, AppError> {
    let category_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database("Failed to count categories", e))?;

    let book_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database("Failed to count books", e))?;

    if category_count > 0 || book_count > 0 {
        return Ok(false);
    }

    let fiction = categories::insert_category(pool, "Fiction", 1).await?;
    let sci_fi = categories::insert_category(pool, "Science Fiction", 2).await?;
    let fantasy = categories::insert_category(pool, "Fantasy", 3).await?;
    let non_fiction = categories::insert_category(pool, "Non-Fiction", 4).await?;
    let mystery = categories::insert_category(pool, "Mystery", 5).await?;
    let thriller = categories::insert_category(pool, "Thriller", 6).await?;

    seed_book(
        pool,
        "Dune",
        "Frank Herbert",
        "A landmark science fiction novel set in the distant future amidst a feudal interstellar society.",
        (1965, 8, 1),
        "https://en.wikipedia.org/wiki/Dune_(novel)",
        &[sci_fi],
    )
    .await?;

    seed_book(
        pool,
        "The Hobbit",
        "J.R.R. Tolkien",
        "A fantasy novel and children's book about the quest of home-loving Bilbo Baggins.",
        (1937, 9, 21),
        "https://en.wikipedia.org/wiki/The_Hobbit",
        &[fantasy],
    )
    .await?;

    seed_book(
        pool,
        "Foundation",
        "Isaac Asimov",
        "The first novel in the Foundation Series, following mathematician Hari Seldon's attempt to preserve knowledge.",
        (1951, 6, 1),
        "https://en.wikipedia.org/wiki/Foundation_(Asimov_novel)",
        &[sci_fi],
    )
    .await?;

    seed_book(
        pool,
        "A Game of Thrones",
        "George R.R. Martin",
        "The first novel in A Song of Ice and Fire, a series of epic fantasy novels.",
        (1996, 8, 1),
        "https://en.wikipedia.org/wiki/A_Game_of_Thrones",
        &[fantasy, fiction],
    )
    .await?;

    seed_book(
        pool,
        "Sapiens: A Brief History of Humankind",
        "Yuval Noah Harari",
        "Explores the history of humankind from the Stone Age up to the present day.",
        (2011, 1, 1),
        "https://en.wikipedia.org/wiki/Sapiens:_A_Brief_History_of_Humankind",
        &[non_fiction],
    )
    .await?;

    seed_book(
        pool,
        "The Da Vinci Code",
        "Dan Brown",
        "A mystery thriller novel following symbologist Robert Langdon and cryptologist Sophie Neveu.",
        (2003, 3, 18),
        "https://en.wikipedia.org/wiki/The_Da_Vinci_Code",
        &[mystery, thriller, fiction],
    )
    .await?;

    seed_book(
        pool,
        "1984",
        "George Orwell",
        "A dystopian social science fiction novel and cautionary tale.",
        (1949, 6, 8),
        "https://en.wikipedia.org/wiki/Nineteen_Eighty-Four",
        &[fiction, sci_fi],
    )
    .await?;

    seed_book(
        pool,
        "The Girl with the Dragon Tattoo",
        "Stieg Larsson",
        "A psychological thriller novel that became a posthumous bestseller.",
        (2005, 8, 1),
        "https://en.wikipedia.org/wiki/The_Girl_with_the_Dragon_Tattoo",
        &[mystery, thriller],
    )
    .await?;

    seed_book(
        pool,
        "Cosmos",
        "Carl Sagan",
        "Explores cosmic evolution and human civilization based on the television series.",
        (1980, 10, 12),
        "https://en.wikipedia.org/wiki/Cosmos_(Sagan_book)",
        &[non_fiction, sci_fi],
    )
    .await?;

    Ok(true)
}

async fn seed_book(
    pool: &DbPool,
    title: &str,
    author: &str,
    description: &str,
    published: (i32, u32, u32),
    url: &str,
    category_ids: &[CategoryId],
) -> Result<(), AppError> {
    let (year, month, day) = published;
    let date =
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| AppError::InvalidArgument {
            argument: "published".to_string(),
            reason: format!("invalid date {}-{}-{}", year, month, day),
        })?;

    let mut book = NewBook::new(title, date, BookSource::Url(url.to_string()));
    book.author = Some(author.to_string());
    book.description = Some(description.to_string());

    books::insert_book(pool, &book, category_ids).await?;
    Ok(())
}
