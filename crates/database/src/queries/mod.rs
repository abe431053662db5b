//! Database query operations organized by entity

pub mod books;
pub mod categories;
pub mod users;

// Re-export commonly used query functions
pub use books::{book_exists, delete_book, get_book, insert_book, try_get_book, update_book};
pub use categories::{
    book_categories, book_category_ids, filter_existing_ids, get_category, insert_category,
    list_categories, list_categories_by_display_order,
};
pub use users::{delete_user, get_user, upsert_user};
