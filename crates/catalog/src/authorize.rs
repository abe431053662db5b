//! Mutation authorization
//!
//! Authentication happens outside this system; callers arrive already
//! resolved to a [`Requester`]. Reads need no authorization. Mutations are
//! allowed for the book's owner and for administrators, checked before any
//! file or database work starts.

use openshelf_core::UserId;

/// The resolved identity of the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requester {
    /// None for anonymous visitors
    pub user_id: Option<UserId>,
    pub is_admin: bool,
}

impl Requester {
    /// An unauthenticated visitor
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in user without the administrator role
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            user_id: Some(UserId::new(id)),
            is_admin: false,
        }
    }

    /// A signed-in administrator
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            user_id: Some(UserId::new(id)),
            is_admin: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// True when this caller may edit or delete a book owned by `owner`
    ///
    /// Books whose owner account was deleted keep their `None` owner; from
    /// then on only administrators may modify them.
    pub fn can_modify(&self, owner: Option<&UserId>) -> bool {
        if self.is_admin {
            return true;
        }
        match (owner, &self.user_id) {
            (Some(owner), Some(user)) => owner == user,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_can_modify_own_book() {
        let requester = Requester::user("user-1");
        let owner = UserId::new("user-1");
        assert!(requester.can_modify(Some(&owner)));
    }

    #[test]
    fn test_other_user_cannot_modify() {
        let requester = Requester::user("user-2");
        let owner = UserId::new("user-1");
        assert!(!requester.can_modify(Some(&owner)));
    }

    #[test]
    fn test_admin_can_modify_any_book() {
        let requester = Requester::admin("admin-1");
        let owner = UserId::new("user-1");
        assert!(requester.can_modify(Some(&owner)));
    }

    #[test]
    fn test_anonymous_cannot_modify() {
        let requester = Requester::anonymous();
        let owner = UserId::new("user-1");
        assert!(!requester.is_authenticated());
        assert!(!requester.can_modify(Some(&owner)));
    }

    #[test]
    fn test_orphaned_book_is_admin_only() {
        // The owner account was deleted; the former owner id no longer matches
        let former_owner = Requester::user("user-1");
        assert!(!former_owner.can_modify(None));
        assert!(Requester::admin("admin-1").can_modify(None));
    }
}
