//! Ownership-based authorization for posts and comments.
//!
//! Pure decision functions over already-loaded data. No I/O happens here, so
//! the rules can be exercised without a database.

use super::role::Role;

/// The authenticated identity making a request.
///
/// Built fresh from verified token claims for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }
}

/// A resource tagged with the id of the user who created it.
///
/// The author never changes after creation.
pub trait OwnedResource {
    fn author_id(&self) -> i64;
}

/// Authorization failure raised by resource services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// Actor may not perform this mutation. Carries no detail about why.
    #[error("Access denied")]
    Forbidden,
}

/// Whether `actor` may edit `resource`.
///
/// Authors may edit their own content; Moderators and Admins may edit anything.
pub fn can_edit<R: OwnedResource + ?Sized>(actor: &Actor, resource: &R) -> bool {
    actor.id == resource.author_id() || actor.role >= Role::Moderator
}

/// Whether `actor` may delete `resource`.
///
/// Authors may delete their own content; only Admins may delete anything else.
/// Moderators can edit but not delete.
pub fn can_delete<R: OwnedResource + ?Sized>(actor: &Actor, resource: &R) -> bool {
    actor.id == resource.author_id() || actor.role == Role::Admin
}

/// [`can_edit`] as a `Result`, for use with `?`.
pub fn require_edit<R: OwnedResource + ?Sized>(
    actor: &Actor,
    resource: &R,
) -> Result<(), PermissionError> {
    if can_edit(actor, resource) {
        Ok(())
    } else {
        Err(PermissionError::Forbidden)
    }
}

/// [`can_delete`] as a `Result`, for use with `?`.
pub fn require_delete<R: OwnedResource + ?Sized>(
    actor: &Actor,
    resource: &R,
) -> Result<(), PermissionError> {
    if can_delete(actor, resource) {
        Ok(())
    } else {
        Err(PermissionError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Authored(i64);

    impl OwnedResource for Authored {
        fn author_id(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn test_edit_matches_rule_for_all_roles() {
        for role in Role::all() {
            for (actor_id, author_id) in [(5, 5), (5, 9), (9, 5)] {
                let actor = Actor::new(actor_id, *role);
                let expected = actor_id == author_id
                    || matches!(role, Role::Moderator | Role::Admin);
                assert_eq!(
                    can_edit(&actor, &Authored(author_id)),
                    expected,
                    "edit: actor {actor_id} ({role}) on author {author_id}"
                );
            }
        }
    }

    #[test]
    fn test_delete_matches_rule_for_all_roles() {
        for role in Role::all() {
            for (actor_id, author_id) in [(5, 5), (5, 9), (9, 5)] {
                let actor = Actor::new(actor_id, *role);
                let expected = actor_id == author_id || *role == Role::Admin;
                assert_eq!(
                    can_delete(&actor, &Authored(author_id)),
                    expected,
                    "delete: actor {actor_id} ({role}) on author {author_id}"
                );
            }
        }
    }

    #[test]
    fn test_moderator_can_edit_but_not_delete_others() {
        let moderator = Actor::new(5, Role::Moderator);
        let comment = Authored(9);

        assert!(can_edit(&moderator, &comment));
        assert!(!can_delete(&moderator, &comment));
    }

    #[test]
    fn test_comment_scenario() {
        let own = Authored(5);
        let other = Authored(9);

        assert_eq!(require_edit(&Actor::new(5, Role::User), &own), Ok(()));
        assert_eq!(
            require_edit(&Actor::new(5, Role::User), &other),
            Err(PermissionError::Forbidden)
        );
        assert_eq!(require_edit(&Actor::new(5, Role::Moderator), &other), Ok(()));
        assert_eq!(
            require_delete(&Actor::new(5, Role::Moderator), &other),
            Err(PermissionError::Forbidden)
        );
        assert_eq!(require_delete(&Actor::new(5, Role::Admin), &other), Ok(()));
    }

    #[test]
    fn test_owner_can_always_delete() {
        for role in Role::all() {
            assert!(can_delete(&Actor::new(7, *role), &Authored(7)));
        }
    }

    #[test]
    fn test_forbidden_message_has_no_detail() {
        assert_eq!(PermissionError::Forbidden.to_string(), "Access denied");
    }
}
