//! Role policy checks applied before protected operations.

use thiserror::Error;

use super::token::CurrentUser;
use crate::domain::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: requires role {required}")]
    Forbidden { required: String },
}

/// Any authenticated caller.
pub const ANY_ROLE: &[Role] = Role::ALL;

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Allows the caller when it holds one of `required`.
pub fn authorize(claim: Option<&CurrentUser>, required: &[Role]) -> Result<(), Denial> {
    let Some(user) = claim else {
        return Err(Denial::Unauthenticated);
    };

    if required.contains(&user.role) {
        Ok(())
    } else {
        Err(Denial::Forbidden {
            required: required
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(" or "),
        })
    }
}

/// Admins may act on any user; everyone else only on themselves.
pub fn authorize_self_or_admin(claim: Option<&CurrentUser>, target_user: i32) -> Result<(), Denial> {
    let Some(user) = claim else {
        return Err(Denial::Unauthenticated);
    };

    if user.is_admin() || user.id == target_user {
        Ok(())
    } else {
        Err(Denial::Forbidden {
            required: Role::Admin.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, role: Role) -> CurrentUser {
        CurrentUser { id, role }
    }

    #[test]
    fn missing_claim_is_unauthenticated() {
        assert_eq!(authorize(None, ANY_ROLE), Err(Denial::Unauthenticated));
        assert_eq!(authorize_self_or_admin(None, 1), Err(Denial::Unauthenticated));
    }

    #[test]
    fn role_outside_required_set_is_forbidden() {
        let caller = user(1, Role::User);
        assert!(matches!(
            authorize(Some(&caller), ADMIN_ONLY),
            Err(Denial::Forbidden { .. })
        ));
    }

    #[test]
    fn matching_role_is_allowed() {
        let admin = user(1, Role::Admin);
        let regular = user(2, Role::User);
        assert!(authorize(Some(&admin), ADMIN_ONLY).is_ok());
        assert!(authorize(Some(&regular), ANY_ROLE).is_ok());
    }

    #[test]
    fn self_access_is_allowed_for_regular_users() {
        let regular = user(7, Role::User);
        assert!(authorize_self_or_admin(Some(&regular), 7).is_ok());
        assert!(matches!(
            authorize_self_or_admin(Some(&regular), 8),
            Err(Denial::Forbidden { .. })
        ));
        assert!(authorize_self_or_admin(Some(&user(1, Role::Admin)), 8).is_ok());
    }

    #[test]
    fn other_users_record_requires_admin() {
        let regular = user(7, Role::User);
        assert_eq!(
            authorize_self_or_admin(Some(&regular), 8),
            Err(Denial::Forbidden {
                required: "admin".to_string()
            })
        );
    }
}
