//! Authorization policy.
//!
//! Pure decision functions over the resolved principal and the target
//! resource's ownership metadata. Handlers call these after principal
//! resolution and before any write. Every denial is `Forbidden`; the only
//! allow paths are ownership, explicit role membership, and the admin
//! override where an entity grants it.

use crate::error::{ServiceError, ServiceResult};
use crate::orm::users::{Model as User, Role};

pub fn is_admin(user: &User) -> bool {
    user.role == Role::Admin
}

/// Gated actions require an active account; deactivated accounts keep
/// read access only.
pub fn require_active(user: &User) -> ServiceResult<()> {
    if !user.is_active {
        log::warn!("Inactive account {} attempted a gated action.", user.id);
        return Err(ServiceError::Forbidden("account is deactivated".to_owned()));
    }
    Ok(())
}

/// Role membership gate. Role sets in use: {admin} for category mutation
/// and the comment as-author path, {organizer, admin} for event creation.
pub fn require_role(user: &User, allowed: &[Role]) -> ServiceResult<()> {
    if allowed.contains(&user.role) {
        return Ok(());
    }
    log::warn!(
        "User {} with role {:?} denied a role-gated action.",
        user.id,
        user.role
    );
    Err(ServiceError::Forbidden(
        "insufficient privileges for this operation".to_owned(),
    ))
}

/// Ownership rule with admin override. Applies to update/delete on users,
/// comments (delete only), reviews, participations, subscriptions and
/// tickets.
pub fn require_owner_or_admin(principal: &User, owner_id: i32, what: &str) -> ServiceResult<()> {
    if principal.id == owner_id || is_admin(principal) {
        return Ok(());
    }
    log::warn!(
        "User {} denied mutation of {} owned by {}.",
        principal.id,
        what,
        owner_id
    );
    Err(ServiceError::Forbidden(format!(
        "you do not own this {what}"
    )))
}

/// Strict ownership rule without the admin override. Comment text edits
/// and event mutations grant no admin bypass.
pub fn require_owner(principal: &User, owner_id: i32, what: &str) -> ServiceResult<()> {
    if principal.id == owner_id {
        return Ok(());
    }
    log::warn!(
        "User {} denied author-only mutation of {} owned by {}.",
        principal.id,
        what,
        owner_id
    );
    Err(ServiceError::Forbidden(format!(
        "only the author may modify this {what}"
    )))
}

/// Ticket access: the ticket holder, the author of the ticket's event, or
/// an admin.
pub fn require_ticket_access(
    principal: &User,
    ticket_owner_id: i32,
    event_author_id: i32,
) -> ServiceResult<()> {
    if principal.id == ticket_owner_id || principal.id == event_author_id || is_admin(principal) {
        return Ok(());
    }
    log::warn!(
        "User {} denied access to a ticket held by {} for an event by {}.",
        principal.id,
        ticket_owner_id,
        event_author_id
    );
    Err(ServiceError::Forbidden(
        "you do not have access to this ticket".to_owned(),
    ))
}

/// Field-level restriction on user updates: `role` and `is_active` are
/// admin-only even on the principal's own row.
pub fn require_admin_fields(principal: &User, touches_admin_fields: bool) -> ServiceResult<()> {
    if !touches_admin_fields || is_admin(principal) {
        return Ok(());
    }
    log::warn!(
        "User {} attempted to change role/is_active without admin rights.",
        principal.id
    );
    Err(ServiceError::Forbidden(
        "only administrators may change role or account status".to_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i32, role: Role) -> User {
        User {
            id,
            email: format!("u{id}@example.com"),
            password: "digest".to_owned(),
            name: None,
            bio: None,
            is_active: true,
            role,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn inactive_accounts_are_gated() {
        let mut inactive = user(1, Role::User);
        inactive.is_active = false;
        assert!(require_active(&inactive).is_err());
        assert!(require_active(&user(1, Role::User)).is_ok());
    }

    #[test]
    fn role_sets_gate_membership() {
        let organizer_or_admin = [Role::Organizer, Role::Admin];
        assert!(require_role(&user(1, Role::Organizer), &organizer_or_admin).is_ok());
        assert!(require_role(&user(1, Role::Admin), &organizer_or_admin).is_ok());
        assert!(require_role(&user(1, Role::User), &organizer_or_admin).is_err());
        assert!(require_role(&user(1, Role::Organizer), &[Role::Admin]).is_err());
    }

    #[test]
    fn owner_may_mutate() {
        assert!(require_owner_or_admin(&user(1, Role::User), 1, "review").is_ok());
    }

    #[test]
    fn stranger_may_not_mutate() {
        assert!(require_owner_or_admin(&user(2, Role::User), 1, "review").is_err());
        assert!(require_owner_or_admin(&user(2, Role::Organizer), 1, "review").is_err());
    }

    #[test]
    fn admin_override_applies() {
        assert!(require_owner_or_admin(&user(2, Role::Admin), 1, "review").is_ok());
    }

    #[test]
    fn author_only_has_no_admin_override() {
        assert!(require_owner(&user(1, Role::User), 1, "comment").is_ok());
        assert!(require_owner(&user(2, Role::Admin), 1, "comment").is_err());
    }

    #[test]
    fn ticket_access_extends_to_event_author() {
        let organizer = user(7, Role::Organizer);
        assert!(require_ticket_access(&organizer, 3, 7).is_ok());
        assert!(require_ticket_access(&user(3, Role::User), 3, 7).is_ok());
        assert!(require_ticket_access(&user(9, Role::Admin), 3, 7).is_ok());
        assert!(require_ticket_access(&user(4, Role::User), 3, 7).is_err());
    }

    #[test]
    fn admin_fields_are_gated() {
        assert!(require_admin_fields(&user(1, Role::User), false).is_ok());
        assert!(require_admin_fields(&user(1, Role::User), true).is_err());
        assert!(require_admin_fields(&user(1, Role::Organizer), true).is_err());
        assert!(require_admin_fields(&user(1, Role::Admin), true).is_ok());
    }
}
