//! Single authorization matrix consulted once per action, instead of
//! role checks re-implemented at every call site.

use crate::error::{HelpdeskError, Result};
use crate::models::Role;

use super::UserIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateTicket,
    ViewOwnTickets,
    ViewAllTickets,
    AssignTicket,
    UpdateTicket,
    CancelTicket,
    ManageUsers,
    ViewDashboard,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateTicket => "create ticket",
            Action::ViewOwnTickets => "view own tickets",
            Action::ViewAllTickets => "view all tickets",
            Action::AssignTicket => "assign ticket",
            Action::UpdateTicket => "update ticket",
            Action::CancelTicket => "cancel ticket",
            Action::ManageUsers => "manage users",
            Action::ViewDashboard => "view dashboard",
        }
    }
}

impl Role {
    /// The capability matrix. Director is read-only: full visibility and
    /// the dashboard, never a write. Cancellation is the administrative
    /// override lane and belongs to Administrator alone.
    pub fn allows(&self, action: Action) -> bool {
        use Action::*;
        match self {
            Role::Collaborator => matches!(action, CreateTicket | ViewOwnTickets),
            Role::Technician => matches!(
                action,
                CreateTicket | ViewOwnTickets | AssignTicket | UpdateTicket
            ),
            Role::Administrator => true,
            Role::Director => matches!(action, ViewAllTickets | ViewDashboard),
        }
    }
}

pub fn authorize(user: &UserIdentity, action: Action) -> Result<()> {
    if user.role.allows(action) {
        Ok(())
    } else {
        Err(HelpdeskError::forbidden(format!(
            "{} may not {}",
            user.role.as_str(),
            action.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> UserIdentity {
        UserIdentity {
            id: 7,
            username: "someone".into(),
            display_name: "Someone".into(),
            role,
            sector: "IT".into(),
        }
    }

    #[test]
    fn collaborator_cannot_assign_or_manage() {
        let user = identity(Role::Collaborator);
        assert!(authorize(&user, Action::CreateTicket).is_ok());
        assert!(authorize(&user, Action::ViewOwnTickets).is_ok());
        assert!(matches!(
            authorize(&user, Action::AssignTicket),
            Err(HelpdeskError::Forbidden(_))
        ));
        assert!(authorize(&user, Action::ManageUsers).is_err());
        assert!(authorize(&user, Action::ViewDashboard).is_err());
    }

    #[test]
    fn director_is_read_only() {
        let user = identity(Role::Director);
        assert!(authorize(&user, Action::ViewAllTickets).is_ok());
        assert!(authorize(&user, Action::ViewDashboard).is_ok());
        assert!(authorize(&user, Action::CreateTicket).is_err());
        assert!(authorize(&user, Action::UpdateTicket).is_err());
        assert!(authorize(&user, Action::AssignTicket).is_err());
    }

    #[test]
    fn technician_capabilities() {
        let user = identity(Role::Technician);
        assert!(authorize(&user, Action::AssignTicket).is_ok());
        assert!(authorize(&user, Action::UpdateTicket).is_ok());
        assert!(authorize(&user, Action::ViewAllTickets).is_err());
        assert!(authorize(&user, Action::CancelTicket).is_err());
        assert!(authorize(&user, Action::ManageUsers).is_err());
    }

    #[test]
    fn administrator_holds_every_capability() {
        let user = identity(Role::Administrator);
        for action in [
            Action::CreateTicket,
            Action::ViewOwnTickets,
            Action::ViewAllTickets,
            Action::AssignTicket,
            Action::UpdateTicket,
            Action::CancelTicket,
            Action::ManageUsers,
            Action::ViewDashboard,
        ] {
            assert!(authorize(&user, action).is_ok());
        }
    }
}
