use serde::Serialize;

use crate::db::enums::UserRole;
use crate::db::enums::UserRole::{Admin, Customer, Manager, TeamMember};

/// Route categories, written `CATEGORY.VERB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    #[serde(rename = "PROJECTS.VIEW")]
    ProjectsView,
    #[serde(rename = "PROJECTS.CREATE")]
    ProjectsCreate,
    #[serde(rename = "PROJECTS.UPDATE")]
    ProjectsUpdate,
    #[serde(rename = "PROJECTS.DELETE")]
    ProjectsDelete,
    #[serde(rename = "TASKS.VIEW")]
    TasksView,
    #[serde(rename = "TASKS.CREATE")]
    TasksCreate,
    #[serde(rename = "TASKS.UPDATE")]
    TasksUpdate,
    #[serde(rename = "TASKS.DELETE")]
    TasksDelete,
    #[serde(rename = "TIMELOGS.VIEW")]
    TimeLogsView,
    #[serde(rename = "TIMELOGS.CREATE")]
    TimeLogsCreate,
    #[serde(rename = "TICKETS.VIEW")]
    TicketsView,
    #[serde(rename = "TICKETS.CREATE")]
    TicketsCreate,
    #[serde(rename = "TICKETS.UPDATE")]
    TicketsUpdate,
    #[serde(rename = "TICKETS.ASSIGN")]
    TicketsAssign,
    #[serde(rename = "TICKETS.COMMENT")]
    TicketsComment,
    #[serde(rename = "TICKETS.DELETE")]
    TicketsDelete,
    #[serde(rename = "ROOMS.VIEW")]
    RoomsView,
    #[serde(rename = "ROOMS.MANAGE")]
    RoomsManage,
    #[serde(rename = "MEETINGS.VIEW")]
    MeetingsView,
    #[serde(rename = "MEETINGS.CREATE")]
    MeetingsCreate,
    #[serde(rename = "MEETINGS.MANAGE")]
    MeetingsManage,
    #[serde(rename = "CHATS.USE")]
    ChatsUse,
    #[serde(rename = "USERS.VIEW")]
    UsersView,
    #[serde(rename = "USERS.MANAGE")]
    UsersManage,
    #[serde(rename = "NOTIFICATIONS.VIEW")]
    NotificationsView,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ProjectsView => "PROJECTS.VIEW",
            Action::ProjectsCreate => "PROJECTS.CREATE",
            Action::ProjectsUpdate => "PROJECTS.UPDATE",
            Action::ProjectsDelete => "PROJECTS.DELETE",
            Action::TasksView => "TASKS.VIEW",
            Action::TasksCreate => "TASKS.CREATE",
            Action::TasksUpdate => "TASKS.UPDATE",
            Action::TasksDelete => "TASKS.DELETE",
            Action::TimeLogsView => "TIMELOGS.VIEW",
            Action::TimeLogsCreate => "TIMELOGS.CREATE",
            Action::TicketsView => "TICKETS.VIEW",
            Action::TicketsCreate => "TICKETS.CREATE",
            Action::TicketsUpdate => "TICKETS.UPDATE",
            Action::TicketsAssign => "TICKETS.ASSIGN",
            Action::TicketsComment => "TICKETS.COMMENT",
            Action::TicketsDelete => "TICKETS.DELETE",
            Action::RoomsView => "ROOMS.VIEW",
            Action::RoomsManage => "ROOMS.MANAGE",
            Action::MeetingsView => "MEETINGS.VIEW",
            Action::MeetingsCreate => "MEETINGS.CREATE",
            Action::MeetingsManage => "MEETINGS.MANAGE",
            Action::ChatsUse => "CHATS.USE",
            Action::UsersView => "USERS.VIEW",
            Action::UsersManage => "USERS.MANAGE",
            Action::NotificationsView => "NOTIFICATIONS.VIEW",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const EVERYONE: &[UserRole] = &[Admin, Manager, TeamMember, Customer];
const STAFF: &[UserRole] = &[Admin, Manager, TeamMember];
const LEADS: &[UserRole] = &[Admin, Manager];
const ADMINS: &[UserRole] = &[Admin];

/// The allowed-role set for every route category.
pub const POLICY: &[(Action, &[UserRole])] = &[
    (Action::ProjectsView, EVERYONE),
    (Action::ProjectsCreate, LEADS),
    (Action::ProjectsUpdate, LEADS),
    (Action::ProjectsDelete, LEADS),
    (Action::TasksView, EVERYONE),
    (Action::TasksCreate, LEADS),
    (Action::TasksUpdate, STAFF),
    (Action::TasksDelete, LEADS),
    (Action::TimeLogsView, STAFF),
    (Action::TimeLogsCreate, STAFF),
    (Action::TicketsView, EVERYONE),
    (Action::TicketsCreate, EVERYONE),
    (Action::TicketsUpdate, STAFF),
    (Action::TicketsAssign, LEADS),
    (Action::TicketsComment, EVERYONE),
    (Action::TicketsDelete, ADMINS),
    (Action::RoomsView, EVERYONE),
    (Action::RoomsManage, ADMINS),
    (Action::MeetingsView, EVERYONE),
    (Action::MeetingsCreate, STAFF),
    (Action::MeetingsManage, STAFF),
    (Action::ChatsUse, EVERYONE),
    (Action::UsersView, LEADS),
    (Action::UsersManage, ADMINS),
    (Action::NotificationsView, EVERYONE),
];

pub fn allowed_roles(action: Action) -> &'static [UserRole] {
    POLICY
        .iter()
        .find(|(candidate, _)| *candidate == action)
        .map(|(_, roles)| *roles)
        .unwrap_or(&[])
}

/// Pure table lookup. Categories missing from the table deny everyone.
pub fn is_allowed(role: UserRole, action: Action) -> bool {
    allowed_roles(action).contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_action_has_exactly_one_entry() {
        let mut seen = HashSet::new();
        for (action, roles) in POLICY {
            assert!(seen.insert(*action), "{} listed twice", action);
            assert!(!roles.is_empty(), "{} allows nobody", action);
        }
        assert_eq!(seen.len(), POLICY.len());
    }

    #[test]
    fn decisions_match_the_table_for_every_pair() {
        for (action, roles) in POLICY {
            for role in UserRole::ALL {
                assert_eq!(is_allowed(*role, *action), roles.contains(role));
            }
        }
    }

    #[test]
    fn project_mutation_is_for_leads_only() {
        assert!(is_allowed(Admin, Action::ProjectsCreate));
        assert!(is_allowed(Manager, Action::ProjectsUpdate));
        assert!(!is_allowed(TeamMember, Action::ProjectsCreate));
        assert!(!is_allowed(Customer, Action::ProjectsDelete));
    }

    #[test]
    fn customers_can_raise_and_discuss_tickets() {
        assert!(is_allowed(Customer, Action::TicketsCreate));
        assert!(is_allowed(Customer, Action::TicketsComment));
        assert!(!is_allowed(Customer, Action::TicketsUpdate));
        assert!(!is_allowed(Customer, Action::TicketsAssign));
    }

    #[test]
    fn user_management_and_rooms_are_admin_only() {
        for role in [Manager, TeamMember, Customer] {
            assert!(!is_allowed(role, Action::UsersManage));
            assert!(!is_allowed(role, Action::RoomsManage));
        }
        assert!(is_allowed(Admin, Action::UsersManage));
    }

    #[test]
    fn action_names_use_category_dot_verb() {
        assert_eq!(Action::ProjectsCreate.to_string(), "PROJECTS.CREATE");
        assert_eq!(
            serde_json::to_string(&Action::TicketsAssign).unwrap(),
            "\"TICKETS.ASSIGN\""
        );
    }
}
