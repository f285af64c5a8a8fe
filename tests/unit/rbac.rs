use campus_desk::db::enums::{Priority, TicketCategory, TicketStatus, UserRole};
use campus_desk::db::models::{Project, ProjectInfo, Ticket};
use campus_desk::db::enums::ProjectStatus;
use campus_desk::rbac::{Action, OwnershipRule, POLICY, TaskGuard, allowed_roles, check_ownership, is_allowed};
use campus_desk::services::context::RequestContext;
use chrono::Utc;
use uuid::Uuid;

fn ctx(role: UserRole) -> RequestContext {
    RequestContext {
        user_id: Uuid::new_v4(),
        name: "Casey".into(),
        email: "casey@example.com".into(),
        role,
        department: None,
        campus_access: vec!["North".into()],
    }
}

fn project(manager_id: Uuid, customer_id: Option<Uuid>, members: Vec<Uuid>) -> ProjectInfo {
    let now = Utc::now();
    ProjectInfo {
        project: Project {
            id: Uuid::new_v4(),
            name: "Library refit".into(),
            description: None,
            manager_id,
            customer_id,
            start_date: None,
            end_date: None,
            status: ProjectStatus::Active,
            created_at: now,
            updated_at: now,
        },
        member_ids: members,
    }
}

fn ticket(reporter_id: Uuid, assignee_id: Option<Uuid>) -> Ticket {
    let now = Utc::now();
    Ticket {
        id: Uuid::new_v4(),
        title: "Projector broken".into(),
        description: "Room 4 projector shows no signal".into(),
        reporter_id,
        assignee_id,
        campus: "North".into(),
        category: TicketCategory::Hardware,
        priority: Priority::High,
        status: TicketStatus::Open,
        sla_deadline: now,
        attachments: vec![],
        resolved_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn every_action_has_a_policy_entry() {
    for (action, roles) in POLICY {
        assert!(!roles.is_empty(), "{} has no roles", action);
        assert_eq!(allowed_roles(*action), *roles);
    }
}

#[test]
fn admin_passes_every_route_gate() {
    for (action, _) in POLICY {
        assert!(is_allowed(UserRole::Admin, *action));
    }
}

#[test]
fn customers_are_limited_to_self_service() {
    assert!(is_allowed(UserRole::Customer, Action::TicketsCreate));
    assert!(is_allowed(UserRole::Customer, Action::ChatsUse));
    assert!(!is_allowed(UserRole::Customer, Action::TasksCreate));
    assert!(!is_allowed(UserRole::Customer, Action::MeetingsCreate));
    assert!(!is_allowed(UserRole::Customer, Action::UsersView));
}

#[test]
fn team_members_update_but_do_not_create_tasks() {
    assert!(is_allowed(UserRole::TeamMember, Action::TasksUpdate));
    assert!(!is_allowed(UserRole::TeamMember, Action::TasksCreate));
    assert!(!is_allowed(UserRole::TeamMember, Action::TasksDelete));
}

#[test]
fn project_manager_owns_and_members_participate() {
    let manager = ctx(UserRole::Manager);
    let member = ctx(UserRole::TeamMember);
    let stranger = ctx(UserRole::TeamMember);
    let info = project(manager.user_id, None, vec![member.user_id]);

    assert!(check_ownership(&manager, &info, OwnershipRule::OwnerOnly).is_ok());
    assert!(check_ownership(&member, &info, OwnershipRule::OwnerOrParticipant).is_ok());
    assert!(check_ownership(&member, &info, OwnershipRule::OwnerOnly).is_err());
    assert!(check_ownership(&stranger, &info, OwnershipRule::OwnerOrParticipant).is_err());
}

#[test]
fn project_customer_can_read_but_not_edit() {
    let customer = ctx(UserRole::Customer);
    let info = project(Uuid::new_v4(), Some(customer.user_id), vec![]);
    assert!(check_ownership(&customer, &info, OwnershipRule::OwnerOrParticipant).is_ok());
    assert!(check_ownership(&customer, &info, OwnershipRule::OwnerOnly).is_err());
}

#[test]
fn admin_bypasses_ownership() {
    let admin = ctx(UserRole::Admin);
    let info = project(Uuid::new_v4(), None, vec![]);
    assert!(check_ownership(&admin, &info, OwnershipRule::OwnerOnly).is_ok());
}

#[test]
fn task_assignees_participate_through_the_guard() {
    let assignee = ctx(UserRole::TeamMember);
    let info = project(Uuid::new_v4(), None, vec![assignee.user_id]);
    let assignees = [assignee.user_id];
    let guard = TaskGuard {
        project: &info.project,
        assignee_ids: &assignees,
    };
    assert!(check_ownership(&assignee, &guard, OwnershipRule::OwnerOrParticipant).is_ok());
    assert!(check_ownership(&assignee, &guard, OwnershipRule::OwnerOnly).is_err());
}

#[test]
fn ticket_reporter_owns_and_assignee_participates() {
    let reporter = ctx(UserRole::Customer);
    let agent = ctx(UserRole::TeamMember);
    let t = ticket(reporter.user_id, Some(agent.user_id));

    assert!(check_ownership(&reporter, &t, OwnershipRule::OwnerOnly).is_ok());
    assert!(check_ownership(&agent, &t, OwnershipRule::OwnerOrParticipant).is_ok());
    assert!(check_ownership(&ctx(UserRole::Customer), &t, OwnershipRule::OwnerOrParticipant).is_err());
}
