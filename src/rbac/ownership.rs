use uuid::Uuid;

use crate::db::models::{ChatInfo, MeetingInfo, Project, ProjectInfo, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::context::RequestContext;

/// How the caller stands towards a loaded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Owner,
    Participant,
    Stranger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipRule {
    OwnerOnly,
    OwnerOrParticipant,
}

impl OwnershipRule {
    pub fn admits(&self, relation: Relation) -> bool {
        match self {
            OwnershipRule::OwnerOnly => relation == Relation::Owner,
            OwnershipRule::OwnerOrParticipant => relation != Relation::Stranger,
        }
    }
}

/// Records whose mutation depends on who recorded them.
pub trait Guarded {
    /// Short name used in the rejection message.
    const RESOURCE: &'static str;

    fn relation_to(&self, user_id: Uuid) -> Relation;
}

/// Admins always pass; everyone else needs the relation the rule asks for.
pub fn check_ownership<G: Guarded>(
    ctx: &RequestContext,
    resource: &G,
    rule: OwnershipRule,
) -> AppResult<()> {
    if ctx.is_admin() || rule.admits(resource.relation_to(ctx.user_id)) {
        return Ok(());
    }
    Err(AppError::forbidden(format!(
        "You do not have access to this {}",
        G::RESOURCE
    )))
}

fn relation(owner: bool, participant: bool) -> Relation {
    if owner {
        Relation::Owner
    } else if participant {
        Relation::Participant
    } else {
        Relation::Stranger
    }
}

impl Guarded for ProjectInfo {
    const RESOURCE: &'static str = "project";

    fn relation_to(&self, user_id: Uuid) -> Relation {
        relation(
            self.project.manager_id == user_id,
            self.project.customer_id == Some(user_id) || self.member_ids.contains(&user_id),
        )
    }
}

/// A task is owned through its project's manager; assignees participate.
pub struct TaskGuard<'a> {
    pub project: &'a Project,
    pub assignee_ids: &'a [Uuid],
}

impl Guarded for TaskGuard<'_> {
    const RESOURCE: &'static str = "task";

    fn relation_to(&self, user_id: Uuid) -> Relation {
        relation(
            self.project.manager_id == user_id,
            self.assignee_ids.contains(&user_id),
        )
    }
}

impl Guarded for Ticket {
    const RESOURCE: &'static str = "ticket";

    fn relation_to(&self, user_id: Uuid) -> Relation {
        relation(self.reporter_id == user_id, self.assignee_id == Some(user_id))
    }
}

impl Guarded for MeetingInfo {
    const RESOURCE: &'static str = "meeting";

    fn relation_to(&self, user_id: Uuid) -> Relation {
        relation(
            self.meeting.organizer_id == user_id,
            self.participant_ids.contains(&user_id),
        )
    }
}

impl Guarded for ChatInfo {
    const RESOURCE: &'static str = "chat";

    fn relation_to(&self, user_id: Uuid) -> Relation {
        relation(
            self.chat.created_by == user_id,
            self.participant_ids.contains(&user_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::{Priority, TicketCategory, TicketStatus, UserRole};
    use chrono::Utc;

    fn ctx(user_id: Uuid, role: UserRole) -> RequestContext {
        RequestContext {
            user_id,
            name: "Tester".into(),
            email: "tester@example.com".into(),
            role,
            department: None,
            campus_access: vec![],
        }
    }

    fn ticket(reporter: Uuid, assignee: Option<Uuid>) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Uuid::new_v4(),
            title: "Projector broken".into(),
            description: "Room 4 projector shows no signal".into(),
            reporter_id: reporter,
            assignee_id: assignee,
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
    fn rules_admit_the_expected_relations() {
        assert!(OwnershipRule::OwnerOnly.admits(Relation::Owner));
        assert!(!OwnershipRule::OwnerOnly.admits(Relation::Participant));
        assert!(OwnershipRule::OwnerOrParticipant.admits(Relation::Participant));
        assert!(!OwnershipRule::OwnerOrParticipant.admits(Relation::Stranger));
    }

    #[test]
    fn ticket_relations_follow_reporter_and_assignee() {
        let (reporter, assignee, other) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let t = ticket(reporter, Some(assignee));
        assert_eq!(t.relation_to(reporter), Relation::Owner);
        assert_eq!(t.relation_to(assignee), Relation::Participant);
        assert_eq!(t.relation_to(other), Relation::Stranger);
    }

    #[test]
    fn strangers_are_rejected_unless_admin() {
        let t = ticket(Uuid::new_v4(), None);
        let stranger = ctx(Uuid::new_v4(), UserRole::Manager);
        let err = check_ownership(&stranger, &t, OwnershipRule::OwnerOrParticipant).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);

        let admin = ctx(Uuid::new_v4(), UserRole::Admin);
        assert!(check_ownership(&admin, &t, OwnershipRule::OwnerOnly).is_ok());
    }

    #[test]
    fn participants_cannot_pass_owner_only() {
        let assignee = Uuid::new_v4();
        let t = ticket(Uuid::new_v4(), Some(assignee));
        let caller = ctx(assignee, UserRole::TeamMember);
        assert!(check_ownership(&caller, &t, OwnershipRule::OwnerOrParticipant).is_ok());
        assert!(check_ownership(&caller, &t, OwnershipRule::OwnerOnly).is_err());
    }
}
