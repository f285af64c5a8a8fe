use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    db::enums::{Priority, TicketStatus, UserRole},
    db::models::{
        AssignTicketRequest, CreateTicketCommentRequest, CreateTicketRequest, NewTicket,
        NewTicketComment, NewTicketLog, Ticket, TicketChanges, TicketComment, TicketDetail,
        TicketInfo, TicketListQuery, UpdateTicketRequest,
    },
    db::repositories::{TicketsRepo, UsersRepo, tickets::TicketScope},
    error::{AppError, AppResult},
    rbac::{OwnershipRule, check_ownership},
    services::{NotificationsService, context::RequestContext, notifications_service::kinds},
    validation::ticket::{validate_comment, validate_create_ticket},
    websocket::WebSocketManager,
};

/// Log actions recorded against a ticket.
pub mod actions {
    pub const CREATED: &str = "CREATED";
    pub const STATUS_CHANGED: &str = "STATUS_CHANGED";
    pub const PRIORITY_CHANGED: &str = "PRIORITY_CHANGED";
    pub const CATEGORY_CHANGED: &str = "CATEGORY_CHANGED";
    pub const ASSIGNED: &str = "ASSIGNED";
    pub const COMMENTED: &str = "COMMENTED";
}

/// Hours allowed before a ticket of this priority breaches its SLA.
pub fn sla_hours(priority: Priority) -> i64 {
    match priority {
        Priority::Urgent => 4,
        Priority::High => 8,
        Priority::Medium => 24,
        Priority::Low => 72,
    }
}

pub fn sla_deadline_for(priority: Priority, created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::hours(sla_hours(priority))
}

/// Open work past its deadline. Resolved tickets are judged by when they
/// were resolved.
pub fn is_sla_breached(ticket: &Ticket, now: DateTime<Utc>) -> bool {
    match (ticket.status.is_terminal(), ticket.resolved_at) {
        (true, Some(resolved_at)) => resolved_at > ticket.sla_deadline,
        (true, None) => false,
        (false, _) => now > ticket.sla_deadline,
    }
}

/// Works out what an update actually changes, with one log entry per
/// changed field. Fields equal to the current value are ignored.
pub fn ticket_changes(
    ticket: &Ticket,
    req: &UpdateTicketRequest,
    now: DateTime<Utc>,
) -> (TicketChanges, Vec<(&'static str, String)>) {
    let mut changes = TicketChanges {
        updated_at: Some(now),
        ..Default::default()
    };
    let mut entries = Vec::new();

    if let Some(status) = req.status.filter(|s| *s != ticket.status) {
        changes.status = Some(status);
        changes.resolved_at = match status {
            TicketStatus::Resolved => Some(Some(now)),
            // Closing keeps whatever resolution time was recorded.
            TicketStatus::Closed => None,
            _ => Some(None),
        };
        entries.push((actions::STATUS_CHANGED, format!("{} -> {}", ticket.status, status)));
    }
    if let Some(priority) = req.priority.filter(|p| *p != ticket.priority) {
        changes.priority = Some(priority);
        changes.sla_deadline = Some(sla_deadline_for(priority, ticket.created_at));
        entries.push((actions::PRIORITY_CHANGED, format!("{} -> {}", ticket.priority, priority)));
    }
    if let Some(category) = req.category.filter(|c| *c != ticket.category) {
        changes.category = Some(category);
        entries.push((actions::CATEGORY_CHANGED, format!("{} -> {}", ticket.category, category)));
    }
    (changes, entries)
}

fn info(ticket: Ticket) -> TicketInfo {
    let sla_breached = is_sla_breached(&ticket, Utc::now());
    TicketInfo {
        ticket,
        sla_breached,
    }
}

pub struct TicketsService;

impl TicketsService {
    pub fn scope_for(ctx: &RequestContext) -> TicketScope {
        match ctx.role {
            UserRole::Admin => TicketScope::All,
            UserRole::Manager => TicketScope::Campuses(ctx.campus_access.clone()),
            UserRole::TeamMember => TicketScope::AssignedOrReported(ctx.user_id),
            UserRole::Customer => TicketScope::ReportedBy(ctx.user_id),
        }
    }

    /// Reporter, assignee, admins, and managers covering the ticket's campus.
    pub fn can_view(ctx: &RequestContext, ticket: &Ticket) -> bool {
        if check_ownership(ctx, ticket, OwnershipRule::OwnerOrParticipant).is_ok() {
            return true;
        }
        ctx.role == UserRole::Manager && ctx.has_campus(&ticket.campus)
    }

    /// Commenting needs the ticket to be visible first; hidden tickets read
    /// as missing. Customers must also be a party to it.
    pub fn can_comment(ctx: &RequestContext, ticket: &Ticket) -> AppResult<()> {
        if !Self::can_view(ctx, ticket) {
            return Err(AppError::not_found("ticket"));
        }
        if !ctx.role.is_staff() {
            check_ownership(ctx, ticket, OwnershipRule::OwnerOrParticipant)?;
        }
        Ok(())
    }

    pub fn create(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        req: &CreateTicketRequest,
    ) -> AppResult<TicketInfo> {
        validate_create_ticket(req)?;

        let now = Utc::now();
        let ticket = conn.transaction::<_, AppError, _>(|conn| {
            let ticket = TicketsRepo::insert(
                conn,
                &NewTicket {
                    title: req.title.trim().to_string(),
                    description: req.description.trim().to_string(),
                    reporter_id: ctx.user_id,
                    campus: req.campus.trim().to_string(),
                    category: req.category,
                    priority: req.priority,
                    status: TicketStatus::Open,
                    sla_deadline: sla_deadline_for(req.priority, now),
                    attachments: req.attachments.clone(),
                },
            )?;
            Self::log(conn, ticket.id, ctx.user_id, actions::CREATED, None)?;
            Ok(ticket)
        })?;

        tracing::info!(
            ticket_id = %ticket.id,
            priority = %ticket.priority,
            campus = %ticket.campus,
            "Ticket created"
        );
        Ok(info(ticket))
    }

    pub fn list(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        query: &TicketListQuery,
    ) -> AppResult<Vec<TicketInfo>> {
        let tickets = TicketsRepo::list(conn, &Self::scope_for(ctx), query)?;
        Ok(tickets.into_iter().map(info).collect())
    }

    pub fn get(conn: &mut PgConnection, ctx: &RequestContext, ticket_id: Uuid) -> AppResult<TicketDetail> {
        let ticket = Self::load_visible(conn, ctx, ticket_id)?;
        let comments = TicketsRepo::comments(conn, ticket_id)?;
        let logs = TicketsRepo::logs(conn, ticket_id)?;
        Ok(TicketDetail {
            info: info(ticket),
            comments,
            logs,
        })
    }

    pub fn update(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        ticket_id: Uuid,
        req: &UpdateTicketRequest,
    ) -> AppResult<TicketInfo> {
        let ticket = Self::load_visible(conn, ctx, ticket_id)?;
        if !ctx.role.is_staff() {
            return Err(AppError::forbidden("Only staff can update tickets"));
        }

        let (changes, entries) = ticket_changes(&ticket, req, Utc::now());
        if entries.is_empty() {
            return Ok(info(ticket));
        }

        let updated = conn.transaction::<_, AppError, _>(|conn| {
            let updated = TicketsRepo::update(conn, ticket_id, &changes)?;
            for (action, detail) in &entries {
                Self::log(conn, ticket_id, ctx.user_id, action, Some(detail.clone()))?;
            }
            Ok(updated)
        })?;

        if changes.status.is_some() && updated.reporter_id != ctx.user_id {
            NotificationsService::notify(
                conn,
                ws,
                vec![NotificationsService::build(
                    updated.reporter_id,
                    kinds::TICKET_STATUS,
                    format!("Ticket \"{}\" is now {}", updated.title, updated.status),
                    None,
                    Some(format!("/tickets/{}", updated.id)),
                )],
            );
        }
        Ok(info(updated))
    }

    pub fn assign(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        ticket_id: Uuid,
        req: &AssignTicketRequest,
    ) -> AppResult<TicketInfo> {
        let ticket = Self::load_visible(conn, ctx, ticket_id)?;
        let assignee = UsersRepo::find_active_by_id(conn, req.assignee_id)?
            .ok_or_else(|| AppError::validation("Assignee does not exist"))?;
        if !assignee.role.is_staff() {
            return Err(AppError::validation("Tickets can only be assigned to staff"));
        }

        let changes = TicketChanges {
            assignee_id: Some(Some(assignee.id)),
            status: (ticket.status == TicketStatus::Open).then_some(TicketStatus::InProgress),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        let updated = conn.transaction::<_, AppError, _>(|conn| {
            let updated = TicketsRepo::update(conn, ticket_id, &changes)?;
            Self::log(
                conn,
                ticket_id,
                ctx.user_id,
                actions::ASSIGNED,
                Some(format!("Assigned to {}", assignee.name)),
            )?;
            Ok(updated)
        })?;

        if assignee.id != ctx.user_id {
            NotificationsService::notify(
                conn,
                ws,
                vec![NotificationsService::build(
                    assignee.id,
                    kinds::TICKET_ASSIGNED,
                    format!("Ticket \"{}\" was assigned to you", updated.title),
                    Some(format!("Priority {}, campus {}", updated.priority, updated.campus)),
                    Some(format!("/tickets/{}", updated.id)),
                )],
            );
        }
        tracing::info!(ticket_id = %ticket_id, assignee_id = %assignee.id, "Ticket assigned");
        Ok(info(updated))
    }

    pub fn comment(
        conn: &mut PgConnection,
        ws: &WebSocketManager,
        ctx: &RequestContext,
        ticket_id: Uuid,
        req: &CreateTicketCommentRequest,
    ) -> AppResult<TicketComment> {
        let ticket = TicketsRepo::find_by_id(conn, ticket_id)?
            .ok_or_else(|| AppError::not_found("ticket"))?;
        Self::can_comment(ctx, &ticket)?;
        validate_comment(&req.body)?;

        let comment = conn.transaction::<_, AppError, _>(|conn| {
            let comment = TicketsRepo::insert_comment(
                conn,
                &NewTicketComment {
                    ticket_id,
                    author_id: ctx.user_id,
                    body: req.body.trim().to_string(),
                },
            )?;
            Self::log(conn, ticket_id, ctx.user_id, actions::COMMENTED, None)?;
            Ok(comment)
        })?;

        let rows = Self::other_parties(&ticket, ctx.user_id)
            .into_iter()
            .map(|user_id| {
                NotificationsService::build(
                    user_id,
                    kinds::TICKET_COMMENT,
                    format!("{} commented on \"{}\"", ctx.name, ticket.title),
                    Some(comment.body.chars().take(140).collect()),
                    Some(format!("/tickets/{}", ticket.id)),
                )
            })
            .collect();
        NotificationsService::notify(conn, ws, rows);
        Ok(comment)
    }

    pub fn delete(conn: &mut PgConnection, ctx: &RequestContext, ticket_id: Uuid) -> AppResult<()> {
        if TicketsRepo::delete_by_id(conn, ticket_id)? == 0 {
            return Err(AppError::not_found("ticket"));
        }
        tracing::info!(ticket_id = %ticket_id, by = %ctx.user_id, "Ticket deleted");
        Ok(())
    }

    /// Hidden tickets read as missing.
    fn load_visible(conn: &mut PgConnection, ctx: &RequestContext, ticket_id: Uuid) -> AppResult<Ticket> {
        let ticket = TicketsRepo::find_by_id(conn, ticket_id)?
            .ok_or_else(|| AppError::not_found("ticket"))?;
        if !Self::can_view(ctx, &ticket) {
            return Err(AppError::not_found("ticket"));
        }
        Ok(ticket)
    }

    /// Reporter and assignee, minus whoever is acting.
    fn other_parties(ticket: &Ticket, actor: Uuid) -> Vec<Uuid> {
        let mut parties = vec![ticket.reporter_id];
        if let Some(assignee) = ticket.assignee_id {
            if assignee != ticket.reporter_id {
                parties.push(assignee);
            }
        }
        parties.retain(|id| *id != actor);
        parties
    }

    fn log(
        conn: &mut PgConnection,
        ticket_id: Uuid,
        actor_id: Uuid,
        action: &str,
        detail: Option<String>,
    ) -> AppResult<()> {
        TicketsRepo::insert_log(
            conn,
            &NewTicketLog {
                ticket_id,
                actor_id,
                action: action.to_string(),
                detail,
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::TicketCategory;

    fn ticket(priority: Priority, status: TicketStatus) -> Ticket {
        let created_at = Utc::now() - Duration::hours(10);
        Ticket {
            id: Uuid::new_v4(),
            title: "Projector broken".into(),
            description: "Room 4".into(),
            reporter_id: Uuid::new_v4(),
            assignee_id: None,
            campus: "North".into(),
            category: TicketCategory::Hardware,
            priority,
            status,
            sla_deadline: sla_deadline_for(priority, created_at),
            attachments: vec![],
            resolved_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn ctx(user_id: Uuid, role: UserRole, campuses: &[&str]) -> RequestContext {
        RequestContext {
            user_id,
            name: "Agent".into(),
            email: "agent@example.com".into(),
            role,
            department: None,
            campus_access: campuses.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn sla_windows_by_priority() {
        let t0 = Utc::now();
        assert_eq!(sla_deadline_for(Priority::Urgent, t0) - t0, Duration::hours(4));
        assert_eq!(sla_deadline_for(Priority::High, t0) - t0, Duration::hours(8));
        assert_eq!(sla_deadline_for(Priority::Medium, t0) - t0, Duration::hours(24));
        assert_eq!(sla_deadline_for(Priority::Low, t0) - t0, Duration::hours(72));
    }

    #[test]
    fn open_ticket_past_deadline_is_breached() {
        let now = Utc::now();
        assert!(is_sla_breached(&ticket(Priority::High, TicketStatus::Open), now));
        assert!(!is_sla_breached(&ticket(Priority::Medium, TicketStatus::InProgress), now));
    }

    #[test]
    fn resolved_ticket_judged_by_resolution_time() {
        let mut t = ticket(Priority::Urgent, TicketStatus::Resolved);
        t.resolved_at = Some(t.created_at + Duration::hours(2));
        assert!(!is_sla_breached(&t, Utc::now()));
        t.resolved_at = Some(t.created_at + Duration::hours(5));
        assert!(is_sla_breached(&t, Utc::now()));
    }

    #[test]
    fn managers_see_their_campuses_only() {
        let t = ticket(Priority::Low, TicketStatus::Open);
        assert!(TicketsService::can_view(&ctx(Uuid::new_v4(), UserRole::Manager, &["North"]), &t));
        assert!(!TicketsService::can_view(&ctx(Uuid::new_v4(), UserRole::Manager, &["South"]), &t));
        // Campus names match exactly, as the list query does.
        assert!(!TicketsService::can_view(&ctx(Uuid::new_v4(), UserRole::Manager, &["north"]), &t));
        assert!(!TicketsService::can_view(&ctx(Uuid::new_v4(), UserRole::TeamMember, &["North"]), &t));
        assert!(TicketsService::can_view(&ctx(t.reporter_id, UserRole::Customer, &[]), &t));
        assert!(TicketsService::can_view(&ctx(Uuid::new_v4(), UserRole::Admin, &[]), &t));
    }

    #[test]
    fn comments_follow_visibility() {
        let mut t = ticket(Priority::Medium, TicketStatus::Open);
        let agent = Uuid::new_v4();
        t.assignee_id = Some(agent);

        assert!(TicketsService::can_comment(&ctx(agent, UserRole::TeamMember, &[]), &t).is_ok());
        assert!(TicketsService::can_comment(&ctx(t.reporter_id, UserRole::Customer, &[]), &t).is_ok());
        assert!(TicketsService::can_comment(&ctx(Uuid::new_v4(), UserRole::Manager, &["North"]), &t).is_ok());
        assert!(TicketsService::can_comment(&ctx(Uuid::new_v4(), UserRole::Admin, &[]), &t).is_ok());

        for outsider in [
            ctx(Uuid::new_v4(), UserRole::TeamMember, &["North"]),
            ctx(Uuid::new_v4(), UserRole::Manager, &["South"]),
            ctx(Uuid::new_v4(), UserRole::Customer, &[]),
        ] {
            assert!(matches!(
                TicketsService::can_comment(&outsider, &t),
                Err(AppError::NotFound { .. })
            ));
        }
    }

    #[test]
    fn resolving_stamps_and_reopening_clears() {
        let t = ticket(Priority::Medium, TicketStatus::InProgress);
        let now = Utc::now();

        let resolve = UpdateTicketRequest {
            status: Some(TicketStatus::Resolved),
            ..Default::default()
        };
        let (changes, entries) = ticket_changes(&t, &resolve, now);
        assert_eq!(changes.status, Some(TicketStatus::Resolved));
        assert_eq!(changes.resolved_at, Some(Some(now)));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, actions::STATUS_CHANGED);

        let mut resolved = ticket(Priority::Medium, TicketStatus::Resolved);
        resolved.resolved_at = Some(now);
        let reopen = UpdateTicketRequest {
            status: Some(TicketStatus::Open),
            ..Default::default()
        };
        let (changes, _) = ticket_changes(&resolved, &reopen, now);
        assert_eq!(changes.resolved_at, Some(None));

        let close = UpdateTicketRequest {
            status: Some(TicketStatus::Closed),
            ..Default::default()
        };
        let (changes, _) = ticket_changes(&resolved, &close, now);
        assert_eq!(changes.resolved_at, None);
    }

    #[test]
    fn priority_change_recomputes_sla_from_creation() {
        let t = ticket(Priority::Low, TicketStatus::Open);
        let req = UpdateTicketRequest {
            priority: Some(Priority::Urgent),
            ..Default::default()
        };
        let (changes, entries) = ticket_changes(&t, &req, Utc::now());
        assert_eq!(changes.sla_deadline, Some(t.created_at + Duration::hours(4)));
        assert_eq!(entries, vec![(actions::PRIORITY_CHANGED, "LOW -> URGENT".to_string())]);
    }

    #[test]
    fn unchanged_fields_are_not_logged() {
        let t = ticket(Priority::High, TicketStatus::Open);
        let req = UpdateTicketRequest {
            status: Some(TicketStatus::Open),
            priority: Some(Priority::High),
            category: Some(t.category),
        };
        let (changes, entries) = ticket_changes(&t, &req, Utc::now());
        assert!(entries.is_empty());
        assert!(changes.status.is_none() && changes.priority.is_none() && changes.category.is_none());
    }

    #[test]
    fn other_parties_skip_the_actor() {
        let mut t = ticket(Priority::Low, TicketStatus::Open);
        let agent = Uuid::new_v4();
        t.assignee_id = Some(agent);
        assert_eq!(TicketsService::other_parties(&t, agent), vec![t.reporter_id]);
        assert_eq!(TicketsService::other_parties(&t, t.reporter_id), vec![agent]);
        assert_eq!(TicketsService::other_parties(&t, Uuid::new_v4()).len(), 2);
    }

    #[test]
    fn staff_scopes() {
        let id = Uuid::new_v4();
        assert_eq!(TicketsService::scope_for(&ctx(id, UserRole::Admin, &[])), TicketScope::All);
        assert_eq!(
            TicketsService::scope_for(&ctx(id, UserRole::Manager, &["North"])),
            TicketScope::Campuses(vec!["North".into()])
        );
        assert_eq!(
            TicketsService::scope_for(&ctx(id, UserRole::Customer, &[])),
            TicketScope::ReportedBy(id)
        );
    }
}
