use diesel::prelude::*;
use uuid::Uuid;

use crate::db::models::ticket::{
    NewTicket, NewTicketComment, NewTicketLog, Ticket, TicketChanges, TicketComment,
    TicketListQuery, TicketLog,
};

pub struct TicketsRepo;

/// Which tickets a caller may list.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketScope {
    All,
    Campuses(Vec<String>),
    AssignedOrReported(Uuid),
    ReportedBy(Uuid),
}

impl TicketsRepo {
    pub fn insert(conn: &mut PgConnection, new_ticket: &NewTicket) -> Result<Ticket, diesel::result::Error> {
        diesel::insert_into(crate::schema::tickets::table)
            .values(new_ticket)
            .returning(Ticket::as_returning())
            .get_result(conn)
    }

    pub fn find_by_id(conn: &mut PgConnection, ticket_id: Uuid) -> Result<Option<Ticket>, diesel::result::Error> {
        use crate::schema::tickets::dsl::*;
        tickets.filter(id.eq(ticket_id)).select(Ticket::as_select()).first(conn).optional()
    }

    pub fn list(conn: &mut PgConnection, scope: &TicketScope, filters: &TicketListQuery) -> Result<Vec<Ticket>, diesel::result::Error> {
        use crate::schema::tickets::dsl::*;

        let mut query = tickets.select(Ticket::as_select()).into_boxed();
        query = match scope {
            TicketScope::All => query,
            TicketScope::Campuses(allowed) => query.filter(campus.eq_any(allowed.clone())),
            TicketScope::AssignedOrReported(user) => {
                query.filter(assignee_id.eq(*user).or(reporter_id.eq(*user)))
            }
            TicketScope::ReportedBy(user) => query.filter(reporter_id.eq(*user)),
        };
        if let Some(s) = filters.status {
            query = query.filter(status.eq(s));
        }
        if let Some(p) = filters.priority {
            query = query.filter(priority.eq(p));
        }
        if let Some(c) = filters.campus.as_deref() {
            query = query.filter(campus.eq(c.to_string()));
        }
        query.order(sla_deadline.asc()).load(conn)
    }

    pub fn update(conn: &mut PgConnection, ticket_id: Uuid, changes: &TicketChanges) -> Result<Ticket, diesel::result::Error> {
        use crate::schema::tickets::dsl::*;
        diesel::update(tickets.filter(id.eq(ticket_id)))
            .set(changes)
            .returning(Ticket::as_returning())
            .get_result(conn)
    }

    pub fn delete_by_id(conn: &mut PgConnection, ticket_id: Uuid) -> Result<usize, diesel::result::Error> {
        use crate::schema::tickets::dsl::*;
        diesel::delete(tickets.filter(id.eq(ticket_id))).execute(conn)
    }

    pub fn insert_comment(conn: &mut PgConnection, comment: &NewTicketComment) -> Result<TicketComment, diesel::result::Error> {
        diesel::insert_into(crate::schema::ticket_comments::table)
            .values(comment)
            .returning(TicketComment::as_returning())
            .get_result(conn)
    }

    pub fn comments(conn: &mut PgConnection, target_ticket: Uuid) -> Result<Vec<TicketComment>, diesel::result::Error> {
        use crate::schema::ticket_comments::dsl::*;
        ticket_comments
            .filter(ticket_id.eq(target_ticket))
            .select(TicketComment::as_select())
            .order(created_at.asc())
            .load(conn)
    }

    pub fn insert_log(conn: &mut PgConnection, entry: &NewTicketLog) -> Result<TicketLog, diesel::result::Error> {
        diesel::insert_into(crate::schema::ticket_logs::table)
            .values(entry)
            .returning(TicketLog::as_returning())
            .get_result(conn)
    }

    pub fn logs(conn: &mut PgConnection, target_ticket: Uuid) -> Result<Vec<TicketLog>, diesel::result::Error> {
        use crate::schema::ticket_logs::dsl::*;
        ticket_logs
            .filter(ticket_id.eq(target_ticket))
            .select(TicketLog::as_select())
            .order(created_at.asc())
            .load(conn)
    }
}
