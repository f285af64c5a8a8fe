// Pure-logic tests: no database, Redis or server required.

mod events;
mod project_summary;
mod rbac;
mod scheduling;
mod sla;
mod support_bot;
mod validation;
