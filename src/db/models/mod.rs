// Sub-modules organized by functional domain
pub mod api;
pub mod chat;
pub mod meeting;
pub mod notification;
pub mod project;
pub mod task;
pub mod ticket;
pub mod time_log;
pub mod user;

pub use api::*;
pub use chat::*;
pub use meeting::*;
pub use notification::*;
pub use project::*;
pub use task::*;
pub use ticket::*;
pub use time_log::*;
pub use user::*;
