pub mod chats;
pub mod meetings;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod tickets;
pub mod users;

pub use chats::ChatsRepo;
pub use meetings::MeetingsRepo;
pub use notifications::NotificationsRepo;
pub use projects::{ProjectScope, ProjectsRepo};
pub use tasks::TasksRepo;
pub use tickets::TicketsRepo;
pub use users::UsersRepo;
