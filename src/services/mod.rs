pub mod auth_service;
pub mod chats_service;
pub mod context;
pub mod meetings_service;
pub mod notifications_service;
pub mod projects_service;
pub mod tasks_service;
pub mod tickets_service;
pub mod users_service;

pub use auth_service::AuthService;
pub use chats_service::ChatsService;
pub use meetings_service::MeetingsService;
pub use notifications_service::NotificationsService;
pub use projects_service::ProjectsService;
pub use tasks_service::TasksService;
pub use tickets_service::TicketsService;
pub use users_service::UsersService;
