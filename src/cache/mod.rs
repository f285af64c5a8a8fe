pub mod auth_cache;

pub use auth_cache::AuthCache;
