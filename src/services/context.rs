use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::enums::UserRole;
use crate::db::models::user::User;

/// The authenticated caller, attached to every protected request by the
/// auth middleware and cached in Redis between requests.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub department: Option<String>,
    pub campus_access: Vec<String>,
}

impl RequestContext {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn has_campus(&self, campus: &str) -> bool {
        self.campus_access.iter().any(|allowed| allowed == campus)
    }
}

impl From<&User> for RequestContext {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            department: user.department.clone(),
            campus_access: user.campus_access.clone(),
        }
    }
}
