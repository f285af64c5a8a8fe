use bcrypt::verify;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    db::enums::UserRole,
    db::models::{
        CreateUserRequest, NewUser, UpdateProfileRequest, UpdateUserRequest, UserChanges, UserInfo,
        UserListQuery, error_codes,
    },
    db::repositories::UsersRepo,
    error::{AppError, AppResult},
    services::{AuthService, context::RequestContext},
    validation::auth::{
        UpdateProfileChanges, validate_campus_list, validate_password, validate_update_profile,
    },
};

pub struct UsersService;

impl UsersService {
    /// Admins see everyone; managers see their direct reports.
    pub fn list(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        query: &UserListQuery,
    ) -> AppResult<Vec<UserInfo>> {
        let manager_filter = match ctx.role {
            UserRole::Admin => None,
            UserRole::Manager => Some(ctx.user_id),
            _ => return Err(AppError::forbidden("You cannot list users")),
        };
        let users = UsersRepo::list(
            conn,
            manager_filter,
            query.role,
            query.department.as_deref(),
        )?;
        Ok(users.into_iter().map(UserInfo::from).collect())
    }

    pub fn get(conn: &mut PgConnection, ctx: &RequestContext, user_id: Uuid) -> AppResult<UserInfo> {
        let user = UsersRepo::find_by_id(conn, user_id)?.ok_or_else(|| AppError::not_found("user"))?;
        let visible = ctx.is_admin() || user.id == ctx.user_id || user.manager_id == Some(ctx.user_id);
        if !visible {
            return Err(AppError::not_found("user"));
        }
        Ok(user.into())
    }

    pub fn create(
        conn: &mut PgConnection,
        config: &AuthConfig,
        req: &CreateUserRequest,
    ) -> AppResult<UserInfo> {
        validate_password(&req.password)?;
        validate_campus_list(&req.campus_access)?;

        if UsersRepo::exists_by_email(conn, &req.email)? {
            return Err(AppError::conflict_with_code(
                "Email address already exists",
                Some("email".to_string()),
                error_codes::USER_EMAIL_EXISTS,
            ));
        }
        if let Some(manager_id) = req.manager_id {
            Self::ensure_manager(conn, manager_id)?;
        }

        let new_user = NewUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            password_hash: AuthService::hash_password(&req.password, config)?,
            role: req.role,
            department: req.department.clone(),
            manager_id: req.manager_id,
            campus_access: req.campus_access.clone(),
        };
        let user = UsersRepo::insert(conn, &new_user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "User created by admin");
        Ok(user.into())
    }

    pub fn update(
        conn: &mut PgConnection,
        ctx: &RequestContext,
        user_id: Uuid,
        req: &UpdateUserRequest,
    ) -> AppResult<UserInfo> {
        UsersRepo::find_by_id(conn, user_id)?.ok_or_else(|| AppError::not_found("user"))?;

        if user_id == ctx.user_id && (req.role.is_some_and(|r| r != ctx.role) || req.is_active == Some(false)) {
            return Err(AppError::validation("You cannot change your own role or deactivate yourself"));
        }
        if let Some(campuses) = &req.campus_access {
            validate_campus_list(campuses)?;
        }
        if let Some(Some(manager_id)) = req.manager_id {
            if manager_id == user_id {
                return Err(AppError::validation("A user cannot manage themselves"));
            }
            Self::ensure_manager(conn, manager_id)?;
        }

        let changes = UserChanges {
            name: req.name.as_ref().map(|n| n.trim().to_string()),
            role: req.role,
            department: req.department.clone(),
            manager_id: req.manager_id,
            campus_access: req.campus_access.clone(),
            is_active: req.is_active,
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        let user = UsersRepo::update(conn, user_id, &changes)?;
        Ok(user.into())
    }

    /// Soft delete: the account is deactivated, history keeps its author.
    pub fn deactivate(conn: &mut PgConnection, ctx: &RequestContext, user_id: Uuid) -> AppResult<()> {
        if user_id == ctx.user_id {
            return Err(AppError::validation("You cannot deactivate your own account"));
        }
        UsersRepo::find_by_id(conn, user_id)?.ok_or_else(|| AppError::not_found("user"))?;
        let changes = UserChanges {
            is_active: Some(false),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        UsersRepo::update(conn, user_id, &changes)?;
        tracing::info!(user_id = %user_id, by = %ctx.user_id, "User deactivated");
        Ok(())
    }

    pub fn update_profile(
        conn: &mut PgConnection,
        config: &AuthConfig,
        ctx: &RequestContext,
        req: &UpdateProfileRequest,
    ) -> AppResult<UserInfo> {
        validate_update_profile(&UpdateProfileChanges {
            name: req.name.as_deref(),
            department_present: req.department.is_some(),
            current_password: req.current_password.as_deref(),
            new_password: req.new_password.as_deref(),
        })?;

        let user = UsersRepo::find_active_by_id(conn, ctx.user_id)?
            .ok_or_else(|| AppError::not_found("user"))?;

        let password_hash = match (&req.current_password, &req.new_password) {
            (Some(current), Some(new_password)) => {
                if !verify(current, &user.password_hash)? {
                    return Err(AppError::auth("Current password is incorrect"));
                }
                Some(AuthService::hash_password(new_password, config)?)
            }
            _ => None,
        };

        let changes = UserChanges {
            name: req.name.as_ref().map(|n| n.trim().to_string()),
            password_hash,
            department: req.department.clone(),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        Ok(UsersRepo::update(conn, ctx.user_id, &changes)?.into())
    }

    fn ensure_manager(conn: &mut PgConnection, manager_id: Uuid) -> AppResult<()> {
        let manager = UsersRepo::find_active_by_id(conn, manager_id)?
            .ok_or_else(|| AppError::validation("Manager does not exist"))?;
        if !matches!(manager.role, UserRole::Admin | UserRole::Manager) {
            return Err(AppError::validation("Manager must have the ADMIN or MANAGER role"));
        }
        Ok(())
    }
}
