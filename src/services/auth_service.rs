use bcrypt::{hash, verify};
use diesel::prelude::*;

use crate::{
    config::AuthConfig,
    db::enums::UserRole,
    db::models::{
        LoginRequest, LoginResponse, NewUser, RefreshTokenResponse, RegisterRequest, User, UserInfo,
        error_codes,
    },
    db::repositories::UsersRepo,
    error::{AppError, AppResult},
    middleware::auth::TokenService,
    validation::auth::validate_register_request,
};

const TOKEN_TYPE: &str = "Bearer";

pub struct AuthService;

impl AuthService {
    pub fn hash_password(password: &str, config: &AuthConfig) -> AppResult<String> {
        Ok(hash(password, config.bcrypt_cost)?)
    }

    /// Self-registration always creates a customer; staff roles are granted
    /// by an administrator.
    pub fn register(
        conn: &mut PgConnection,
        config: &AuthConfig,
        req: &RegisterRequest,
    ) -> AppResult<UserInfo> {
        validate_register_request(&req.name, &req.email, &req.password)?;

        if UsersRepo::exists_by_email(conn, &req.email)? {
            return Err(AppError::conflict_with_code(
                "Email address already exists",
                Some("email".to_string()),
                error_codes::USER_EMAIL_EXISTS,
            ));
        }

        let new_user = NewUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            password_hash: Self::hash_password(&req.password, config)?,
            role: UserRole::Customer,
            department: None,
            manager_id: None,
            campus_access: Vec::new(),
        };
        let user = UsersRepo::insert(conn, &new_user)?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    pub fn login(
        conn: &mut PgConnection,
        tokens: &TokenService,
        req: &LoginRequest,
    ) -> AppResult<LoginResponse> {
        let user = UsersRepo::find_by_email(conn, req.email.trim())?.ok_or_else(|| {
            AppError::auth_with_code("Invalid email or password", error_codes::AUTH_INVALID_CREDENTIALS)
        })?;

        if !verify(&req.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::auth_with_code(
                "Invalid email or password",
                error_codes::AUTH_INVALID_CREDENTIALS,
            ));
        }
        if !user.is_active {
            return Err(AppError::forbidden_with_code(
                "Account is disabled",
                error_codes::AUTH_ACCOUNT_DISABLED,
            ));
        }

        let response = Self::issue_tokens(tokens, user)?;
        tracing::info!(user_id = %response.user.id, "User logged in");
        Ok(response)
    }

    fn issue_tokens(tokens: &TokenService, user: User) -> AppResult<LoginResponse> {
        let access_token = tokens.generate_access_token(&user)?;
        let refresh_token = tokens.generate_refresh_token(user.id)?;
        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: tokens.access_ttl(),
            user: user.into(),
        })
    }

    pub fn refresh(
        conn: &mut PgConnection,
        tokens: &TokenService,
        refresh_token: &str,
    ) -> AppResult<RefreshTokenResponse> {
        let claims = tokens.verify_refresh_token(refresh_token)?;
        let user = UsersRepo::find_active_by_id(conn, claims.sub)?
            .ok_or_else(|| AppError::auth("User not found or inactive"))?;

        Ok(RefreshTokenResponse {
            access_token: tokens.generate_access_token(&user)?,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: tokens.access_ttl(),
        })
    }

    pub fn me(conn: &mut PgConnection, user_id: uuid::Uuid) -> AppResult<UserInfo> {
        UsersRepo::find_active_by_id(conn, user_id)?
            .map(UserInfo::from)
            .ok_or_else(|| AppError::not_found("user"))
    }
}
