use diesel::prelude::*;
use uuid::Uuid;

use crate::db::enums::UserRole;
use crate::db::models::user::{NewUser, User, UserChanges};

pub struct UsersRepo;

impl UsersRepo {
    pub fn find_by_id(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<User>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        users.filter(id.eq(user_id)).select(User::as_select()).first(conn).optional()
    }

    pub fn find_active_by_id(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<User>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        users
            .filter(id.eq(user_id))
            .filter(is_active.eq(true))
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_by_email(conn: &mut PgConnection, user_email: &str) -> Result<Option<User>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        users
            .filter(email.eq(user_email.to_lowercase()))
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    pub fn exists_by_email(conn: &mut PgConnection, user_email: &str) -> Result<bool, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::select(diesel::dsl::exists(users.filter(email.eq(user_email.to_lowercase())))).get_result(conn)
    }

    pub fn insert(conn: &mut PgConnection, new_user: &NewUser) -> Result<User, diesel::result::Error> {
        diesel::insert_into(crate::schema::users::table)
            .values(new_user)
            .returning(User::as_returning())
            .get_result(conn)
    }

    pub fn update(conn: &mut PgConnection, user_id: Uuid, changes: &UserChanges) -> Result<User, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::update(users.filter(id.eq(user_id)))
            .set(changes)
            .returning(User::as_returning())
            .get_result(conn)
    }

    pub fn list(
        conn: &mut PgConnection,
        manager_filter: Option<Uuid>,
        role_filter: Option<UserRole>,
        department_filter: Option<&str>,
    ) -> Result<Vec<User>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        let mut query = users.select(User::as_select()).into_boxed();
        if let Some(manager) = manager_filter {
            query = query.filter(manager_id.eq(manager));
        }
        if let Some(r) = role_filter {
            query = query.filter(role.eq(r));
        }
        if let Some(dept) = department_filter {
            query = query.filter(department.eq(dept));
        }
        query.order(name.asc()).load(conn)
    }

    /// Ids from `candidates` that belong to active users.
    pub fn existing_active_ids(conn: &mut PgConnection, candidates: &[Uuid]) -> Result<Vec<Uuid>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        users
            .filter(id.eq_any(candidates))
            .filter(is_active.eq(true))
            .select(id)
            .load(conn)
    }
}
