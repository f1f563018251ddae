use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::types::{PhoneNumber, UserEmail, UserId, Username};
use crate::domain::user::{NewUser, RoleSet, UpdateUser, User, UserCredentials};
use crate::models::user::{
    NewUser as DbNewUser, UpdateUser as DbUpdateUser, User as DbUser, UserRole,
    role_set_from_rows,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserListQuery, UserReader, UserWriter};
use crate::schema::{user_roles, users};

/// Loads the role rows for `rows` and converts everything into domain users.
fn attach_roles(conn: &mut SqliteConnection, rows: Vec<DbUser>) -> RepositoryResult<Vec<User>> {
    let roles = UserRole::belonging_to(&rows)
        .select(UserRole::as_select())
        .load::<UserRole>(conn)?;
    let grouped = roles.grouped_by(&rows);

    rows.into_iter()
        .zip(grouped)
        .map(|(row, roles)| {
            row.into_domain(role_set_from_rows(&roles))
                .map_err(RepositoryError::from)
        })
        .collect()
}

fn with_roles(conn: &mut SqliteConnection, row: DbUser) -> RepositoryResult<User> {
    attach_roles(conn, vec![row])?
        .pop()
        .ok_or_else(|| RepositoryError::Unexpected("user row vanished".to_string()))
}

fn replace_roles(conn: &mut SqliteConnection, user_id: i32, roles: RoleSet) -> QueryResult<()> {
    diesel::delete(user_roles::table.filter(user_roles::user_id.eq(user_id))).execute(conn)?;
    let rows: Vec<UserRole> = roles
        .iter()
        .map(|role| UserRole {
            user_id,
            role: role.as_str().to_string(),
        })
        .collect();
    diesel::insert_into(user_roles::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn filtered(query: &UserListQuery) -> users::BoxedQuery<'static, Sqlite> {
    let mut items = users::table.into_boxed();
    if let Some(manager_id) = query.manager_id {
        items = items.filter(users::manager_id.eq(manager_id.get()));
    }
    items
}

/// Unique columns a single user can be looked up by.
enum UserLookup<'a> {
    Id(i32),
    Username(&'a str),
    Email(&'a str),
    Phone(&'a str),
}

impl DieselRepository {
    fn find_user(&self, lookup: UserLookup<'_>) -> RepositoryResult<Option<User>> {
        let mut conn = self.conn()?;
        let query = users::table.into_boxed();
        let query = match lookup {
            UserLookup::Id(id) => query.filter(users::id.eq(id)),
            UserLookup::Username(username) => query.filter(users::username.eq(username)),
            UserLookup::Email(email) => query.filter(users::email.eq(email)),
            UserLookup::Phone(phone) => query.filter(users::phone.eq(phone)),
        };
        let row = query
            .select(DbUser::as_select())
            .first::<DbUser>(&mut conn)
            .optional()?;

        row.map(|row| with_roles(&mut conn, row)).transpose()
    }
}

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        self.find_user(UserLookup::Id(id.get()))
    }

    fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>> {
        self.find_user(UserLookup::Username(username.as_str()))
    }

    fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>> {
        self.find_user(UserLookup::Email(email.as_str()))
    }

    fn get_user_by_phone(&self, phone: &PhoneNumber) -> RepositoryResult<Option<User>> {
        self.find_user(UserLookup::Phone(phone.as_str()))
    }

    fn get_user_credentials(
        &self,
        username: &Username,
    ) -> RepositoryResult<Option<UserCredentials>> {
        let mut conn = self.conn()?;
        let row = users::table
            .filter(users::username.eq(username.as_str()))
            .select(DbUser::as_select())
            .first::<DbUser>(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        let password_hash = row.password_hash.clone();
        let user = with_roles(&mut conn, row)?;

        Ok(Some(UserCredentials {
            user,
            password_hash,
        }))
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order(users::id.asc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let rows = items.select(DbUser::as_select()).load::<DbUser>(&mut conn)?;
        let users = attach_roles(&mut conn, rows)?;

        Ok((total as usize, users))
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        let mut conn = self.conn()?;
        let insertable = DbNewUser::from(new_user);

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let row = diesel::insert_into(users::table)
                .values(&insertable)
                .returning(DbUser::as_returning())
                .get_result::<DbUser>(conn)?;
            replace_roles(conn, row.id, new_user.roles)?;
            Ok(row.into_domain(new_user.roles)?)
        })
    }

    fn update_user(&self, user_id: UserId, updates: &UpdateUser) -> RepositoryResult<User> {
        let mut conn = self.conn()?;
        let id = user_id.get();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            // Fails with NotFound before any write happens.
            users::table
                .find(id)
                .select(users::id)
                .first::<i32>(conn)?;

            if updates.touches_profile() {
                diesel::update(users::table.find(id))
                    .set(&DbUpdateUser::from(updates))
                    .execute(conn)?;
            }
            if let Some(roles) = updates.roles {
                replace_roles(conn, id, roles)?;
            }

            let row = users::table
                .find(id)
                .select(DbUser::as_select())
                .first::<DbUser>(conn)?;
            with_roles(conn, row)
        })
    }

    fn update_user_password(&self, user_id: UserId, password_hash: &str) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::update(users::table.find(user_id.get()))
            .set(users::password_hash.eq(password_hash))
            .execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn delete_user(&self, user_id: UserId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(users::table.find(user_id.get())).execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
