//! User repository.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use galeria_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::User;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    nombre: String,
    email: String,
    telefono: String,
    rol: String,
    metodo_de_pago: Option<String>,
    fecha_nacimiento: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let rol: Role = r
            .rol
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;

        Ok(Self {
            id: UserId::new(r.id),
            nombre: r.nombre,
            email,
            telefono: r.telefono,
            rol,
            metodo_de_pago: r.metodo_de_pago,
            fecha_nacimiento: r.fecha_nacimiento,
            created_at: r.created_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, nombre, email, telefono, rol, metodo_de_pago, fecha_nacimiento, created_at";

/// A partial account update; `None` fields are left unchanged.
#[derive(Debug, Default, Clone)]
pub struct UserPatch {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub rol: Option<Role>,
    pub metodo_de_pago: Option<String>,
}

/// Repository for user accounts.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        nombre: &str,
        email: &Email,
        password_hash: &str,
        telefono: &str,
        rol: Role,
        fecha_nacimiento: Option<NaiveDate>,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO usuario (nombre, email, password_hash, telefono, rol, fecha_nacimiento)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(nombre)
        .bind(email)
        .bind(password_hash)
        .bind(telefono)
        .bind(rol)
        .bind(fecha_nacimiento)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email already exists"))?;

        row.try_into()
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such user exists.
    pub async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM usuario WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no account exists for the email; the caller turns
    /// that into an invalid-credentials error without leaking which case
    /// occurred.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct WithHash {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row: Option<WithHash> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM usuario WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.user.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// List all accounts.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM usuario ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Apply a partial update to an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such user exists.
    pub async fn update(&self, id: UserId, patch: &UserPatch) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE usuario SET
                 nombre         = COALESCE($2, nombre),
                 telefono       = COALESCE($3, telefono),
                 rol            = COALESCE($4, rol),
                 metodo_de_pago = COALESCE($5, metodo_de_pago)
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.nombre.as_deref())
        .bind(patch.telefono.as_deref())
        .bind(patch.rol)
        .bind(patch.metodo_de_pago.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete an account. Cascades to the user's carts and reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such user exists.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM usuario WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
