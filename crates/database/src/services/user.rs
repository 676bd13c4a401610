use crate::{entities::users, error::ServiceError};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use log::info;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};

pub struct UserService;

impl UserService {
    /// Access level given to the bootstrap administrator
    pub const ADMIN_ACCESS_LEVEL: i32 = 3;

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        access_level: i32,
    ) -> Result<users::Model, ServiceError> {
        let now = Utc::now().naive_utc();

        Ok(users::ActiveModel {
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            email: Set(email.to_owned()),
            password: Set(Self::hash_password(password)?),
            access_level: Set(access_level),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?)
    }

    /// Checks an email/password pair, returning the user id.
    ///
    /// An unknown email and a wrong password fail the same way.
    pub async fn authenticate<C: ConnectionTrait>(
        db: &C,
        email: &str,
        password: &str,
    ) -> Result<i32, ServiceError> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let hash = PasswordHash::new(&user.password)
            .map_err(|e| ServiceError::PasswordHash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| ServiceError::InvalidCredentials)?;

        Ok(user.id)
    }

    /// Creates the administrator account unless a user with `email` already exists
    pub async fn ensure_admin<C: ConnectionTrait>(
        db: &C,
        email: &str,
        password: &str,
    ) -> Result<users::Model, ServiceError> {
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?;

        if let Some(user) = existing {
            return Ok(user);
        }

        let user = Self::create(db, "Admin", "User", email, password, Self::ADMIN_ACCESS_LEVEL)
            .await?;
        info!("Created administrator account {email}");

        Ok(user)
    }

    fn hash_password(password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::PasswordHash(e.to_string()))
    }
}
