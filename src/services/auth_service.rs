use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::RegisterPayload;
use crate::error::{Error, Result};
use crate::models::user::{User, UserRole};
use crate::services::google_service::GoogleProfile;
use crate::utils::crypto::{hash_password, verify_password};

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        let password_hash = hash_password(&payload.password)?;
        let role = payload.role.unwrap_or(UserRole::Tutor);

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.email.to_lowercase())
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(err) if is_unique_violation(&err) => Err(Error::BadRequest(
                "An account with this email already exists".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .find_by_email(&email.to_lowercase())
            .await?
            .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

        let Some(stored_hash) = user.password_hash.as_deref() else {
            return Err(Error::Unauthorized(
                "This account signs in with Google".to_string(),
            ));
        };

        if !verify_password(password, stored_hash)? {
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        }

        Ok(user)
    }

    /// Account linking for Google sign-in: match by Google id first, then by
    /// email (attaching the Google identity to the existing account), and
    /// only then create a fresh passwordless tutor account.
    pub async fn login_with_google(&self, profile: &GoogleProfile) -> Result<User> {
        let existing = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE google_id = $1"#)
            .bind(&profile.sub)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(user) = existing {
            return Ok(user);
        }

        let email = profile.email.to_lowercase();
        if let Some(user) = self.find_by_email(&email).await? {
            let linked = sqlx::query_as::<_, User>(
                r#"
                UPDATE users
                SET google_id = $1,
                    avatar_url = COALESCE($2, avatar_url),
                    provider_name = 'google',
                    email_verified = TRUE,
                    updated_at = NOW()
                WHERE id = $3
                RETURNING *
                "#,
            )
            .bind(&profile.sub)
            .bind(&profile.picture)
            .bind(user.id)
            .fetch_one(&self.pool)
            .await?;

            return Ok(linked);
        }

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role, google_id, avatar_url, provider_name, email_verified)
            VALUES ($1, $2, 'TUTOR', $3, $4, 'google', TRUE)
            RETURNING *
            "#,
        )
        .bind(&profile.name)
        .bind(&email)
        .bind(&profile.sub)
        .bind(&profile.picture)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        Ok(user)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                avatar_url = COALESCE($2, avatar_url),
                updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(avatar_url)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self.get_user(user_id).await?;

        let Some(stored_hash) = user.password_hash.as_deref() else {
            return Err(Error::BadRequest(
                "This account signs in with Google and has no password".to_string(),
            ));
        };

        if !verify_password(current_password, stored_hash)? {
            return Err(Error::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = hash_password(new_password)?;
        sqlx::query(r#"UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2"#)
            .bind(new_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
