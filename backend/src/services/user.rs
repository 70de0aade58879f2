//! User account management
//!
//! Self-service profile and password changes, plus admin listing, editing
//! and deactivation. Accounts are never hard-deleted because recipes,
//! ingredients and suppliers reference their owner.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{ChangePasswordInput, UpdateProfileInput, UpdateUserInput, UserRole};

#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Account as shown to its owner and to administrators
#[derive(Debug, Clone, Serialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    name: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for UserAccount {
    type Error = AppError;

    fn try_from(row: AccountRow) -> AppResult<Self> {
        let role = UserRole::parse(&row.role)
            .ok_or_else(|| AppError::Internal(format!("Unknown role '{}'", row.role)))?;
        Ok(UserAccount {
            id: row.id,
            email: row.email,
            name: row.name,
            role,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Counts of a user's active records
#[derive(Debug, Serialize, FromRow)]
pub struct UserStats {
    pub recipes: i64,
    pub ingredients: i64,
    pub suppliers: i64,
    pub low_stock_ingredients: i64,
}

const ACCOUNT_COLUMNS: &str = "id, email, name, role, is_active, created_at, updated_at";

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All accounts, oldest first
    pub async fn list(&self) -> AppResult<Vec<UserAccount>> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(UserAccount::try_from)
        .collect()
    }

    pub async fn get(&self, user_id: Uuid) -> AppResult<UserAccount> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?
        .try_into()
    }

    /// Change the caller's own name or email
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<UserAccount> {
        input.validate()?;

        self.apply_update(
            user_id,
            UpdateUserInput {
                email: input.email,
                name: input.name,
                role: None,
                is_active: None,
            },
        )
        .await
    }

    /// Change any account. `actor_id` is the administrator making the change.
    pub async fn update_user(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        input: UpdateUserInput,
    ) -> AppResult<UserAccount> {
        input.validate()?;
        check_self_change(actor_id, user_id, input.role, input.is_active)?;

        let account = self.apply_update(user_id, input).await?;

        tracing::info!(
            actor_id = %actor_id,
            user_id = %user_id,
            role = %account.role,
            is_active = account.is_active,
            "Updated user account"
        );

        Ok(account)
    }

    /// Replace the password after checking the current one
    pub async fn change_password(&self, user_id: Uuid, input: ChangePasswordInput) -> AppResult<()> {
        input.validate()?;

        let current_hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let valid = verify(&input.current_password, &current_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = hash(&input.new_password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        tracing::info!(user_id = %user_id, "Changed password");

        Ok(())
    }

    /// Disable an account. Its data stays in place and login is refused.
    pub async fn deactivate(&self, actor_id: Uuid, user_id: Uuid) -> AppResult<()> {
        check_self_change(actor_id, user_id, None, Some(false))?;

        let result = sqlx::query(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        tracing::info!(actor_id = %actor_id, user_id = %user_id, "Deactivated user");

        Ok(())
    }

    pub async fn stats(&self, user_id: Uuid) -> AppResult<UserStats> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM recipes WHERE user_id = $1 AND is_active = TRUE) AS recipes,
                (SELECT COUNT(*) FROM ingredients WHERE user_id = $1 AND is_active = TRUE) AS ingredients,
                (SELECT COUNT(*) FROM suppliers WHERE user_id = $1 AND is_active = TRUE) AS suppliers,
                (SELECT COUNT(*) FROM ingredients
                 WHERE user_id = $1 AND is_active = TRUE AND stock <= min_stock) AS low_stock_ingredients
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(stats)
    }

    async fn apply_update(&self, user_id: Uuid, input: UpdateUserInput) -> AppResult<UserAccount> {
        let email = input.email.as_deref().map(|e| e.trim().to_lowercase());
        if let Some(email) = &email {
            self.ensure_email_available(email, user_id).await?;
        }

        sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE users
            SET email = COALESCE($1, email),
                name = COALESCE($2, name),
                role = COALESCE($3, role),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $5
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.role.map(|role| role.as_str()))
        .bind(input.is_active)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?
        .try_into()
    }

    async fn ensure_email_available(&self, email: &str, except: Uuid) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        Ok(())
    }
}

/// Administrators may not lock themselves out
fn check_self_change(
    actor_id: Uuid,
    user_id: Uuid,
    role: Option<UserRole>,
    is_active: Option<bool>,
) -> AppResult<()> {
    if actor_id != user_id {
        return Ok(());
    }
    if is_active == Some(false) {
        return Err(AppError::InvalidState(
            "You cannot deactivate your own account".to_string(),
        ));
    }
    if role == Some(UserRole::User) {
        return Err(AppError::InvalidState(
            "You cannot remove your own admin role".to_string(),
        ));
    }
    Ok(())
}
