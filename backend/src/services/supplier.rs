//! Supplier service

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{CreateSupplierInput, UpdateSupplierInput};

#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cnpj: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SupplierListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub supplier: Supplier,
    pub ingredient_count: i64,
}

const SUPPLIER_COLUMNS: &str =
    "id, user_id, name, email, phone, address, cnpj, is_active, created_at, updated_at";

impl SupplierService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List the user's active suppliers
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<SupplierListItem>> {
        let suppliers = sqlx::query_as::<_, SupplierListItem>(
            r#"
            SELECT s.id, s.user_id, s.name, s.email, s.phone, s.address, s.cnpj, s.is_active,
                   s.created_at, s.updated_at,
                   (SELECT COUNT(*) FROM ingredients i WHERE i.supplier_id = s.id AND i.is_active = TRUE) AS ingredient_count
            FROM suppliers s
            WHERE s.user_id = $1 AND s.is_active = TRUE
            ORDER BY s.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    pub async fn get(&self, user_id: Uuid, supplier_id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1 AND user_id = $2"
        ))
        .bind(supplier_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    pub async fn create(&self, user_id: Uuid, input: CreateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO suppliers (user_id, name, email, phone, address, cnpj)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.cnpj)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user_id, supplier_id = %supplier.id, "Created supplier");

        Ok(supplier)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> AppResult<Supplier> {
        input.validate()?;

        sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers
            SET name = COALESCE($1, name),
                email = COALESCE($2, email),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                cnpj = COALESCE($5, cnpj),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $7 AND user_id = $8
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.cnpj)
        .bind(input.is_active)
        .bind(supplier_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Soft-delete a supplier. Ingredients keep their reference.
    pub async fn remove(&self, user_id: Uuid, supplier_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE suppliers SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(supplier_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        Ok(())
    }
}
