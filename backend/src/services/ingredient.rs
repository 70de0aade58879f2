//! Ingredient inventory service for stock tracking and alerts

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{CreateIngredientInput, UpdateIngredientInput, UpdateStockInput};

/// Ingredients expiring within this many days are reported in stock alerts
pub const EXPIRY_ALERT_WINDOW_DAYS: i64 = 30;

/// Ingredient service for managing ingredients and stock levels
#[derive(Clone)]
pub struct IngredientService {
    db: PgPool,
}

const INGREDIENT_COLUMNS: &str = r#"
    i.id, i.user_id, i.category_id, i.supplier_id, i.name, i.description, i.unit,
    i.unit_cost, i.stock, i.min_stock, i.expiration_date, i.is_active, i.created_at, i.updated_at
"#;

/// Ingredient record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub unit_cost: Decimal,
    pub stock: Decimal,
    pub min_stock: Decimal,
    pub expiration_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ingredient with related names, as listed
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IngredientListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub ingredient: Ingredient,
    pub category_name: Option<String>,
    pub supplier_name: Option<String>,
    pub recipe_count: i64,
}

/// Recipe that uses an ingredient
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IngredientRecipeRef {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub servings: i32,
    pub quantity: Decimal,
}

/// Ingredient with the recipes that use it
#[derive(Debug, Clone, Serialize)]
pub struct IngredientDetail {
    #[serde(flatten)]
    pub ingredient: IngredientListItem,
    pub recipes: Vec<IngredientRecipeRef>,
}

/// Ingredient list filter
#[derive(Debug, Default, Deserialize)]
pub struct IngredientFilter {
    pub category_id: Option<Uuid>,
    pub low_stock: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AlertCounts {
    pub low_stock_count: i64,
    pub expiring_soon_count: i64,
}

/// Low stock and expiring ingredients
#[derive(Debug, Serialize)]
pub struct StockAlerts {
    pub low_stock: Vec<IngredientListItem>,
    pub expiring_soon: Vec<IngredientListItem>,
    pub alerts: AlertCounts,
}

/// Inventory statistics
#[derive(Debug, Serialize, FromRow)]
pub struct IngredientStats {
    pub total_ingredients: i64,
    pub low_stock_count: i64,
    /// Sum of stock x unit cost
    pub total_stock_value: Decimal,
    pub categories_count: i64,
}

impl IngredientService {
    /// Create a new IngredientService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an ingredient
    pub async fn create(&self, user_id: Uuid, input: CreateIngredientInput) -> AppResult<Ingredient> {
        input.validate()?;

        let mut conn = self.db.acquire().await?;
        ensure_references(&mut *conn, user_id, input.category_id, input.supplier_id).await?;

        let ingredient = sqlx::query_as::<_, Ingredient>(&format!(
            r#"
            INSERT INTO ingredients AS i (
                user_id, category_id, supplier_id, name, description, unit, unit_cost,
                stock, min_stock, expiration_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {INGREDIENT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.unit.trim())
        .bind(input.unit_cost)
        .bind(input.stock.unwrap_or(Decimal::ZERO))
        .bind(input.min_stock.unwrap_or(Decimal::ZERO))
        .bind(input.expiration_date)
        .fetch_one(&mut *conn)
        .await?;

        tracing::info!(user_id = %user_id, ingredient_id = %ingredient.id, "Created ingredient");

        Ok(ingredient)
    }

    /// List active ingredients by name
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &IngredientFilter,
    ) -> AppResult<Vec<IngredientListItem>> {
        let ingredients = sqlx::query_as::<_, IngredientListItem>(&format!(
            r#"
            {}
            WHERE i.user_id = $1 AND i.is_active = TRUE
              AND ($2::uuid IS NULL OR i.category_id = $2)
              AND ($3 = FALSE OR i.stock <= i.min_stock)
            ORDER BY i.name
            "#,
            list_query()
        ))
        .bind(user_id)
        .bind(filter.category_id)
        .bind(filter.low_stock.unwrap_or(false))
        .fetch_all(&self.db)
        .await?;

        Ok(ingredients)
    }

    /// Get an ingredient with the recipes that use it
    pub async fn get(&self, user_id: Uuid, ingredient_id: Uuid) -> AppResult<IngredientDetail> {
        let ingredient = sqlx::query_as::<_, IngredientListItem>(&format!(
            "{} WHERE i.id = $1 AND i.user_id = $2",
            list_query()
        ))
        .bind(ingredient_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        let recipes = sqlx::query_as::<_, IngredientRecipeRef>(
            r#"
            SELECT r.id AS recipe_id, r.name AS recipe_name, r.servings, ri.quantity
            FROM recipe_ingredients ri
            JOIN recipes r ON r.id = ri.recipe_id
            WHERE ri.ingredient_id = $1 AND r.is_active = TRUE
            ORDER BY r.name
            "#,
        )
        .bind(ingredient_id)
        .fetch_all(&self.db)
        .await?;

        Ok(IngredientDetail { ingredient, recipes })
    }

    /// Update an ingredient. Missing fields keep their value and `null`
    /// clears a nullable one. Recipes using it keep their cached costs
    /// until they are recalculated.
    pub async fn update(
        &self,
        user_id: Uuid,
        ingredient_id: Uuid,
        input: UpdateIngredientInput,
    ) -> AppResult<Ingredient> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let existing = find_owned(&mut *tx, user_id, ingredient_id).await?;
        ensure_references(
            &mut *tx,
            user_id,
            input.category_id.flatten(),
            input.supplier_id.flatten(),
        )
        .await?;

        let ingredient = sqlx::query_as::<_, Ingredient>(&format!(
            r#"
            UPDATE ingredients AS i
            SET name = $1, description = $2, unit = $3, unit_cost = $4, stock = $5,
                min_stock = $6, expiration_date = $7, category_id = $8, supplier_id = $9,
                is_active = $10, updated_at = NOW()
            WHERE i.id = $11
            RETURNING {INGREDIENT_COLUMNS}
            "#
        ))
        .bind(input.name.as_deref().map(str::trim).unwrap_or(existing.name.as_str()))
        .bind(input.description.unwrap_or(existing.description))
        .bind(input.unit.as_deref().map(str::trim).unwrap_or(existing.unit.as_str()))
        .bind(input.unit_cost.unwrap_or(existing.unit_cost))
        .bind(input.stock.unwrap_or(existing.stock))
        .bind(input.min_stock.unwrap_or(existing.min_stock))
        .bind(input.expiration_date.unwrap_or(existing.expiration_date))
        .bind(input.category_id.unwrap_or(existing.category_id))
        .bind(input.supplier_id.unwrap_or(existing.supplier_id))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(ingredient_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if ingredient.unit_cost != existing.unit_cost {
            tracing::info!(
                ingredient_id = %ingredient_id,
                old_unit_cost = %existing.unit_cost,
                new_unit_cost = %ingredient.unit_cost,
                "Ingredient unit cost changed; recipe costs are not recalculated"
            );
        }

        Ok(ingredient)
    }

    /// Soft-delete an ingredient
    pub async fn remove(&self, user_id: Uuid, ingredient_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE ingredients SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(ingredient_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Ingredient".to_string()));
        }

        tracing::info!(user_id = %user_id, ingredient_id = %ingredient_id, "Deactivated ingredient");

        Ok(())
    }

    /// Add to or subtract from an ingredient's stock
    pub async fn update_stock(
        &self,
        user_id: Uuid,
        ingredient_id: Uuid,
        input: UpdateStockInput,
    ) -> AppResult<Ingredient> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, Decimal>(
            "SELECT stock FROM ingredients WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(ingredient_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        let stock = input.operation.apply(current, input.quantity)?;

        let ingredient = sqlx::query_as::<_, Ingredient>(&format!(
            r#"
            UPDATE ingredients AS i SET stock = $1, updated_at = NOW()
            WHERE i.id = $2
            RETURNING {INGREDIENT_COLUMNS}
            "#
        ))
        .bind(stock)
        .bind(ingredient_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            ingredient_id = %ingredient_id,
            previous = %current,
            stock = %stock,
            "Adjusted ingredient stock"
        );

        Ok(ingredient)
    }

    /// Ingredients at or below their minimum stock, and those expiring soon
    pub async fn stock_alerts(&self, user_id: Uuid) -> AppResult<StockAlerts> {
        let low_stock = sqlx::query_as::<_, IngredientListItem>(&format!(
            r#"
            {}
            WHERE i.user_id = $1 AND i.is_active = TRUE AND i.stock <= i.min_stock
            ORDER BY i.name
            "#,
            list_query()
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let cutoff = Utc::now().date_naive() + Duration::days(EXPIRY_ALERT_WINDOW_DAYS);
        let expiring_soon = sqlx::query_as::<_, IngredientListItem>(&format!(
            r#"
            {}
            WHERE i.user_id = $1 AND i.is_active = TRUE AND i.expiration_date <= $2
            ORDER BY i.expiration_date, i.name
            "#,
            list_query()
        ))
        .bind(user_id)
        .bind(cutoff)
        .fetch_all(&self.db)
        .await?;

        Ok(StockAlerts {
            alerts: AlertCounts {
                low_stock_count: low_stock.len() as i64,
                expiring_soon_count: expiring_soon.len() as i64,
            },
            low_stock,
            expiring_soon,
        })
    }

    /// Inventory statistics for the user
    pub async fn stats(&self, user_id: Uuid) -> AppResult<IngredientStats> {
        let stats = sqlx::query_as::<_, IngredientStats>(
            r#"
            SELECT COUNT(*) AS total_ingredients,
                   COUNT(*) FILTER (WHERE stock <= min_stock) AS low_stock_count,
                   COALESCE(SUM(stock * unit_cost), 0) AS total_stock_value,
                   COUNT(DISTINCT category_id) AS categories_count
            FROM ingredients
            WHERE user_id = $1 AND is_active = TRUE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(stats)
    }
}

fn list_query() -> String {
    format!(
        r#"
        SELECT {INGREDIENT_COLUMNS}, c.name AS category_name, s.name AS supplier_name,
               (SELECT COUNT(*) FROM recipe_ingredients ri WHERE ri.ingredient_id = i.id) AS recipe_count
        FROM ingredients i
        LEFT JOIN categories c ON c.id = i.category_id
        LEFT JOIN suppliers s ON s.id = i.supplier_id
        "#
    )
}

async fn find_owned(conn: &mut PgConnection, user_id: Uuid, ingredient_id: Uuid) -> AppResult<Ingredient> {
    sqlx::query_as::<_, Ingredient>(&format!(
        "SELECT {INGREDIENT_COLUMNS} FROM ingredients i WHERE i.id = $1 AND i.user_id = $2"
    ))
    .bind(ingredient_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))
}

/// Category must exist; supplier must belong to the user
async fn ensure_references(
    conn: &mut PgConnection,
    user_id: Uuid,
    category_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
) -> AppResult<()> {
    if let Some(category_id) = category_id {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(category_id)
            .fetch_one(&mut *conn)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Category {}", category_id)));
        }
    }

    if let Some(supplier_id) = supplier_id {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1 AND user_id = $2)",
        )
        .bind(supplier_id)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Supplier {}", supplier_id)));
        }
    }

    Ok(())
}
