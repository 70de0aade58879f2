//! Recipe management service
//!
//! Creating or editing a recipe always ends with a cost recalculation in
//! the same transaction, so the cached cost fields match the lines that
//! were just written.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::CalculatorService;
use shared::{validate_lines, CreateRecipeInput, RecipeIngredientInput, UpdateRecipeInput};

/// Recipe service for managing recipes and their ingredient lines
#[derive(Clone)]
pub struct RecipeService {
    db: PgPool,
}

const RECIPE_COLUMNS: &str = r#"
    r.id, r.user_id, r.category_id, r.name, r.description, r.servings, r.preparation_time,
    r.difficulty, r.instructions, r.operational_cost, r.selling_price, r.total_cost,
    r.final_cost, r.profit_margin, r.net_profit, r.is_active, r.created_at, r.updated_at
"#;

/// Recipe record, including the cached cost fields
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub servings: i32,
    pub preparation_time: Option<i32>,
    pub difficulty: Option<String>,
    pub instructions: Option<String>,
    pub operational_cost: Decimal,
    pub selling_price: Decimal,
    pub total_cost: Decimal,
    pub final_cost: Decimal,
    pub profit_margin: Decimal,
    pub net_profit: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recipe in a listing
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub recipe: Recipe,
    pub category_name: Option<String>,
    pub ingredient_count: i64,
}

/// Ingredient line of a recipe
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeLine {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub unit: String,
    pub unit_cost: Decimal,
    pub quantity: Decimal,
    /// Cost cached at the last recalculation
    pub cost: Decimal,
}

/// Recipe with its lines
#[derive(Debug, Clone, Serialize)]
pub struct RecipeWithIngredients {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub category_name: Option<String>,
    pub ingredients: Vec<RecipeLine>,
}

/// Recipe list filter
#[derive(Debug, Default, Deserialize)]
pub struct RecipeFilter {
    pub category_id: Option<Uuid>,
}

/// Recipe book statistics
#[derive(Debug, Serialize, FromRow)]
pub struct RecipeStats {
    pub total_recipes: i64,
    pub active_recipes: i64,
    pub inactive_recipes: i64,
    pub average_margin: Decimal,
    pub total_value: Decimal,
}

impl RecipeService {
    /// Create a new RecipeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a recipe with its ingredient lines and compute its costs
    pub async fn create(
        &self,
        user_id: Uuid,
        input: CreateRecipeInput,
    ) -> AppResult<RecipeWithIngredients> {
        input.validate()?;
        validate_lines(&input.ingredients)?;

        let mut tx = self.db.begin().await?;

        if let Some(category_id) = input.category_id {
            ensure_category_exists(&mut *tx, category_id).await?;
        }
        ensure_ingredients_owned(&mut *tx, user_id, &input.ingredients).await?;

        let recipe_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO recipes (
                user_id, category_id, name, description, servings, preparation_time,
                difficulty, instructions, operational_cost, selling_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(input.category_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.servings)
        .bind(input.preparation_time)
        .bind(&input.difficulty)
        .bind(&input.instructions)
        .bind(input.operational_cost.unwrap_or(Decimal::ZERO))
        .bind(input.selling_price.unwrap_or(Decimal::ZERO))
        .fetch_one(&mut *tx)
        .await?;

        insert_lines(&mut *tx, recipe_id, &input.ingredients).await?;
        CalculatorService::recalculate(&mut *tx, recipe_id).await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, recipe_id = %recipe_id, "Created recipe");

        self.get(user_id, recipe_id).await
    }

    /// List active recipes, newest first
    pub async fn list(&self, user_id: Uuid, filter: &RecipeFilter) -> AppResult<Vec<RecipeListItem>> {
        let recipes = sqlx::query_as::<_, RecipeListItem>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}, c.name AS category_name,
                   (SELECT COUNT(*) FROM recipe_ingredients ri WHERE ri.recipe_id = r.id) AS ingredient_count
            FROM recipes r
            LEFT JOIN categories c ON c.id = r.category_id
            WHERE r.user_id = $1 AND r.is_active = TRUE
              AND ($2::uuid IS NULL OR r.category_id = $2)
            ORDER BY r.created_at DESC
            "#
        ))
        .bind(user_id)
        .bind(filter.category_id)
        .fetch_all(&self.db)
        .await?;

        Ok(recipes)
    }

    /// Get a recipe with its ingredient lines
    pub async fn get(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<RecipeWithIngredients> {
        let row = sqlx::query_as::<_, RecipeListItem>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}, c.name AS category_name, 0::BIGINT AS ingredient_count
            FROM recipes r
            LEFT JOIN categories c ON c.id = r.category_id
            WHERE r.id = $1 AND r.user_id = $2
            "#
        ))
        .bind(recipe_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        let ingredients = sqlx::query_as::<_, RecipeLine>(
            r#"
            SELECT ri.id, ri.ingredient_id, i.name AS ingredient_name, i.unit, i.unit_cost,
                   ri.quantity, ri.cost
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.sort_order
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.db)
        .await?;

        Ok(RecipeWithIngredients {
            recipe: row.recipe,
            category_name: row.category_name,
            ingredients,
        })
    }

    /// Update a recipe. Lines are replaced wholesale when provided; costs
    /// are always recalculated.
    pub async fn update(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        input: UpdateRecipeInput,
    ) -> AppResult<RecipeWithIngredients> {
        input.validate()?;
        if let Some(lines) = &input.ingredients {
            validate_lines(lines)?;
        }

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1 AND r.user_id = $2"
        ))
        .bind(recipe_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        if let Some(Some(category_id)) = input.category_id {
            ensure_category_exists(&mut *tx, category_id).await?;
        }

        sqlx::query(
            r#"
            UPDATE recipes
            SET name = $1, description = $2, servings = $3, preparation_time = $4,
                difficulty = $5, instructions = $6, category_id = $7,
                operational_cost = $8, selling_price = $9, updated_at = NOW()
            WHERE id = $10
            "#,
        )
        .bind(input.name.as_deref().map(str::trim).unwrap_or(existing.name.as_str()))
        .bind(input.description.unwrap_or(existing.description))
        .bind(input.servings.unwrap_or(existing.servings))
        .bind(input.preparation_time.or(existing.preparation_time))
        .bind(input.difficulty.unwrap_or(existing.difficulty))
        .bind(input.instructions.unwrap_or(existing.instructions))
        .bind(input.category_id.unwrap_or(existing.category_id))
        .bind(input.operational_cost.unwrap_or(existing.operational_cost))
        .bind(input.selling_price.unwrap_or(existing.selling_price))
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

        if let Some(lines) = &input.ingredients {
            ensure_ingredients_owned(&mut *tx, user_id, lines).await?;

            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;

            insert_lines(&mut *tx, recipe_id, lines).await?;
        }

        CalculatorService::recalculate(&mut *tx, recipe_id).await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, recipe_id = %recipe_id, "Updated recipe");

        self.get(user_id, recipe_id).await
    }

    /// Soft-delete a recipe
    pub async fn remove(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE recipes SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(recipe_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Recipe".to_string()));
        }

        tracing::info!(user_id = %user_id, recipe_id = %recipe_id, "Deactivated recipe");

        Ok(())
    }

    /// Counts and cached-cost aggregates for the user's recipe book
    pub async fn stats(&self, user_id: Uuid) -> AppResult<RecipeStats> {
        let stats = sqlx::query_as::<_, RecipeStats>(
            r#"
            SELECT COUNT(*) AS total_recipes,
                   COUNT(*) FILTER (WHERE is_active) AS active_recipes,
                   COUNT(*) FILTER (WHERE NOT is_active) AS inactive_recipes,
                   COALESCE(AVG(profit_margin) FILTER (WHERE is_active), 0) AS average_margin,
                   COALESCE(SUM(final_cost) FILTER (WHERE is_active), 0) AS total_value
            FROM recipes
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(stats)
    }
}

async fn ensure_category_exists(conn: &mut PgConnection, category_id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
        .bind(category_id)
        .fetch_one(&mut *conn)
        .await?;

    if !exists {
        return Err(AppError::NotFound(format!("Category {}", category_id)));
    }
    Ok(())
}

/// Every referenced ingredient must be an active ingredient of the user
async fn ensure_ingredients_owned(
    conn: &mut PgConnection,
    user_id: Uuid,
    lines: &[RecipeIngredientInput],
) -> AppResult<()> {
    if lines.is_empty() {
        return Ok(());
    }

    let ids: Vec<Uuid> = lines.iter().map(|l| l.ingredient_id).collect();
    let found = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM ingredients WHERE id = ANY($1) AND user_id = $2 AND is_active = TRUE",
    )
    .bind(&ids)
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(AppError::NotFound(format!("Ingredient {}", missing))),
        None => Ok(()),
    }
}

async fn insert_lines(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    lines: &[RecipeIngredientInput],
) -> AppResult<()> {
    if lines.is_empty() {
        return Ok(());
    }

    let ingredient_ids: Vec<Uuid> = lines.iter().map(|l| l.ingredient_id).collect();
    let quantities: Vec<Decimal> = lines.iter().map(|l| l.quantity).collect();

    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, sort_order)
        SELECT $1, v.ingredient_id, v.quantity, v.sort_order
        FROM UNNEST($2::uuid[], $3::numeric[]) WITH ORDINALITY AS v(ingredient_id, quantity, sort_order)
        "#,
    )
    .bind(recipe_id)
    .bind(&ingredient_ids)
    .bind(&quantities)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
