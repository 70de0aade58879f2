//! Category service. Categories are global and shared by recipes and ingredients.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{CreateCategoryInput, UpdateCategoryInput};

#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category with usage counts
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryWithCounts {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub category: Category,
    pub recipe_count: i64,
    pub ingredient_count: i64,
}

const CATEGORY_WITH_COUNTS: &str = r#"
    SELECT c.id, c.name, c.description, c.created_at, c.updated_at,
           (SELECT COUNT(*) FROM recipes r WHERE r.category_id = c.id AND r.is_active = TRUE) AS recipe_count,
           (SELECT COUNT(*) FROM ingredients i WHERE i.category_id = c.id AND i.is_active = TRUE) AS ingredient_count
    FROM categories c
"#;

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all categories by name
    pub async fn list(&self) -> AppResult<Vec<CategoryWithCounts>> {
        let categories = sqlx::query_as::<_, CategoryWithCounts>(&format!(
            "{CATEGORY_WITH_COUNTS} ORDER BY c.name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    pub async fn get(&self, category_id: Uuid) -> AppResult<CategoryWithCounts> {
        sqlx::query_as::<_, CategoryWithCounts>(&format!("{CATEGORY_WITH_COUNTS} WHERE c.id = $1"))
            .bind(category_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    /// Create a category with a unique name
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<Category> {
        input.validate()?;

        let name = input.name.trim();
        self.ensure_name_available(name, None).await?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(category_id = %category.id, name = %category.name, "Created category");

        Ok(category)
    }

    pub async fn update(&self, category_id: Uuid, input: UpdateCategoryInput) -> AppResult<Category> {
        input.validate()?;

        if let Some(name) = input.name.as_deref() {
            self.ensure_name_available(name.trim(), Some(category_id)).await?;
        }

        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                updated_at = NOW()
            WHERE id = $3
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    /// Delete a category that no recipe or ingredient references
    pub async fn delete(&self, category_id: Uuid) -> AppResult<()> {
        let usage = self.get(category_id).await?;
        if usage.recipe_count > 0 || usage.ingredient_count > 0 {
            return Err(AppError::Conflict {
                resource: "category".to_string(),
                message: format!(
                    "Category is used by {} recipes and {} ingredients",
                    usage.recipe_count, usage.ingredient_count
                ),
            });
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.db)
            .await?;

        tracing::info!(category_id = %category_id, "Deleted category");

        Ok(())
    }

    async fn ensure_name_available(&self, name: &str, except: Option<Uuid>) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE LOWER(name) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(except)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        Ok(())
    }
}
