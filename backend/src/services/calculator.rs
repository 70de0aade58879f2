//! Recipe cost calculator service
//!
//! Recalculates the cached cost fields of stored recipes, runs what-if
//! simulations, and reports ingredient usage and margins. All arithmetic
//! lives in `shared::costing`; this service only moves rows in and out.
//!
//! Cached fields (`recipe_ingredients.cost`, `recipes.total_cost`,
//! `final_cost`, `profit_margin`, `net_profit`) are only written by
//! [`CalculatorService::recalculate`]. Editing an ingredient's unit cost
//! leaves them stale until the recipe is recalculated.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::costing::{
    self, CostLine, IngredientUsage, MarginAnalysis, RecipeCostSummary, RecipeMargin,
    RecipeUsage, SimulationResult,
};
use shared::{validate_lines, RecipeIngredientInput, SimulationInput};

/// Calculator service for recipe costing
#[derive(Clone)]
pub struct CalculatorService {
    db: PgPool,
}

/// Pricing inputs of a recipe
#[derive(Debug, FromRow)]
struct RecipePricingRow {
    servings: i32,
    operational_cost: Decimal,
    selling_price: Decimal,
}

/// A recipe line joined with its ingredient's current unit cost
#[derive(Debug, FromRow)]
struct PricedLineRow {
    id: Uuid,
    quantity: Decimal,
    unit_cost: Decimal,
}

#[derive(Debug, Clone, FromRow)]
struct IngredientPriceRow {
    id: Uuid,
    name: String,
    unit_cost: Decimal,
}

#[derive(Debug, FromRow)]
struct UsageRow {
    recipe_id: Uuid,
    recipe_name: String,
    quantity: Decimal,
    cost: Decimal,
}

#[derive(Debug, FromRow)]
struct MarginRow {
    id: Uuid,
    name: String,
    category_name: Option<String>,
    final_cost: Decimal,
    selling_price: Decimal,
    profit_margin: Decimal,
    net_profit: Decimal,
}

impl CalculatorService {
    /// Create a new CalculatorService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Recalculate a recipe owned by `user_id` and persist the results.
    ///
    /// Line costs and recipe totals are written in one transaction.
    pub async fn calculate_recipe_costs(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> AppResult<RecipeCostSummary> {
        let mut tx = self.db.begin().await?;

        let owned = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1 AND user_id = $2)",
        )
        .bind(recipe_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if !owned {
            return Err(AppError::NotFound(format!("Recipe {}", recipe_id)));
        }

        let summary = Self::recalculate(&mut *tx, recipe_id).await?;
        tx.commit().await?;

        Ok(summary)
    }

    /// Recalculate a recipe on an open connection or transaction.
    ///
    /// Every line's cached cost is overwritten with `quantity * unit_cost`
    /// at the unit costs read here, then the recipe's four derived fields
    /// are written. Concurrent recalculations of the same recipe are
    /// last-write-wins.
    pub async fn recalculate(
        conn: &mut PgConnection,
        recipe_id: Uuid,
    ) -> AppResult<RecipeCostSummary> {
        let recipe = sqlx::query_as::<_, RecipePricingRow>(
            "SELECT servings, operational_cost, selling_price FROM recipes WHERE id = $1",
        )
        .bind(recipe_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recipe {}", recipe_id)))?;

        let lines = sqlx::query_as::<_, PricedLineRow>(
            r#"
            SELECT ri.id, ri.quantity, i.unit_cost
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.sort_order
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&mut *conn)
        .await?;

        // Fails on invalid servings or out-of-range amounts before anything is written
        let (line_ids, line_costs, summary) = cost_recipe(&recipe, &lines)?;

        if !line_ids.is_empty() {
            sqlx::query(
                r#"
                UPDATE recipe_ingredients AS ri
                SET cost = v.cost
                FROM UNNEST($1::uuid[], $2::numeric[]) AS v(id, cost)
                WHERE ri.id = v.id
                "#,
            )
            .bind(&line_ids)
            .bind(&line_costs)
            .execute(&mut *conn)
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE recipes
            SET total_cost = $1, final_cost = $2, profit_margin = $3, net_profit = $4,
                updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(summary.total_cost)
        .bind(summary.final_cost)
        .bind(summary.profit_margin)
        .bind(summary.net_profit)
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

        tracing::info!(
            recipe_id = %recipe_id,
            lines = lines.len(),
            final_cost = %summary.final_cost,
            profit_margin = %summary.profit_margin,
            "Recalculated recipe costs"
        );

        Ok(summary)
    }

    /// Cost a hypothetical ingredient list. Reads only; any unknown
    /// ingredient aborts the whole simulation.
    pub async fn simulate_recipe_cost(
        &self,
        user_id: Uuid,
        input: SimulationInput,
    ) -> AppResult<SimulationResult> {
        input.validate()?;
        validate_lines(&input.ingredients)?;

        let mut prices: HashMap<Uuid, IngredientPriceRow> = HashMap::new();
        if !input.ingredients.is_empty() {
            let ids: Vec<Uuid> = input.ingredients.iter().map(|l| l.ingredient_id).collect();
            let rows = sqlx::query_as::<_, IngredientPriceRow>(
                "SELECT id, name, unit_cost FROM ingredients WHERE id = ANY($1) AND user_id = $2",
            )
            .bind(&ids)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
            prices.extend(rows.into_iter().map(|row| (row.id, row)));
        }

        let lines = price_lines(&input.ingredients, &prices)?;
        let result = costing::simulate(
            lines,
            input.operational_cost.unwrap_or(Decimal::ZERO),
            input.servings.unwrap_or(1),
        )?;

        tracing::debug!(
            user_id = %user_id,
            lines = result.ingredients.len(),
            final_cost = %result.final_cost,
            "Simulated recipe cost"
        );

        Ok(result)
    }

    /// Consumption of an ingredient across the user's active recipes.
    ///
    /// Costs are the cached line costs from each recipe's last
    /// recalculation, not recomputed against the current unit cost.
    pub async fn calculate_ingredient_usage(
        &self,
        ingredient_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<IngredientUsage> {
        let rows = sqlx::query_as::<_, UsageRow>(
            r#"
            SELECT r.id AS recipe_id, r.name AS recipe_name, ri.quantity, ri.cost
            FROM recipe_ingredients ri
            JOIN recipes r ON r.id = ri.recipe_id
            WHERE ri.ingredient_id = $1 AND r.user_id = $2 AND r.is_active = TRUE
            ORDER BY r.name, ri.sort_order
            "#,
        )
        .bind(ingredient_id)
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(costing::summarize_usage(
            rows.into_iter()
                .map(|row| RecipeUsage {
                    recipe_id: row.recipe_id,
                    recipe_name: row.recipe_name,
                    quantity: row.quantity,
                    cost: row.cost,
                })
                .collect(),
        )?)
    }

    /// Margin statistics over the user's active, priced recipes
    pub async fn get_margin_analysis(&self, user_id: Uuid) -> AppResult<MarginAnalysis> {
        let rows = sqlx::query_as::<_, MarginRow>(
            r#"
            SELECT r.id, r.name, c.name AS category_name, r.final_cost, r.selling_price,
                   r.profit_margin, r.net_profit
            FROM recipes r
            LEFT JOIN categories c ON c.id = r.category_id
            WHERE r.user_id = $1 AND r.is_active = TRUE AND r.selling_price > 0
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(costing::analyze_margins(
            rows.into_iter()
                .map(|row| RecipeMargin {
                    id: row.id,
                    name: row.name,
                    category_name: row.category_name,
                    final_cost: row.final_cost,
                    selling_price: row.selling_price,
                    profit_margin: row.profit_margin,
                    net_profit: row.net_profit,
                })
                .collect(),
        )?)
    }
}

/// Line ids paired with their new costs, and the recipe totals
fn cost_recipe(
    recipe: &RecipePricingRow,
    lines: &[PricedLineRow],
) -> AppResult<(Vec<Uuid>, Vec<Decimal>, RecipeCostSummary)> {
    let line_costs = lines
        .iter()
        .map(|line| costing::line_cost(line.quantity, line.unit_cost))
        .collect::<Result<Vec<_>, _>>()?;

    let summary = costing::summarize_recipe(
        line_costs.iter().copied(),
        recipe.operational_cost,
        recipe.selling_price,
        recipe.servings,
    )?;

    let line_ids = lines.iter().map(|line| line.id).collect();
    Ok((line_ids, line_costs, summary))
}

/// Attach names and unit costs to requested lines, in request order.
/// The first unknown ingredient fails the whole batch.
fn price_lines(
    lines: &[RecipeIngredientInput],
    prices: &HashMap<Uuid, IngredientPriceRow>,
) -> AppResult<Vec<CostLine>> {
    lines
        .iter()
        .map(|line| {
            let price = prices
                .get(&line.ingredient_id)
                .ok_or_else(|| AppError::NotFound(format!("Ingredient {}", line.ingredient_id)))?;
            Ok(CostLine {
                ingredient_id: line.ingredient_id,
                name: price.name.clone(),
                quantity: line.quantity,
                unit_cost: price.unit_cost,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(name: &str, unit_cost: &str) -> IngredientPriceRow {
        IngredientPriceRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            unit_cost: Decimal::from_str(unit_cost).unwrap(),
        }
    }

    #[test]
    fn test_price_lines_keeps_request_order() {
        let flour = price("Flour", "4.50");
        let eggs = price("Eggs", "8.90");
        let prices: HashMap<Uuid, IngredientPriceRow> = [flour.clone(), eggs.clone()]
            .into_iter()
            .map(|row| (row.id, row))
            .collect();

        let request = vec![
            RecipeIngredientInput { ingredient_id: eggs.id, quantity: Decimal::ONE },
            RecipeIngredientInput { ingredient_id: flour.id, quantity: Decimal::TWO },
        ];

        let lines = price_lines(&request, &prices).unwrap();
        assert_eq!(lines[0].name, "Eggs");
        assert_eq!(lines[1].name, "Flour");
        assert_eq!(lines[1].cost().unwrap(), Decimal::from_str("9.00").unwrap());
    }

    #[test]
    fn test_price_lines_reports_missing_ingredient() {
        let flour = price("Flour", "4.50");
        let missing = Uuid::new_v4();
        let prices: HashMap<Uuid, IngredientPriceRow> = [(flour.id, flour.clone())].into_iter().collect();

        let request = vec![
            RecipeIngredientInput { ingredient_id: flour.id, quantity: Decimal::ONE },
            RecipeIngredientInput { ingredient_id: missing, quantity: Decimal::ONE },
        ];

        match price_lines(&request, &prices) {
            Err(AppError::NotFound(message)) => assert!(message.contains(&missing.to_string())),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn priced(quantity: &str, unit_cost: &str) -> PricedLineRow {
        PricedLineRow {
            id: Uuid::new_v4(),
            quantity: dec(quantity),
            unit_cost: dec(unit_cost),
        }
    }

    #[test]
    fn test_cost_recipe_pairs_ids_with_costs() {
        let recipe = RecipePricingRow {
            servings: 4,
            operational_cost: dec("2.00"),
            selling_price: dec("40.00"),
        };
        let lines = vec![priced("2", "4.50"), priced("0.5", "17.80"), priced("3", "0")];

        let (ids, costs, summary) = cost_recipe(&recipe, &lines).unwrap();

        assert_eq!(ids, lines.iter().map(|l| l.id).collect::<Vec<_>>());
        assert_eq!(costs, vec![dec("9.00"), dec("8.900"), dec("0")]);
        assert_eq!(summary.total_cost, dec("17.90"));
        assert_eq!(summary.final_cost, dec("19.90"));
        assert_eq!(summary.net_profit, dec("20.10"));
    }

    #[test]
    fn test_cost_recipe_fails_before_writing() {
        let recipe = RecipePricingRow {
            servings: 0,
            operational_cost: Decimal::ZERO,
            selling_price: Decimal::ZERO,
        };
        assert!(matches!(
            cost_recipe(&recipe, &[priced("1", "1")]),
            Err(AppError::InvalidState(_))
        ));

        let recipe = RecipePricingRow { servings: 1, ..recipe };
        assert!(matches!(
            cost_recipe(&recipe, &[priced("100000000000000000", "100000000000000")]),
            Err(AppError::InvalidState(_))
        ));
    }

    #[derive(FromRow)]
    struct StoredLine {
        quantity: Decimal,
        unit_cost: Decimal,
        cost: Decimal,
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn test_recalculate_writes_every_line(pool: PgPool) -> sqlx::Result<()> {
        let user_id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (email, name, password_hash) VALUES ('baker@example.com', 'Baker', 'x') RETURNING id",
        )
        .fetch_one(&pool)
        .await?;

        let recipe_id: Uuid = sqlx::query_scalar(
            "INSERT INTO recipes (user_id, name, servings, operational_cost, selling_price) VALUES ($1, 'Bread', 4, 2.00, 40.00) RETURNING id",
        )
        .bind(user_id)
        .fetch_one(&pool)
        .await?;

        for (sort_order, (name, unit_cost, quantity)) in
            [("Flour", "4.50", "2"), ("Butter", "17.80", "0.5"), ("Salt", "0.90", "0.01")]
                .into_iter()
                .enumerate()
        {
            let ingredient_id: Uuid = sqlx::query_scalar(
                "INSERT INTO ingredients (user_id, name, unit, unit_cost) VALUES ($1, $2, 'kg', $3) RETURNING id",
            )
            .bind(user_id)
            .bind(name)
            .bind(dec(unit_cost))
            .fetch_one(&pool)
            .await?;

            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, sort_order) VALUES ($1, $2, $3, $4)",
            )
            .bind(recipe_id)
            .bind(ingredient_id)
            .bind(dec(quantity))
            .bind(sort_order as i32)
            .execute(&pool)
            .await?;
        }

        let summary = CalculatorService::new(pool.clone())
            .calculate_recipe_costs(user_id, recipe_id)
            .await
            .unwrap();

        let stored = sqlx::query_as::<_, StoredLine>(
            r#"
            SELECT ri.quantity, i.unit_cost, ri.cost
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&pool)
        .await?;

        assert_eq!(stored.len(), 3);
        for line in &stored {
            assert_eq!(line.cost, line.quantity * line.unit_cost);
        }
        let total: Decimal = stored.iter().map(|l| l.cost).sum();
        assert_eq!(summary.total_cost, total);

        let cached: Decimal = sqlx::query_scalar("SELECT total_cost FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(cached, total);

        Ok(())
    }
}
