//! Recipe costing engine
//!
//! Pure arithmetic behind recipe pricing:
//! - Line cost = quantity x ingredient unit cost
//! - Final cost = ingredient cost + flat operational cost
//! - Net profit and profit margin against the batch selling price
//! - Margin analysis across a recipe book
//!
//! Nothing here touches storage. The backend loads rows, calls into this
//! module and persists whatever it decides to persist.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CostingError {
    #[error("servings must be at least 1, got {0}")]
    InvalidServings(i32),

    #[error("{0} is too large to compute")]
    Overflow(&'static str),
}

/// An ingredient line priced at the ingredient's current unit cost
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostLine {
    pub ingredient_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

impl CostLine {
    pub fn cost(&self) -> Result<Decimal, CostingError> {
        line_cost(self.quantity, self.unit_cost)
    }
}

/// Financial profile of a stored recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeCostSummary {
    /// Sum of ingredient line costs
    pub total_cost: Decimal,
    pub operational_cost: Decimal,
    pub final_cost: Decimal,
    pub selling_price: Decimal,
    /// Percentage of the selling price
    pub profit_margin: Decimal,
    pub net_profit: Decimal,
    pub cost_per_serving: Decimal,
    pub price_per_serving: Decimal,
}

/// A priced line of a simulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulatedLine {
    pub ingredient_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
}

/// Result of a what-if costing. No selling price is involved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    pub ingredients: Vec<SimulatedLine>,
    pub total_ingredients_cost: Decimal,
    pub operational_cost: Decimal,
    pub final_cost: Decimal,
    pub cost_per_serving: Decimal,
}

/// Cached financial fields of one recipe, as read for margin analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeMargin {
    pub id: Uuid,
    pub name: String,
    pub category_name: Option<String>,
    pub final_cost: Decimal,
    pub selling_price: Decimal,
    pub profit_margin: Decimal,
    pub net_profit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarginSummary {
    pub total_recipes: i64,
    pub average_margin: Decimal,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub best_margin: Decimal,
    pub worst_margin: Decimal,
    pub profitable_recipes: i64,
}

/// Margin statistics plus the recipes sorted by margin, best first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarginAnalysis {
    pub analysis: MarginSummary,
    pub recipes: Vec<RecipeMargin>,
}

/// One recipe line consuming an ingredient, with its cached cost
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeUsage {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub quantity: Decimal,
    /// Line cost as of the recipe's last recalculation
    pub cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientUsage {
    pub total_usage: Decimal,
    pub recipes_count: i64,
    pub recipes: Vec<RecipeUsage>,
}

/// Cost of `quantity` units at `unit_cost` per unit
pub fn line_cost(quantity: Decimal, unit_cost: Decimal) -> Result<Decimal, CostingError> {
    quantity
        .checked_mul(unit_cost)
        .ok_or(CostingError::Overflow("line cost"))
}

/// Net profit and profit margin (percent) of a batch.
///
/// Both are zero when the selling price is not positive.
pub fn profit(
    selling_price: Decimal,
    final_cost: Decimal,
) -> Result<(Decimal, Decimal), CostingError> {
    if selling_price <= Decimal::ZERO {
        return Ok((Decimal::ZERO, Decimal::ZERO));
    }

    let net_profit = selling_price
        .checked_sub(final_cost)
        .ok_or(CostingError::Overflow("net profit"))?;
    let profit_margin = net_profit
        .checked_div(selling_price)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .ok_or(CostingError::Overflow("profit margin"))?;
    Ok((net_profit, profit_margin))
}

/// Divide a batch amount across its servings
pub fn per_serving(amount: Decimal, servings: i32) -> Result<Decimal, CostingError> {
    if servings < 1 {
        return Err(CostingError::InvalidServings(servings));
    }
    amount
        .checked_div(Decimal::from(servings))
        .ok_or(CostingError::Overflow("per-serving amount"))
}

/// Sum that fails instead of panicking past `Decimal::MAX`
pub fn checked_sum<I>(values: I, what: &'static str) -> Result<Decimal, CostingError>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or(CostingError::Overflow(what))
    })
}

/// Build the financial profile of a recipe from its line costs
pub fn summarize_recipe<I>(
    line_costs: I,
    operational_cost: Decimal,
    selling_price: Decimal,
    servings: i32,
) -> Result<RecipeCostSummary, CostingError>
where
    I: IntoIterator<Item = Decimal>,
{
    let total_cost = checked_sum(line_costs, "total cost")?;
    let final_cost = checked_sum([total_cost, operational_cost], "final cost")?;
    let (net_profit, profit_margin) = profit(selling_price, final_cost)?;

    Ok(RecipeCostSummary {
        total_cost,
        operational_cost,
        final_cost,
        selling_price,
        profit_margin,
        net_profit,
        cost_per_serving: per_serving(final_cost, servings)?,
        price_per_serving: per_serving(selling_price, servings)?,
    })
}

/// Cost an arbitrary ingredient list without a stored recipe
pub fn simulate(
    lines: Vec<CostLine>,
    operational_cost: Decimal,
    servings: i32,
) -> Result<SimulationResult, CostingError> {
    let ingredients = lines
        .into_iter()
        .map(|line| {
            Ok(SimulatedLine {
                total_cost: line.cost()?,
                ingredient_id: line.ingredient_id,
                name: line.name,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
            })
        })
        .collect::<Result<Vec<_>, CostingError>>()?;

    let total_ingredients_cost =
        checked_sum(ingredients.iter().map(|l| l.total_cost), "ingredient cost")?;
    let final_cost = checked_sum([total_ingredients_cost, operational_cost], "final cost")?;

    Ok(SimulationResult {
        cost_per_serving: per_serving(final_cost, servings)?,
        ingredients,
        total_ingredients_cost,
        operational_cost,
        final_cost,
    })
}

/// Aggregate cached margins across a recipe book.
///
/// Callers pass only the recipes that qualify (active, positive selling
/// price). An empty book yields all-zero statistics. Best and worst are the
/// real extremes, so a book of loss makers reports a negative best margin.
pub fn analyze_margins(mut recipes: Vec<RecipeMargin>) -> Result<MarginAnalysis, CostingError> {
    let count = recipes.len() as i64;

    let total_margin = checked_sum(recipes.iter().map(|r| r.profit_margin), "margin total")?;
    let average_margin = if count > 0 {
        total_margin
            .checked_div(Decimal::from(count))
            .ok_or(CostingError::Overflow("average margin"))?
    } else {
        Decimal::ZERO
    };

    let analysis = MarginSummary {
        total_recipes: count,
        average_margin,
        total_revenue: checked_sum(recipes.iter().map(|r| r.selling_price), "total revenue")?,
        total_cost: checked_sum(recipes.iter().map(|r| r.final_cost), "total cost")?,
        total_profit: checked_sum(recipes.iter().map(|r| r.net_profit), "total profit")?,
        best_margin: recipes
            .iter()
            .map(|r| r.profit_margin)
            .max()
            .unwrap_or(Decimal::ZERO),
        worst_margin: recipes
            .iter()
            .map(|r| r.profit_margin)
            .min()
            .unwrap_or(Decimal::ZERO),
        profitable_recipes: recipes
            .iter()
            .filter(|r| r.net_profit > Decimal::ZERO)
            .count() as i64,
    };

    recipes.sort_by(|a, b| b.profit_margin.cmp(&a.profit_margin));

    Ok(MarginAnalysis { analysis, recipes })
}

/// Total consumption of one ingredient across recipe lines
pub fn summarize_usage(recipes: Vec<RecipeUsage>) -> Result<IngredientUsage, CostingError> {
    Ok(IngredientUsage {
        total_usage: checked_sum(recipes.iter().map(|r| r.quantity), "total usage")?,
        recipes_count: recipes.len() as i64,
        recipes,
    })
}
