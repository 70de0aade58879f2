//! WebAssembly module for the Bakery Back Office
//!
//! Runs the recipe costing engine in the browser so the pricing screen can
//! preview costs with the same arithmetic as the server. Money values cross
//! the boundary as decimal strings and results come back as JSON.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::costing::{self, CostLine, RecipeMargin};

#[derive(Serialize)]
struct ProfitPreview {
    net_profit: Decimal,
    profit_margin: Decimal,
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("bakery-wasm loaded"));
}

/// Cost a list of priced lines (`[{ingredient_id, name, quantity, unit_cost}]`)
#[wasm_bindgen]
pub fn simulate_recipe_cost(
    lines_json: &str,
    operational_cost: &str,
    servings: i32,
) -> Result<String, JsValue> {
    simulate_json(lines_json, operational_cost, servings).map_err(to_js_error)
}

/// Net profit and margin percentage for a selling price and final cost
#[wasm_bindgen]
pub fn calculate_profit(selling_price: &str, final_cost: &str) -> Result<String, JsValue> {
    profit_json(selling_price, final_cost).map_err(to_js_error)
}

/// Divide an amount by the number of servings
#[wasm_bindgen]
pub fn calculate_per_serving(amount: &str, servings: i32) -> Result<String, JsValue> {
    per_serving_string(amount, servings).map_err(to_js_error)
}

/// Margin statistics for a list of priced recipes
#[wasm_bindgen]
pub fn analyze_margins(recipes_json: &str) -> Result<String, JsValue> {
    margins_json(recipes_json).map_err(to_js_error)
}

fn to_js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    js_sys::Error::new(&message).into()
}

fn parse_amount(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|e| format!("Invalid {}: {}", field, e))
}

fn simulate_json(lines_json: &str, operational_cost: &str, servings: i32) -> Result<String, String> {
    let lines: Vec<CostLine> =
        serde_json::from_str(lines_json).map_err(|e| format!("Invalid lines JSON: {}", e))?;
    let operational_cost = parse_amount("operational cost", operational_cost)?;

    let result = costing::simulate(lines, operational_cost, servings).map_err(|e| e.to_string())?;
    serde_json::to_string(&result).map_err(|e| e.to_string())
}

fn profit_json(selling_price: &str, final_cost: &str) -> Result<String, String> {
    let selling_price = parse_amount("selling price", selling_price)?;
    let final_cost = parse_amount("final cost", final_cost)?;

    let (net_profit, profit_margin) =
        costing::profit(selling_price, final_cost).map_err(|e| e.to_string())?;
    serde_json::to_string(&ProfitPreview {
        net_profit,
        profit_margin,
    })
    .map_err(|e| e.to_string())
}

fn per_serving_string(amount: &str, servings: i32) -> Result<String, String> {
    let amount = parse_amount("amount", amount)?;
    costing::per_serving(amount, servings)
        .map(|value| value.to_string())
        .map_err(|e| e.to_string())
}

fn margins_json(recipes_json: &str) -> Result<String, String> {
    let recipes: Vec<RecipeMargin> =
        serde_json::from_str(recipes_json).map_err(|e| format!("Invalid recipes JSON: {}", e))?;
    let analysis = costing::analyze_margins(recipes).map_err(|e| e.to_string())?;
    serde_json::to_string(&analysis).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::costing::{MarginAnalysis, SimulationResult};

    #[test]
    fn test_simulate_bakery_lines() {
        let lines = r#"[
            {"ingredient_id": "00000000-0000-0000-0000-000000000001", "name": "Flour", "quantity": "2", "unit_cost": "4.50"},
            {"ingredient_id": "00000000-0000-0000-0000-000000000002", "name": "Butter", "quantity": "0.5", "unit_cost": "17.80"}
        ]"#;

        let json = simulate_json(lines, "2.00", 4).unwrap();
        let result: SimulationResult = serde_json::from_str(&json).unwrap();

        assert_eq!(result.total_ingredients_cost, Decimal::from_str("17.90").unwrap());
        assert_eq!(result.final_cost, Decimal::from_str("19.90").unwrap());
        assert_eq!(result.cost_per_serving, Decimal::from_str("4.975").unwrap());
        assert_eq!(result.ingredients.len(), 2);
    }

    #[test]
    fn test_simulate_rejects_zero_servings() {
        assert!(simulate_json("[]", "0", 0).is_err());
    }

    #[test]
    fn test_simulate_rejects_bad_amount() {
        assert!(simulate_json("[]", "abc", 1).unwrap_err().contains("operational cost"));
    }

    #[test]
    fn test_profit_zero_price() {
        let json = profit_json("0", "10").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let net_profit = Decimal::from_str(value["net_profit"].as_str().unwrap()).unwrap();
        let margin = Decimal::from_str(value["profit_margin"].as_str().unwrap()).unwrap();
        assert_eq!(net_profit, Decimal::ZERO);
        assert_eq!(margin, Decimal::ZERO);
    }

    #[test]
    fn test_profit_out_of_range() {
        let err = profit_json("0.0000000000000000000000001", "1000000000").unwrap_err();
        assert!(err.contains("too large"));
    }

    #[test]
    fn test_per_serving() {
        let value = per_serving_string("19.10", 4).unwrap();
        assert_eq!(Decimal::from_str(&value).unwrap(), Decimal::from_str("4.775").unwrap());
        assert!(per_serving_string("19.10", -1).is_err());
    }

    #[test]
    fn test_margins_empty() {
        let analysis: MarginAnalysis = serde_json::from_str(&margins_json("[]").unwrap()).unwrap();
        assert_eq!(analysis.analysis.total_recipes, 0);
        assert!(analysis.recipes.is_empty());
    }
}
