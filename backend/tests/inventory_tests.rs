//! Inventory and request validation tests
//!
//! Tests for stock adjustments and the validation rules applied to
//! recipe, simulation and ingredient requests.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    validate_lines, CreateIngredientInput, CreateRecipeInput, RecipeIngredientInput,
    SimulationInput, StockError, StockOperation,
};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn recipe_input(servings: i32) -> CreateRecipeInput {
    CreateRecipeInput {
        name: "Pão de queijo".to_string(),
        description: None,
        servings,
        preparation_time: Some(40),
        difficulty: Some("easy".to_string()),
        instructions: None,
        category_id: None,
        operational_cost: Some(dec("1.20")),
        selling_price: Some(dec("20.00")),
        ingredients: vec![RecipeIngredientInput {
            ingredient_id: Uuid::new_v4(),
            quantity: dec("2"),
        }],
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_stock_add_and_subtract() {
        assert_eq!(StockOperation::Add.apply(dec("5"), dec("2.5")), Ok(dec("7.5")));
        assert_eq!(StockOperation::Subtract.apply(dec("5"), dec("5")), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_stock_cannot_go_negative() {
        assert_eq!(
            StockOperation::Subtract.apply(dec("1"), dec("1.5")),
            Err(StockError::Negative {
                current: dec("1"),
                requested: dec("1.5"),
            })
        );
    }

    #[test]
    fn test_stock_operation_defaults_to_add() {
        let input: shared::UpdateStockInput = serde_json::from_str(r#"{"quantity": "3"}"#).unwrap();
        assert_eq!(input.operation, StockOperation::Add);

        let input: shared::UpdateStockInput =
            serde_json::from_str(r#"{"quantity": "3", "operation": "subtract"}"#).unwrap();
        assert_eq!(input.operation, StockOperation::Subtract);
    }

    #[test]
    fn test_recipe_requires_a_serving() {
        assert!(recipe_input(4).validate().is_ok());
        assert!(recipe_input(0).validate().is_err());
    }

    #[test]
    fn test_recipe_rejects_negative_selling_price() {
        let mut input = recipe_input(1);
        input.selling_price = Some(dec("-1"));
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_negative_line_quantity_rejected() {
        let lines = vec![
            RecipeIngredientInput { ingredient_id: Uuid::new_v4(), quantity: dec("1") },
            RecipeIngredientInput { ingredient_id: Uuid::new_v4(), quantity: dec("-0.1") },
        ];
        assert!(validate_lines(&lines).is_err());
    }

    #[test]
    fn test_simulation_defaults() {
        let input: SimulationInput = serde_json::from_str(r#"{"ingredients": []}"#).unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.operational_cost, None);
        assert_eq!(input.servings, None);
    }

    #[test]
    fn test_ingredient_requires_unit_and_name() {
        let input = CreateIngredientInput {
            name: "  ".to_string(),
            description: None,
            unit: String::new(),
            unit_cost: dec("4.50"),
            stock: None,
            min_stock: None,
            expiration_date: None,
            category_id: None,
            supplier_id: None,
        };

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("unit"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000).prop_map(|milli| Decimal::new(milli, 3))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Adding then subtracting the same quantity restores the stock
        #[test]
        fn prop_add_then_subtract_restores_stock(
            current in amount_strategy(),
            quantity in amount_strategy()
        ) {
            let added = StockOperation::Add.apply(current, quantity).unwrap();
            let restored = StockOperation::Subtract.apply(added, quantity).unwrap();
            prop_assert_eq!(restored, current);
        }

        /// Subtraction succeeds exactly when enough stock is on hand
        #[test]
        fn prop_subtract_never_negative(
            current in amount_strategy(),
            quantity in amount_strategy()
        ) {
            match StockOperation::Subtract.apply(current, quantity) {
                Ok(next) => {
                    prop_assert!(quantity <= current);
                    prop_assert!(next >= Decimal::ZERO);
                }
                Err(_) => prop_assert!(quantity > current),
            }
        }
    }
}
