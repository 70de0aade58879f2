//! Recipe costing tests
//!
//! Tests for the cost calculator including:
//! - Zero-ingredient recipes
//! - Profit and margin arithmetic, with the zero selling price guard
//! - Line-cost consistency
//! - Simulation determinism
//! - Out-of-range amounts failing instead of panicking

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::costing::{self, CostLine, CostingError};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn line(name: &str, quantity: &str, unit_cost: &str) -> CostLine {
    CostLine {
        ingredient_id: Uuid::new_v4(),
        name: name.to_string(),
        quantity: dec(quantity),
        unit_cost: dec(unit_cost),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Flour (kg) and eggs (dozen) for a four-serving batch
    #[test]
    fn test_bakery_batch_scenario() {
        let lines = vec![line("Flour", "2", "4.50"), line("Eggs", "1", "8.90")];
        let line_costs: Vec<Decimal> = lines.iter().map(|l| l.cost().unwrap()).collect();
        let summary = costing::summarize_recipe(
            line_costs,
            dec("1.20"),
            dec("20.00"),
            4,
        )
        .unwrap();

        assert_eq!(summary.total_cost, dec("17.90"));
        assert_eq!(summary.final_cost, dec("19.10"));
        assert_eq!(summary.net_profit, dec("0.90"));
        assert_eq!(summary.profit_margin, dec("4.5"));
        assert_eq!(summary.cost_per_serving, dec("4.775"));
        assert_eq!(summary.price_per_serving, dec("5.00"));
    }

    #[test]
    fn test_recipe_without_lines_costs_only_overhead() {
        let summary =
            costing::summarize_recipe(Vec::<Decimal>::new(), dec("3.50"), dec("10"), 2).unwrap();

        assert_eq!(summary.total_cost, Decimal::ZERO);
        assert_eq!(summary.final_cost, dec("3.50"));
    }

    #[test]
    fn test_margin_on_round_numbers() {
        let (net_profit, margin) = costing::profit(dec("100"), dec("60")).unwrap();
        assert_eq!(net_profit, dec("40"));
        assert_eq!(margin, dec("40.0"));
    }

    #[test]
    fn test_unpriced_recipe_has_no_margin() {
        let (net_profit, margin) = costing::profit(Decimal::ZERO, dec("19.10")).unwrap();
        assert_eq!(net_profit, Decimal::ZERO);
        assert_eq!(margin, Decimal::ZERO);
    }

    #[test]
    fn test_loss_making_recipe_has_negative_margin() {
        let (net_profit, margin) = costing::profit(dec("10"), dec("15")).unwrap();
        assert_eq!(net_profit, dec("-5"));
        assert_eq!(margin, dec("-50"));
    }

    #[test]
    fn test_zero_servings_rejected() {
        let result = costing::summarize_recipe(vec![dec("1")], Decimal::ZERO, dec("5"), 0);
        assert_eq!(result, Err(CostingError::InvalidServings(0)));

        let result = costing::simulate(vec![line("Sugar", "1", "3")], Decimal::ZERO, 0);
        assert!(matches!(result, Err(CostingError::InvalidServings(0))));
    }

    #[test]
    fn test_simulation_lists_every_line() {
        let result = costing::simulate(
            vec![line("Butter", "0.25", "40.00"), line("Sugar", "0.5", "5.00")],
            dec("2.00"),
            10,
        )
        .unwrap();

        assert_eq!(result.ingredients.len(), 2);
        assert_eq!(result.ingredients[0].name, "Butter");
        assert_eq!(result.ingredients[0].total_cost, dec("10.00"));
        assert_eq!(result.total_ingredients_cost, dec("12.50"));
        assert_eq!(result.final_cost, dec("14.50"));
        assert_eq!(result.cost_per_serving, dec("1.45"));
    }

    /// 1e17 kg at 1e14 per kg is past what a Decimal can hold
    #[test]
    fn test_huge_simulation_is_an_error() {
        let result = costing::simulate(
            vec![line("Saffron", "100000000000000000", "100000000000000")],
            Decimal::ZERO,
            1,
        );
        assert!(matches!(result, Err(CostingError::Overflow(_))));
    }

    #[test]
    fn test_tiny_price_with_large_cost_is_an_error() {
        let result = costing::profit(dec("0.0000000000000000000000001"), dec("1000000000"));
        assert!(matches!(result, Err(CostingError::Overflow(_))));
    }

    #[test]
    fn test_operational_cost_past_max_is_an_error() {
        let result = costing::simulate(vec![line("Flour", "1", "1")], Decimal::MAX, 1);
        assert!(matches!(result, Err(CostingError::Overflow(_))));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    // Money in cents up to 10,000.00
    fn money_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    // Quantities with three decimals up to 100
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..100_000).prop_map(|milli| Decimal::new(milli, 3))
    }

    fn lines_strategy() -> impl Strategy<Value = Vec<CostLine>> {
        prop::collection::vec((quantity_strategy(), money_strategy()), 0..12).prop_map(|pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (quantity, unit_cost))| CostLine {
                    ingredient_id: Uuid::from_u128(i as u128 + 1),
                    name: format!("Ingredient {}", i),
                    quantity,
                    unit_cost,
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every line costs quantity x unit cost and the total is their sum
        #[test]
        fn prop_total_is_sum_of_line_costs(
            lines in lines_strategy(),
            operational_cost in money_strategy(),
            servings in 1i32..200
        ) {
            let line_costs: Vec<Decimal> = lines.iter().map(|l| l.cost().unwrap()).collect();
            for (line, cost) in lines.iter().zip(&line_costs) {
                prop_assert_eq!(*cost, line.quantity * line.unit_cost);
            }

            let summary = costing::summarize_recipe(
                line_costs.iter().copied(),
                operational_cost,
                Decimal::ZERO,
                servings,
            ).unwrap();

            prop_assert_eq!(summary.total_cost, line_costs.iter().copied().sum::<Decimal>());
            prop_assert_eq!(summary.final_cost, summary.total_cost + operational_cost);
        }

        /// Net profit plus final cost gives back the selling price
        #[test]
        fn prop_net_profit_closes_the_books(
            selling_price in money_strategy(),
            final_cost in money_strategy()
        ) {
            let (net_profit, margin) = costing::profit(selling_price, final_cost).unwrap();

            if selling_price > Decimal::ZERO {
                prop_assert_eq!(net_profit + final_cost, selling_price);
                prop_assert_eq!(margin > Decimal::ZERO, net_profit > Decimal::ZERO);
                prop_assert!(margin <= dec("100"));
            } else {
                prop_assert_eq!(net_profit, Decimal::ZERO);
                prop_assert_eq!(margin, Decimal::ZERO);
            }
        }

        /// Simulating the same input twice gives identical results
        #[test]
        fn prop_simulation_is_deterministic(
            lines in lines_strategy(),
            operational_cost in money_strategy(),
            servings in 1i32..200
        ) {
            let first = costing::simulate(lines.clone(), operational_cost, servings).unwrap();
            let second = costing::simulate(lines, operational_cost, servings).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Simulation and stored-recipe costing agree on the same lines
        #[test]
        fn prop_simulation_matches_recipe_summary(
            lines in lines_strategy(),
            operational_cost in money_strategy(),
            servings in 1i32..200
        ) {
            let summary = costing::summarize_recipe(
                lines.iter().map(|l| l.cost().unwrap()),
                operational_cost,
                Decimal::ZERO,
                servings,
            ).unwrap();
            let simulation = costing::simulate(lines, operational_cost, servings).unwrap();

            prop_assert_eq!(simulation.total_ingredients_cost, summary.total_cost);
            prop_assert_eq!(simulation.final_cost, summary.final_cost);
            prop_assert_eq!(simulation.cost_per_serving, summary.cost_per_serving);
        }

        /// Non-positive servings never reach a division
        #[test]
        fn prop_invalid_servings_rejected(
            amount in money_strategy(),
            servings in -100i32..=0
        ) {
            prop_assert_eq!(
                costing::per_serving(amount, servings),
                Err(CostingError::InvalidServings(servings))
            );
        }
    }
}
