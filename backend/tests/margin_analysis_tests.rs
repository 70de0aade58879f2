//! Margin analysis and ingredient usage tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::costing::{self, RecipeMargin, RecipeUsage};
use std::str::FromStr;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn recipe(name: &str, final_cost: &str, selling_price: &str) -> RecipeMargin {
    let final_cost = dec(final_cost);
    let selling_price = dec(selling_price);
    let (net_profit, profit_margin) = costing::profit(selling_price, final_cost).unwrap();
    RecipeMargin {
        id: Uuid::new_v4(),
        name: name.to_string(),
        category_name: Some("Breads".to_string()),
        final_cost,
        selling_price,
        profit_margin,
        net_profit,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_empty_book_yields_zeros() {
        let result = costing::analyze_margins(Vec::new()).unwrap();

        assert_eq!(result.analysis.total_recipes, 0);
        assert_eq!(result.analysis.average_margin, Decimal::ZERO);
        assert_eq!(result.analysis.best_margin, Decimal::ZERO);
        assert_eq!(result.analysis.worst_margin, Decimal::ZERO);
        assert_eq!(result.analysis.profitable_recipes, 0);
        assert!(result.recipes.is_empty());
    }

    #[test]
    fn test_totals_and_extremes() {
        let result = costing::analyze_margins(vec![
            recipe("Baguette", "6", "10"),
            recipe("Croissant", "12", "10"),
            recipe("Sourdough", "5", "20"),
        ])
        .unwrap();

        let analysis = &result.analysis;
        assert_eq!(analysis.total_recipes, 3);
        assert_eq!(analysis.total_revenue, dec("40"));
        assert_eq!(analysis.total_cost, dec("23"));
        assert_eq!(analysis.total_profit, dec("17"));
        assert_eq!(analysis.best_margin, dec("75"));
        assert_eq!(analysis.worst_margin, dec("-20"));
        assert!((analysis.average_margin - dec("31.6667")).abs() < dec("0.001"));
        assert_eq!(analysis.profitable_recipes, 2);
    }

    /// Every recipe losing money still reports its real best margin
    #[test]
    fn test_all_losses_best_margin_is_negative() {
        let result = costing::analyze_margins(vec![
            recipe("Cake", "15", "10"),
            recipe("Tart", "30", "20"),
        ])
        .unwrap();

        assert_eq!(result.analysis.best_margin, dec("-50"));
        assert_eq!(result.analysis.worst_margin, dec("-50"));
        assert_eq!(result.analysis.profitable_recipes, 0);
    }

    #[test]
    fn test_recipes_sorted_by_margin_descending() {
        let result = costing::analyze_margins(vec![
            recipe("Low", "9", "10"),
            recipe("High", "2", "10"),
            recipe("Mid", "5", "10"),
        ])
        .unwrap();

        let names: Vec<&str> = result.recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn test_ingredient_usage_sums_quantities() {
        let usage = costing::summarize_usage(vec![
            RecipeUsage {
                recipe_id: Uuid::new_v4(),
                recipe_name: "Baguette".to_string(),
                quantity: dec("0.5"),
                cost: dec("2.25"),
            },
            RecipeUsage {
                recipe_id: Uuid::new_v4(),
                recipe_name: "Brioche".to_string(),
                quantity: dec("1.25"),
                cost: dec("5.625"),
            },
        ])
        .unwrap();

        assert_eq!(usage.total_usage, dec("1.75"));
        assert_eq!(usage.recipes_count, 2);
        assert_eq!(usage.recipes[1].recipe_name, "Brioche");
    }

    #[test]
    fn test_revenue_past_max_is_an_error() {
        let mut first = recipe("Wedding cake", "1", "2");
        first.selling_price = Decimal::MAX;
        let second = recipe("Cupcake", "1", "2");

        assert!(matches!(
            costing::analyze_margins(vec![first, second]),
            Err(costing::CostingError::Overflow(_))
        ));
    }

    #[test]
    fn test_unused_ingredient() {
        let usage = costing::summarize_usage(Vec::new()).unwrap();
        assert_eq!(usage.total_usage, Decimal::ZERO);
        assert_eq!(usage.recipes_count, 0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    // Margins in hundredths of a percent, so sums stay exact
    fn priced_recipe_strategy() -> impl Strategy<Value = RecipeMargin> {
        (0i64..100_000, 1i64..100_000, -10_000i64..10_000).prop_map(
            |(cost_cents, price_cents, margin_bp)| {
                let final_cost = Decimal::new(cost_cents, 2);
                let selling_price = Decimal::new(price_cents, 2);
                RecipeMargin {
                    id: Uuid::new_v4(),
                    name: format!("Recipe {}", cost_cents),
                    category_name: None,
                    final_cost,
                    selling_price,
                    profit_margin: Decimal::new(margin_bp, 2),
                    net_profit: selling_price - final_cost,
                }
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Average lies between the worst and best margins
        #[test]
        fn prop_average_between_extremes(
            recipes in prop::collection::vec(priced_recipe_strategy(), 1..30)
        ) {
            let result = costing::analyze_margins(recipes).unwrap();
            let analysis = result.analysis;

            prop_assert!(analysis.worst_margin <= analysis.average_margin);
            prop_assert!(analysis.average_margin <= analysis.best_margin);
        }

        /// Analysis keeps every recipe, ordered by margin
        #[test]
        fn prop_recipes_kept_and_ordered(
            recipes in prop::collection::vec(priced_recipe_strategy(), 0..30)
        ) {
            let count = recipes.len();
            let result = costing::analyze_margins(recipes).unwrap();

            prop_assert_eq!(result.recipes.len(), count);
            prop_assert_eq!(result.analysis.total_recipes, count as i64);
            for pair in result.recipes.windows(2) {
                prop_assert!(pair[0].profit_margin >= pair[1].profit_margin);
            }
            if let Some(first) = result.recipes.first() {
                prop_assert_eq!(first.profit_margin, result.analysis.best_margin);
            }
        }

        /// Total profit equals revenue minus cost
        #[test]
        fn prop_profit_is_revenue_minus_cost(
            recipes in prop::collection::vec(priced_recipe_strategy(), 0..30)
        ) {
            let analysis = costing::analyze_margins(recipes).unwrap().analysis;
            prop_assert_eq!(analysis.total_profit, analysis.total_revenue - analysis.total_cost);
        }
    }
}
