use crate::catalog::StartupCostCatalog;
use crate::utils::finite_or_zero;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Even monthly share of a one-time cost. A horizon of zero contributes nothing.
pub fn monthly_amount(total_cost: f64, amortize_months: i64) -> f64 {
    if amortize_months <= 0 {
        return 0.0;
    }
    finite_or_zero(total_cost / amortize_months as f64)
}

/// Amount recognised in the `month_index`-th month after opening (0-based).
/// Nothing is recognised once the horizon has elapsed.
pub fn amount_in_month(total_cost: f64, amortize_months: i64, month_index: i64) -> f64 {
    if month_index < 0 || month_index >= amortize_months {
        return 0.0;
    }
    monthly_amount(total_cost, amortize_months)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizedItem {
    pub key: String,
    pub label: String,
    pub total_cost: f64,
    pub amortize_months: u32,
    pub monthly_amount: f64,
}

/// Monthly P&L impact of the plan's startup costs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartupAmortization {
    pub items: Vec<AmortizedItem>,
}

impl StartupAmortization {
    /// Keys missing from the catalog are skipped; they have no horizon to spread over.
    pub fn from_costs(catalog: &StartupCostCatalog, costs: &BTreeMap<String, f64>) -> Self {
        let mut items = Vec::new();

        for (key, cost) in costs {
            let Some(item) = catalog.get(key) else {
                debug!("Ignoring unknown startup cost key '{}'", key);
                continue;
            };

            let total_cost = finite_or_zero(*cost);
            items.push(AmortizedItem {
                key: item.key.clone(),
                label: item.label.clone(),
                total_cost,
                amortize_months: item.amortize_months,
                monthly_amount: monthly_amount(total_cost, item.amortize_months as i64),
            });
        }

        Self { items }
    }

    /// Charge for the opening month, when every item is active, including the
    /// one-month write-offs.
    pub fn opening_month_total(&self) -> f64 {
        self.items.iter().map(|i| i.monthly_amount).sum()
    }

    pub fn total_for_month(&self, month_index: i64) -> f64 {
        self.items
            .iter()
            .map(|i| amount_in_month(i.total_cost, i.amortize_months as i64, month_index))
            .sum()
    }

    /// Sum of the costs that are spread over a horizon.
    pub fn amortizable_total(&self) -> f64 {
        self.items
            .iter()
            .filter(|i| i.amortize_months > 0)
            .map(|i| i.total_cost)
            .sum()
    }

    pub fn longest_horizon(&self) -> u32 {
        self.items
            .iter()
            .map(|i| i.amortize_months)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        assert_eq!(monthly_amount(12_000.0, 12), 1_000.0);
        let total: f64 = (0..12).map(|_| monthly_amount(12_000.0, 12)).sum();
        assert!((total - 12_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_conservation_over_horizon() {
        for months in [1, 3, 7, 12, 36, 60, 84] {
            let cost = 98_765.43;
            let total: f64 = (0..months).map(|m| amount_in_month(cost, months, m)).sum();
            assert!(
                (total - cost).abs() < 1e-6,
                "{} months summed to {}",
                months,
                total
            );
        }
    }

    #[test]
    fn test_zero_and_negative_horizon() {
        assert_eq!(monthly_amount(50_000.0, 0), 0.0);
        assert_eq!(monthly_amount(-50_000.0, 0), 0.0);
        assert_eq!(monthly_amount(50_000.0, -3), 0.0);
        assert_eq!(amount_in_month(50_000.0, 0, 0), 0.0);
    }

    #[test]
    fn test_amount_stops_after_horizon() {
        assert_eq!(amount_in_month(1_200.0, 12, 0), 100.0);
        assert_eq!(amount_in_month(1_200.0, 12, 11), 100.0);
        assert_eq!(amount_in_month(1_200.0, 12, 12), 0.0);
        assert_eq!(amount_in_month(1_200.0, 12, -1), 0.0);
    }

    #[test]
    fn test_startup_amortization_from_catalog() {
        let mut costs = BTreeMap::new();
        costs.insert("kitchen_equipment".to_string(), 120_000.0);
        costs.insert("initial_inventory".to_string(), 8_000.0);
        costs.insert("deposits".to_string(), 15_000.0);
        costs.insert("mystery".to_string(), 999.0);

        let schedule = StartupAmortization::from_costs(StartupCostCatalog::standard(), &costs);
        assert_eq!(schedule.items.len(), 3);

        // Month 0: equipment 2,000 + inventory 8,000. Deposits never amortize.
        assert!((schedule.total_for_month(0) - 10_000.0).abs() < 1e-9);
        assert!((schedule.total_for_month(1) - 2_000.0).abs() < 1e-9);
        assert_eq!(schedule.total_for_month(60), 0.0);
        assert!((schedule.opening_month_total() - 10_000.0).abs() < 1e-9);
        assert_eq!(schedule.opening_month_total(), schedule.total_for_month(0));
        assert_eq!(schedule.longest_horizon(), 60);

        let recognised: f64 = (0..60).map(|m| schedule.total_for_month(m)).sum();
        assert!((recognised - schedule.amortizable_total()).abs() < 1e-6);
        assert_eq!(schedule.amortizable_total(), 128_000.0);
    }
}
