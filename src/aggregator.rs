use crate::chart_of_accounts::ChartOfAccounts;
use crate::merger::DenseRecord;
use crate::schema::SectionRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sum of every line in the section, or 0 when the record has no such section.
pub fn section_total(record: &DenseRecord, section_id: &str) -> f64 {
    record
        .section(section_id)
        .map(|lines| lines.values().sum())
        .unwrap_or(0.0)
}

/// Sum of every section carrying `role`.
pub fn role_total(chart: &ChartOfAccounts, record: &DenseRecord, role: SectionRole) -> f64 {
    chart
        .sections_with_role(role)
        .map(|s| section_total(record, &s.id))
        .sum()
}

pub fn role_totals(chart: &ChartOfAccounts, record: &DenseRecord) -> BTreeMap<String, f64> {
    chart
        .sections()
        .iter()
        .map(|s| (s.id.clone(), section_total(record, &s.id)))
        .collect()
}

/// Whole-statement subtotals for one side (projection or actual) of a month.
///
/// `total_expenses` includes COGS alongside the eight operating categories, so it
/// is not the amount subtracted from `gross_profit` to reach `noi`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub total_revenue: f64,
    pub total_cogs: f64,
    pub gross_profit: f64,
    pub labor_total: f64,
    pub total_expenses: f64,
    pub noi: f64,
    pub other_income: f64,
    pub other_expenses: f64,
    pub net_income: f64,
}

impl StatementSummary {
    pub fn from_record(chart: &ChartOfAccounts, record: &DenseRecord) -> Self {
        let total_revenue = role_total(chart, record, SectionRole::Revenue);
        let total_cogs = role_total(chart, record, SectionRole::CostOfSales);
        let labor_total = role_total(chart, record, SectionRole::Labor);
        let operating: f64 = SectionRole::OPERATING_EXPENSES
            .iter()
            .map(|role| role_total(chart, record, *role))
            .sum();
        let other_income = role_total(chart, record, SectionRole::OtherIncome);
        let other_expenses = role_total(chart, record, SectionRole::OtherExpense);

        let gross_profit = total_revenue - total_cogs;
        let total_expenses = total_cogs + operating;
        let noi = gross_profit - operating;
        let net_income = noi + other_income - other_expenses;

        Self {
            total_revenue,
            total_cogs,
            gross_profit,
            labor_total,
            total_expenses,
            noi,
            other_income,
            other_expenses,
            net_income,
        }
    }

    /// The eight non-COGS operating categories.
    pub fn operating_expenses(&self) -> f64 {
        self.total_expenses - self.total_cogs
    }

    /// Field-wise sum, used for period-to-date rollups.
    pub fn accumulate(&mut self, other: &StatementSummary) {
        self.total_revenue += other.total_revenue;
        self.total_cogs += other.total_cogs;
        self.gross_profit += other.gross_profit;
        self.labor_total += other.labor_total;
        self.total_expenses += other.total_expenses;
        self.noi += other.noi;
        self.other_income += other.other_income;
        self.other_expenses += other.other_expenses;
        self.net_income += other.net_income;
    }
}
