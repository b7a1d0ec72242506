use crate::aggregator::{section_total, StatementSummary};
use crate::chart_of_accounts::ChartOfAccounts;
use crate::merger::DenseRecord;
use crate::utils::percent_of;
use serde::{Deserialize, Serialize};

/// Actual-versus-forecast comparison for a single figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Variance {
    /// `actual - forecast`
    pub delta: f64,
    /// `delta / forecast * 100`, or 0 when the forecast is not positive
    pub delta_percent: f64,
    pub favorable: bool,
}

impl Variance {
    /// Revenue-like figures are favorable at or above forecast; everything else
    /// at or below it. The caller decides which convention applies.
    pub fn compute(forecast: f64, actual: f64, is_revenue_like: bool) -> Self {
        let delta = actual - forecast;
        let delta_percent = percent_of(delta, forecast);
        let favorable = if is_revenue_like {
            delta >= 0.0
        } else {
            delta <= 0.0
        };

        Self {
            delta,
            delta_percent,
            favorable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineVariance {
    pub code: String,
    pub label: String,
    pub forecast: f64,
    pub actual: f64,
    pub variance: Variance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionVariance {
    pub section_id: String,
    pub title: String,
    pub total_label: String,
    pub is_revenue_like: bool,
    pub lines: Vec<LineVariance>,
    pub forecast_total: f64,
    pub actual_total: f64,
    pub total: Variance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryLineVariance {
    pub label: String,
    pub forecast: f64,
    pub actual: f64,
    pub variance: Variance,
}

/// Line, section and statement-level variances for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementVariance {
    pub sections: Vec<SectionVariance>,
    pub summary: Vec<SummaryLineVariance>,
}

impl StatementVariance {
    pub fn compute(chart: &ChartOfAccounts, projection: &DenseRecord, actual: &DenseRecord) -> Self {
        let sections = chart
            .sections()
            .iter()
            .map(|section| {
                let is_revenue_like = section.role.is_revenue_like();
                let lines = section
                    .lines
                    .iter()
                    .map(|line| {
                        let forecast = projection.get(&section.id, &line.code);
                        let recorded = actual.get(&section.id, &line.code);
                        LineVariance {
                            code: line.code.clone(),
                            label: line.label.clone(),
                            forecast,
                            actual: recorded,
                            variance: Variance::compute(forecast, recorded, is_revenue_like),
                        }
                    })
                    .collect();

                let forecast_total = section_total(projection, &section.id);
                let actual_total = section_total(actual, &section.id);

                SectionVariance {
                    section_id: section.id.clone(),
                    title: section.title.clone(),
                    total_label: section.total_label.clone(),
                    is_revenue_like,
                    lines,
                    forecast_total,
                    actual_total,
                    total: Variance::compute(forecast_total, actual_total, is_revenue_like),
                }
            })
            .collect();

        let planned = StatementSummary::from_record(chart, projection);
        let recorded = StatementSummary::from_record(chart, actual);

        Self {
            sections,
            summary: summary_variances(&planned, &recorded),
        }
    }

    pub fn section(&self, section_id: &str) -> Option<&SectionVariance> {
        self.sections.iter().find(|s| s.section_id == section_id)
    }

    pub fn summary_line(&self, label: &str) -> Option<&SummaryLineVariance> {
        self.summary.iter().find(|s| s.label == label)
    }

    /// Lines whose variance is unfavorable, in chart order.
    pub fn unfavorable_lines(&self) -> impl Iterator<Item = (&SectionVariance, &LineVariance)> {
        self.sections.iter().flat_map(|section| {
            section
                .lines
                .iter()
                .filter(|line| !line.variance.favorable)
                .map(move |line| (section, line))
        })
    }
}

pub const TOTAL_REVENUE_LABEL: &str = "Total Revenue";
pub const TOTAL_COGS_LABEL: &str = "Total Cost of Goods Sold";
pub const GROSS_PROFIT_LABEL: &str = "Gross Profit";
pub const TOTAL_LABOR_LABEL: &str = "Total Labor";
pub const TOTAL_EXPENSES_LABEL: &str = "Total Expenses";
pub const NET_OPERATING_INCOME_LABEL: &str = "Net Operating Income";
pub const OTHER_INCOME_LABEL: &str = "Other Income";
pub const OTHER_EXPENSES_LABEL: &str = "Other Expenses";
pub const NET_INCOME_LABEL: &str = "Net Income";

/// Statement subtotals compared in the order a P&L presents them.
pub fn summary_variances(
    planned: &StatementSummary,
    recorded: &StatementSummary,
) -> Vec<SummaryLineVariance> {
    let rows = [
        (TOTAL_REVENUE_LABEL, planned.total_revenue, recorded.total_revenue, true),
        (TOTAL_COGS_LABEL, planned.total_cogs, recorded.total_cogs, false),
        (GROSS_PROFIT_LABEL, planned.gross_profit, recorded.gross_profit, true),
        (TOTAL_LABOR_LABEL, planned.labor_total, recorded.labor_total, false),
        (TOTAL_EXPENSES_LABEL, planned.total_expenses, recorded.total_expenses, false),
        (NET_OPERATING_INCOME_LABEL, planned.noi, recorded.noi, true),
        (OTHER_INCOME_LABEL, planned.other_income, recorded.other_income, true),
        (OTHER_EXPENSES_LABEL, planned.other_expenses, recorded.other_expenses, false),
        (NET_INCOME_LABEL, planned.net_income, recorded.net_income, true),
    ];

    rows.into_iter()
        .map(|(label, forecast, actual, is_revenue_like)| SummaryLineVariance {
            label: label.to_string(),
            forecast,
            actual,
            variance: Variance::compute(forecast, actual, is_revenue_like),
        })
        .collect()
}
