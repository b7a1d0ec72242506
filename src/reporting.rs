use crate::aggregator::StatementSummary;
use crate::chart_of_accounts::{csv_field, ChartOfAccounts};
use crate::merger::{ActualsBook, DenseRecord};
use crate::utils::{percent_of, MonthKey};
use crate::variance::{StatementVariance, Variance};
use serde::Serialize;

/// Percentage a value contributes to a total; 0 when the total is not positive.
pub fn share_of_total(value: f64, total: f64) -> f64 {
    percent_of(value, total)
}

/// Everything a statement table needs for one month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub month: MonthKey,
    pub projection: DenseRecord,
    pub actual: DenseRecord,
    pub projection_summary: StatementSummary,
    pub actual_summary: StatementSummary,
    pub variance: StatementVariance,
}

impl MonthReport {
    pub fn build(
        chart: &ChartOfAccounts,
        month: MonthKey,
        projection: DenseRecord,
        actual: DenseRecord,
    ) -> Self {
        let projection_summary = StatementSummary::from_record(chart, &projection);
        let actual_summary = StatementSummary::from_record(chart, &actual);
        let variance = StatementVariance::compute(chart, &projection, &actual);

        Self {
            month,
            projection,
            actual,
            projection_summary,
            actual_summary,
            variance,
        }
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let revenue = self.actual_summary.total_revenue;
        let mut output = String::new();
        output.push_str(
            "Month,Section,Code,Label,Projection,Actual,Variance,Variance %,Favorable,% of Revenue\n",
        );

        for section in &self.variance.sections {
            for line in &section.lines {
                output.push_str(&format!(
                    "{},{},{},{},{:.2},{:.2},{:.2},{:.1},{},{:.1}\n",
                    self.month,
                    section.section_id,
                    line.code,
                    csv_field(&line.label),
                    line.forecast,
                    line.actual,
                    line.variance.delta,
                    line.variance.delta_percent,
                    line.variance.favorable,
                    share_of_total(line.actual, revenue),
                ));
            }
            output.push_str(&format!(
                "{},{},,{},{:.2},{:.2},{:.2},{:.1},{},{:.1}\n",
                self.month,
                section.section_id,
                csv_field(&section.total_label),
                section.forecast_total,
                section.actual_total,
                section.total.delta,
                section.total.delta_percent,
                section.total.favorable,
                share_of_total(section.actual_total, revenue),
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("# Monthly P&L - {}\n\n", self.month));

        for section in &self.variance.sections {
            output.push_str(&format!("## {}\n\n", section.title));
            output.push_str("| Code | Account | Projection | Actual | Variance | % |\n");
            output.push_str("|---|---|---:|---:|---:|---:|\n");
            for line in &section.lines {
                output.push_str(&format!(
                    "| {} | {} | {:.2} | {:.2} | {} | {:.1}% |\n",
                    line.code,
                    line.label,
                    line.forecast,
                    line.actual,
                    signed(&line.variance),
                    line.variance.delta_percent
                ));
            }
            output.push_str(&format!(
                "| | **{}** | **{:.2}** | **{:.2}** | **{}** | **{:.1}%** |\n\n",
                section.total_label,
                section.forecast_total,
                section.actual_total,
                signed(&section.total),
                section.total.delta_percent
            ));
        }

        output.push_str("## Summary\n\n");
        output.push_str("| Line | Projection | Actual | Variance |\n");
        output.push_str("|---|---:|---:|---:|\n");
        for row in &self.variance.summary {
            output.push_str(&format!(
                "| {} | {:.2} | {:.2} | {} |\n",
                row.label,
                row.forecast,
                row.actual,
                signed(&row.variance)
            ));
        }

        output
    }
}

fn signed(variance: &Variance) -> String {
    let marker = if variance.favorable { "" } else { " ⚠" };
    format!("{:+.2}{}", variance.delta, marker)
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub month: MonthKey,
    pub projection: StatementSummary,
    pub actual: StatementSummary,
    pub net_income: Variance,
    pub has_actuals: bool,
}

/// Plan-versus-actual trend across consecutive months, with period-to-date totals.
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub points: Vec<TrendPoint>,
    pub cumulative_projection: StatementSummary,
    pub cumulative_actual: StatementSummary,
    pub cumulative_net_income: Variance,
}

impl TrendReport {
    pub fn build(
        chart: &ChartOfAccounts,
        book: &ActualsBook,
        months: &[MonthKey],
        projection_for: impl Fn(&MonthKey) -> DenseRecord,
    ) -> Self {
        let mut points = Vec::with_capacity(months.len());
        let mut cumulative_projection = StatementSummary::default();
        let mut cumulative_actual = StatementSummary::default();

        for month in months {
            let projection = StatementSummary::from_record(chart, &projection_for(month));
            let actual = StatementSummary::from_record(chart, &book.actuals_for(chart, month));

            cumulative_projection.accumulate(&projection);
            cumulative_actual.accumulate(&actual);

            points.push(TrendPoint {
                month: month.clone(),
                net_income: Variance::compute(projection.net_income, actual.net_income, true),
                projection,
                actual,
                has_actuals: book.stored(month).is_some(),
            });
        }

        Self {
            points,
            cumulative_net_income: Variance::compute(
                cumulative_projection.net_income,
                cumulative_actual.net_income,
                true,
            ),
            cumulative_projection,
            cumulative_actual,
        }
    }

    pub fn months_with_actuals(&self) -> usize {
        self.points.iter().filter(|p| p.has_actuals).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_of_accounts::{LABOR, REVENUE};
    use crate::merger::merge;
    use crate::schema::SparseRecord;

    fn projection() -> DenseRecord {
        let mut plan = SparseRecord::new();
        plan.entry(REVENUE.to_string())
            .or_default()
            .insert("4105".to_string(), 10_000.0);
        plan.entry(LABOR.to_string())
            .or_default()
            .insert("6110".to_string(), 3_000.0);
        merge(ChartOfAccounts::standard(), &plan, &SparseRecord::new())
    }

    #[test]
    fn test_share_of_total() {
        assert_eq!(share_of_total(25.0, 100.0), 25.0);
        assert_eq!(share_of_total(25.0, 0.0), 0.0);
    }

    #[test]
    fn test_month_report_exports() {
        let chart = ChartOfAccounts::standard();
        let month = MonthKey::parse("2025-03").unwrap();
        let mut book = ActualsBook::new();
        book.set_cell(chart, &month, REVENUE, "4105", 12_000.0).unwrap();
        book.set_cell(chart, &month, LABOR, "6110", 3_500.0).unwrap();

        let report = MonthReport::build(chart, month.clone(), projection(), book.actuals_for(chart, &month));
        assert_eq!(report.projection_summary.net_income, 7_000.0);
        assert_eq!(report.actual_summary.net_income, 8_500.0);

        let csv = report.to_csv();
        assert!(csv.contains("2025-03,revenue,4105,Food Sales,10000.00,12000.00,2000.00,20.0,true,100.0"));
        assert!(csv.contains("2025-03,labor,6110,Front of House Wages,3000.00,3500.00,500.00,16.7,false,29.2"));
        assert_eq!(csv.lines().count(), 1 + chart.total_lines() + chart.sections().len());

        let markdown = report.to_markdown();
        assert!(markdown.contains("# Monthly P&L - 2025-03"));
        assert!(markdown.contains("| Net Income | 7000.00 | 8500.00 | +1500.00 |"));
        assert!(markdown.contains("+500.00 ⚠"));

        assert!(report.to_json().unwrap().contains("\"projection_summary\""));
    }

    #[test]
    fn test_trend_cumulative_totals() {
        let chart = ChartOfAccounts::standard();
        let months = MonthKey::range(
            &MonthKey::parse("2025-01").unwrap(),
            &MonthKey::parse("2025-03").unwrap(),
        );
        let mut book = ActualsBook::new();
        book.set_cell(chart, &months[0], REVENUE, "4105", 9_000.0).unwrap();
        book.set_cell(chart, &months[2], REVENUE, "4105", 11_000.0).unwrap();

        let trend = TrendReport::build(chart, &book, &months, |_| projection());
        assert_eq!(trend.points.len(), 3);
        assert_eq!(trend.months_with_actuals(), 2);

        assert_eq!(trend.cumulative_projection.net_income, 21_000.0);
        assert_eq!(trend.cumulative_actual.total_revenue, 20_000.0);

        let summed: f64 = trend.points.iter().map(|p| p.actual.net_income).sum();
        assert_eq!(summed, trend.cumulative_actual.net_income);
        assert!(!trend.cumulative_net_income.favorable);
    }
}
