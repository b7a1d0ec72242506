//! # Restaurant P&L
//!
//! Reconciles a restaurant's opening financial plan against month-by-month actuals
//! over a chart of accounts.
//!
//! ## Core Concepts
//!
//! - **Chart of Accounts**: ordered sections (Revenue, COGS, Labor, seven further expense
//!   categories, Other Income, Other Expenses) of coded lines
//! - **Projection**: the opening plan for a month, layered over a forecast derived from
//!   seats, checks, occupancy and annual budgets
//! - **Actuals**: figures recorded for a month, entered one cell at a time
//! - **Dense records**: every chart line present, missing values read as zero
//! - **Variance**: actual minus forecast, favorable by the section's revenue/expense role
//!
//! ## Example
//!
//! ```rust,ignore
//! use restaurant_pnl::*;
//!
//! let plan = OpeningPlan::from_json(r#"{
//!     "business_name": "Harbor Grill",
//!     "opening_month": "2025-01",
//!     "operations": { "seats": 60, "lunch_check": 18.0, "dinner_check": 32.0 },
//!     "annual_operating_expenses": { "rent": 72000.0 },
//!     "annual_payroll": 360000.0
//! }"#)?;
//!
//! let chart = ChartOfAccounts::standard();
//! let month = MonthKey::parse("2025-03")?;
//!
//! let mut book = ActualsBook::new();
//! book.set_cell_text(chart, &month, "revenue", "4105", "48,250")?;
//!
//! let processor = StatementProcessor::new(chart, &plan)?;
//! let report = processor.month_report(&book, &month);
//! println!("{}", report.to_markdown());
//! ```

pub mod aggregator;
pub mod amortization;
pub mod catalog;
pub mod chart_of_accounts;
pub mod error;
pub mod forecast;
pub mod merger;
pub mod reporting;
pub mod schema;
pub mod utils;
pub mod variance;

pub use aggregator::{role_total, role_totals, section_total, StatementSummary};
pub use amortization::{amount_in_month, monthly_amount, AmortizedItem, StartupAmortization};
pub use catalog::{
    OperatingExpenseCatalog, OperatingExpenseEntry, StartupCostCatalog, StartupCostItem,
};
pub use chart_of_accounts::ChartOfAccounts;
pub use error::{Result, StatementError};
pub use forecast::{derive_monthly_forecast, ForecastDeriver, MonthlyForecast};
pub use merger::{merge, sum_records, ActualsBook, DenseRecord, MonthEntry};
pub use reporting::{share_of_total, MonthReport, TrendPoint, TrendReport};
pub use schema::*;
pub use utils::{parse_amount, MonthKey};
pub use variance::{LineVariance, SectionVariance, StatementVariance, SummaryLineVariance, Variance};

use log::{debug, info};

/// Builds projections and reports for one opening plan.
pub struct StatementProcessor<'a> {
    chart: &'a ChartOfAccounts,
    plan: &'a OpeningPlan,
    forecast: MonthlyForecast,
    startup: StartupAmortization,
}

impl<'a> StatementProcessor<'a> {
    pub fn new(chart: &'a ChartOfAccounts, plan: &'a OpeningPlan) -> Result<Self> {
        plan.validate()?;

        info!(
            "Preparing statements for {}",
            if plan.business_name.is_empty() {
                "unnamed plan"
            } else {
                plan.business_name.as_str()
            }
        );

        let forecast = ForecastDeriver::new(OperatingExpenseCatalog::standard()).derive(
            &plan.operations,
            &plan.annual_operating_expenses,
            plan.annual_payroll,
        )?;
        let startup = StartupAmortization::from_costs(StartupCostCatalog::standard(), &plan.startup_costs);

        debug!(
            "Forecast revenue {:.2}/month, {} amortized startup items",
            forecast.monthly_revenue,
            startup.items.len()
        );

        Ok(Self {
            chart,
            plan,
            forecast,
            startup,
        })
    }

    pub fn chart(&self) -> &ChartOfAccounts {
        self.chart
    }

    pub fn forecast(&self) -> &MonthlyForecast {
        &self.forecast
    }

    pub fn startup_amortization(&self) -> &StartupAmortization {
        &self.startup
    }

    /// Opening-month projection: the entered Opening P&L over the derived forecast,
    /// with every startup item's first-month charge.
    pub fn projection(&self) -> DenseRecord {
        self.projection_with_amortization(self.startup.opening_month_total())
    }

    /// Projection for a specific month. Startup amortization follows each item's
    /// horizon counted from the opening month; without one the opening-month charge applies.
    pub fn projection_for(&self, month: &MonthKey) -> DenseRecord {
        let amortization = match &self.plan.opening_month {
            Some(opening) => self
                .startup
                .total_for_month(month.months_since(opening) as i64),
            None => self.startup.opening_month_total(),
        };
        self.projection_with_amortization(amortization)
    }

    fn projection_with_amortization(&self, amortization: f64) -> DenseRecord {
        let defaults = self
            .forecast
            .to_projection(OperatingExpenseCatalog::standard(), amortization);
        merge(self.chart, &self.plan.projection, &defaults)
    }

    pub fn month_report(&self, book: &ActualsBook, month: &MonthKey) -> MonthReport {
        debug!("Building month report for {}", month);
        MonthReport::build(
            self.chart,
            month.clone(),
            self.projection_for(month),
            book.actuals_for(self.chart, month),
        )
    }

    pub fn trend(&self, book: &ActualsBook, start: &MonthKey, end: &MonthKey) -> TrendReport {
        let months = MonthKey::range(start, end);
        info!("Building trend for {} months ({}..{})", months.len(), start, end);
        TrendReport::build(self.chart, book, &months, |m| self.projection_for(m))
    }
}

/// One-shot month report against the standard restaurant chart.
pub fn process_month(plan: &OpeningPlan, book: &ActualsBook, month: &MonthKey) -> Result<MonthReport> {
    let processor = StatementProcessor::new(ChartOfAccounts::standard(), plan)?;
    Ok(processor.month_report(book, month))
}
