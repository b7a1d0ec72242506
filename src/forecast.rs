//! Simple monthly forecast derived from unit economics.
//!
//! Revenue is annualized over 52 trading weeks and divided into 12 equal months,
//! so every month carries the same forecast regardless of its day count.

use crate::catalog::OperatingExpenseCatalog;
use crate::chart_of_accounts::{COGS, LABOR, OTHER_EXPENSES, REVENUE};
use crate::error::Result;
use crate::schema::{OpeningPlan, OperationsProfile, SparseRecord};
use crate::utils::finite_or_zero;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FOOD_SHARE: f64 = 0.70;
// Food and beverage together allocate 95% of revenue; the rest is left unassigned.
pub const BEVERAGE_SHARE: f64 = 0.25;

const DAYS_PER_WEEK: f64 = 7.0;
const WEEKS_PER_YEAR: f64 = 52.0;
const MONTHS_PER_YEAR: f64 = 12.0;

pub const FOOD_SALES_CODE: &str = "4105";
pub const BEVERAGE_SALES_CODE: &str = "4110";
pub const FOOD_COST_CODE: &str = "5105";
pub const BEVERAGE_COST_CODE: &str = "5110";
pub const PAYROLL_CODE: &str = "6105";
pub const STARTUP_AMORTIZATION_CODE: &str = "9130";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyForecast {
    pub average_check: f64,
    pub daily_revenue: f64,
    pub monthly_revenue: f64,
    pub food_sales: f64,
    pub beverage_sales: f64,
    pub food_cogs: f64,
    pub beverage_cogs: f64,
    pub total_cogs: f64,
    pub gross_profit: f64,
    pub operating_expenses: f64,
    pub payroll: f64,
    pub total_expenses: f64,
    pub net_income: f64,
    /// Monthly share of each recognised operating expense key.
    pub operating_expenses_by_key: BTreeMap<String, f64>,
}

impl MonthlyForecast {
    /// Lays the flat forecast onto chart lines so it can serve as the default
    /// layer beneath an Opening P&L projection.
    pub fn to_projection(
        &self,
        catalog: &OperatingExpenseCatalog,
        startup_amortization: f64,
    ) -> SparseRecord {
        let mut record = SparseRecord::new();
        let mut put = |section: &str, code: &str, value: f64| {
            *record
                .entry(section.to_string())
                .or_default()
                .entry(code.to_string())
                .or_insert(0.0) += value;
        };

        put(REVENUE, FOOD_SALES_CODE, self.food_sales);
        put(REVENUE, BEVERAGE_SALES_CODE, self.beverage_sales);
        put(COGS, FOOD_COST_CODE, self.food_cogs);
        put(COGS, BEVERAGE_COST_CODE, self.beverage_cogs);
        put(LABOR, PAYROLL_CODE, self.payroll);

        for (key, monthly) in &self.operating_expenses_by_key {
            if let Some(entry) = catalog.get(key) {
                put(entry.section_id.as_str(), entry.code.as_str(), *monthly);
            }
        }

        if startup_amortization != 0.0 {
            put(
                OTHER_EXPENSES,
                STARTUP_AMORTIZATION_CODE,
                finite_or_zero(startup_amortization),
            );
        }

        record
    }
}

pub struct ForecastDeriver<'a> {
    catalog: &'a OperatingExpenseCatalog,
}

impl<'a> ForecastDeriver<'a> {
    pub fn new(catalog: &'a OperatingExpenseCatalog) -> Self {
        Self { catalog }
    }

    pub fn derive(
        &self,
        profile: &OperationsProfile,
        annual_operating_expenses: &BTreeMap<String, f64>,
        annual_payroll: f64,
    ) -> Result<MonthlyForecast> {
        profile.validate()?;

        let average_check = (profile.lunch_check() + profile.dinner_check()) / 2.0;
        let daily_revenue = profile.seats() as f64
            * profile.occupancy_rate()
            * profile.turnover_rate()
            * average_check;
        let monthly_revenue = daily_revenue * DAYS_PER_WEEK * WEEKS_PER_YEAR / MONTHS_PER_YEAR;

        let food_sales = monthly_revenue * FOOD_SHARE;
        let beverage_sales = monthly_revenue * BEVERAGE_SHARE;
        let food_cogs = food_sales * profile.food_cogs_percent();
        let beverage_cogs = beverage_sales * profile.beverage_cogs_percent();
        let total_cogs = food_cogs + beverage_cogs;
        let gross_profit = monthly_revenue - total_cogs;

        let operating_expenses_by_key: BTreeMap<String, f64> = annual_operating_expenses
            .iter()
            .filter(|(key, _)| self.catalog.get(key).is_some())
            .map(|(key, annual)| (key.clone(), finite_or_zero(*annual) / MONTHS_PER_YEAR))
            .collect();
        let operating_expenses = self.catalog.annual_total(annual_operating_expenses) / MONTHS_PER_YEAR;
        let payroll = finite_or_zero(annual_payroll) / MONTHS_PER_YEAR;
        let total_expenses = operating_expenses + payroll;
        let net_income = gross_profit - total_expenses;

        debug!(
            "Derived monthly forecast: revenue {:.2}, gross profit {:.2}, net income {:.2}",
            monthly_revenue, gross_profit, net_income
        );

        Ok(MonthlyForecast {
            average_check,
            daily_revenue,
            monthly_revenue,
            food_sales,
            beverage_sales,
            food_cogs,
            beverage_cogs,
            total_cogs,
            gross_profit,
            operating_expenses,
            payroll,
            total_expenses,
            net_income,
            operating_expenses_by_key,
        })
    }
}

pub fn derive_monthly_forecast(plan: &OpeningPlan) -> Result<MonthlyForecast> {
    ForecastDeriver::new(OperatingExpenseCatalog::standard()).derive(
        &plan.operations,
        &plan.annual_operating_expenses,
        plan.annual_payroll,
    )
}
