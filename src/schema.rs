use crate::error::{Result, StatementError};
use crate::utils::MonthKey;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// `section_id -> code -> amount`, possibly missing entries or carrying unknown keys.
pub type SparseRecord = BTreeMap<String, BTreeMap<String, f64>>;

pub const DEFAULT_SEATS: u32 = 50;
pub const DEFAULT_OCCUPANCY_RATE: f64 = 0.8;
pub const DEFAULT_TURNOVER_RATE: f64 = 2.0;
pub const DEFAULT_FOOD_COGS_PERCENT: f64 = 0.28;
pub const DEFAULT_BEVERAGE_COGS_PERCENT: f64 = 0.22;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum SectionRole {
    #[schemars(description = "Sales of food, beverages and other revenue streams")]
    Revenue,

    #[schemars(description = "Cost of goods sold: food, beverage and packaging cost")]
    CostOfSales,

    #[schemars(description = "Salaries, hourly wages, payroll taxes and benefits")]
    Labor,

    #[schemars(description = "Direct operating expenses such as smallwares, linen and cleaning supplies")]
    DirectOperating,

    #[schemars(description = "Card processing, delivery commissions and other transaction fees")]
    Transaction,

    #[schemars(description = "Advertising, promotions and digital marketing")]
    Marketing,

    #[schemars(description = "General and administrative: insurance, professional fees, software, permits")]
    GeneralAdmin,

    #[schemars(description = "Travel, meals and entertainment")]
    TravelMeals,

    #[schemars(description = "Repairs and maintenance of equipment and premises")]
    RepairsMaintenance,

    #[schemars(description = "Occupancy: rent, CAM, property tax and utilities")]
    Property,

    #[schemars(description = "Non-operating income such as interest or vendor rebates")]
    OtherIncome,

    #[schemars(description = "Non-operating expenses such as interest, depreciation and amortization")]
    OtherExpense,
}

impl SectionRole {
    /// The eight categories subtracted from gross profit to reach NOI.
    pub const OPERATING_EXPENSES: [SectionRole; 8] = [
        SectionRole::Labor,
        SectionRole::DirectOperating,
        SectionRole::Transaction,
        SectionRole::Marketing,
        SectionRole::GeneralAdmin,
        SectionRole::TravelMeals,
        SectionRole::RepairsMaintenance,
        SectionRole::Property,
    ];

    /// Revenue-like sections are favorable when actuals exceed the forecast.
    pub fn is_revenue_like(&self) -> bool {
        matches!(self, SectionRole::Revenue | SectionRole::OtherIncome)
    }

    pub fn is_operating_expense(&self) -> bool {
        Self::OPERATING_EXPENSES.contains(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AccountLine {
    #[schemars(description = "Unique account code, used as the key in every monthly record")]
    pub code: String,

    #[schemars(description = "Display label")]
    pub label: String,
}

impl AccountLine {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub total_label: String,
    pub role: SectionRole,
    pub lines: Vec<AccountLine>,
}

impl Section {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        total_label: impl Into<String>,
        role: SectionRole,
        lines: Vec<AccountLine>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            total_label: total_label.into(),
            role,
            lines,
        }
    }

    pub fn line(&self, code: &str) -> Option<&AccountLine> {
        self.lines.iter().find(|l| l.code == code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.code.as_str())
    }
}

/// Unit economics of the restaurant. Every field is optional; absent fields fall
/// back to the `DEFAULT_*` constants (checks default to zero).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OperationsProfile {
    #[serde(default)]
    #[schemars(description = "Number of seats in the dining room. Defaults to 50.")]
    pub seats: Option<u32>,

    #[serde(default)]
    #[schemars(description = "Average lunch check per guest")]
    pub lunch_check: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Average dinner check per guest")]
    pub dinner_check: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Share of seats occupied per turn, 0.0 to 1.0. Defaults to 0.8.")]
    pub occupancy_rate: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Table turns per day. Defaults to 2.0.")]
    pub turnover_rate: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Food cost as a fraction of food sales, 0.0 to 1.0. Defaults to 0.28.")]
    pub food_cogs_percent: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Beverage cost as a fraction of beverage sales, 0.0 to 1.0. Defaults to 0.22.")]
    pub beverage_cogs_percent: Option<f64>,
}

impl OperationsProfile {
    pub fn seats(&self) -> u32 {
        self.seats.unwrap_or(DEFAULT_SEATS)
    }

    pub fn lunch_check(&self) -> f64 {
        self.lunch_check.unwrap_or(0.0)
    }

    pub fn dinner_check(&self) -> f64 {
        self.dinner_check.unwrap_or(0.0)
    }

    pub fn occupancy_rate(&self) -> f64 {
        self.occupancy_rate.unwrap_or(DEFAULT_OCCUPANCY_RATE)
    }

    pub fn turnover_rate(&self) -> f64 {
        self.turnover_rate.unwrap_or(DEFAULT_TURNOVER_RATE)
    }

    pub fn food_cogs_percent(&self) -> f64 {
        self.food_cogs_percent.unwrap_or(DEFAULT_FOOD_COGS_PERCENT)
    }

    pub fn beverage_cogs_percent(&self) -> f64 {
        self.beverage_cogs_percent
            .unwrap_or(DEFAULT_BEVERAGE_COGS_PERCENT)
    }

    pub fn validate(&self) -> Result<()> {
        if self.seats() == 0 {
            return Err(invalid("seats", "must be a positive integer"));
        }

        check_non_negative("lunch_check", self.lunch_check())?;
        check_non_negative("dinner_check", self.dinner_check())?;
        check_non_negative("turnover_rate", self.turnover_rate())?;
        check_fraction("occupancy_rate", self.occupancy_rate())?;
        check_fraction("food_cogs_percent", self.food_cogs_percent())?;
        check_fraction("beverage_cogs_percent", self.beverage_cogs_percent())?;

        Ok(())
    }
}

fn invalid(field: &str, details: impl Into<String>) -> StatementError {
    StatementError::InvalidProfile {
        field: field.to_string(),
        details: details.into(),
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            field,
            format!("must be a non-negative number, got {}", value),
        ));
    }
    Ok(())
}

fn check_fraction(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(invalid(
            field,
            format!("must be between 0.0 and 1.0, got {}", value),
        ));
    }
    Ok(())
}

/// The opening business plan: operating profile, annual budgets, one-time startup
/// costs and the chart-level projection entered in the Opening P&L.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OpeningPlan {
    #[serde(default)]
    #[schemars(description = "Trading name of the restaurant")]
    pub business_name: String,

    #[serde(default)]
    #[schemars(
        with = "Option<String>",
        description = "First trading month in YYYY-MM format. Startup amortization starts here."
    )]
    pub opening_month: Option<MonthKey>,

    #[serde(default)]
    pub operations: OperationsProfile,

    #[serde(default)]
    #[schemars(
        description = "Annual operating expense budget keyed by operating expense catalog key (e.g. 'rent', 'utilities')"
    )]
    pub annual_operating_expenses: BTreeMap<String, f64>,

    #[serde(default)]
    #[schemars(description = "Total annual payroll including taxes and benefits")]
    pub annual_payroll: f64,

    #[serde(default)]
    #[schemars(
        description = "One-time startup costs keyed by startup cost catalog key (e.g. 'kitchen_equipment')"
    )]
    pub startup_costs: BTreeMap<String, f64>,

    #[serde(default)]
    #[schemars(
        description = "Opening P&L projection: section id -> account code -> monthly amount. Missing lines fall back to the derived forecast."
    )]
    pub projection: SparseRecord,
}

impl OpeningPlan {
    pub fn validate(&self) -> Result<()> {
        self.operations.validate()?;
        check_non_negative("annual_payroll", self.annual_payroll)?;

        for (key, value) in &self.annual_operating_expenses {
            check_non_negative(&format!("annual_operating_expenses.{}", key), *value)?;
        }
        for (key, value) in &self.startup_costs {
            check_non_negative(&format!("startup_costs.{}", key), *value)?;
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(OpeningPlan)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
