use crate::error::{Result, StatementError};
use crate::schema::{AccountLine, Section, SectionRole};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

pub const REVENUE: &str = "revenue";
pub const COGS: &str = "cogs";
pub const LABOR: &str = "labor";
pub const DIRECT_OPERATING: &str = "directOperating";
pub const TRANSACTION: &str = "transaction";
pub const MARKETING: &str = "marketing";
pub const GENERAL_ADMIN: &str = "generalAdmin";
pub const TRAVEL_MEALS: &str = "travelMeals";
pub const REPAIRS_MAINTENANCE: &str = "repairsMaintenance";
pub const PROPERTY: &str = "property";
pub const OTHER_INCOME: &str = "otherIncome";
pub const OTHER_EXPENSES: &str = "otherExpenses";

/// Ordered registry of statement sections and their coded lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChartDocument")]
pub struct ChartOfAccounts {
    sections: Vec<Section>,
}

/// Wire shape of a chart; converted through [`ChartOfAccounts::new`] so loaded
/// charts get the same uniqueness checks as built ones.
#[derive(Deserialize)]
struct ChartDocument {
    sections: Vec<Section>,
}

impl TryFrom<ChartDocument> for ChartOfAccounts {
    type Error = StatementError;

    fn try_from(document: ChartDocument) -> Result<Self> {
        Self::new(document.sections)
    }
}

impl ChartOfAccounts {
    /// Builds a custom chart. Section ids and account codes must be unique.
    pub fn new(sections: Vec<Section>) -> Result<Self> {
        let mut section_ids = HashSet::new();
        let mut codes = HashSet::new();

        for section in &sections {
            if !section_ids.insert(section.id.as_str()) {
                return Err(StatementError::DuplicateSection(section.id.clone()));
            }
            for line in &section.lines {
                if !codes.insert(line.code.as_str()) {
                    return Err(StatementError::DuplicateCode(line.code.clone()));
                }
            }
        }

        debug!(
            "Chart of accounts built with {} sections and {} lines",
            sections.len(),
            codes.len()
        );

        Ok(Self { sections })
    }

    /// The restaurant Opening P&L chart shared by every plan.
    pub fn standard() -> &'static ChartOfAccounts {
        static STANDARD: OnceLock<ChartOfAccounts> = OnceLock::new();
        STANDARD.get_or_init(|| Self {
            sections: standard_sections(),
        })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Result<&Section> {
        self.sections
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StatementError::SectionNotFound(id.to_string()))
    }

    pub fn line(&self, section_id: &str, code: &str) -> Result<&AccountLine> {
        self.section(section_id)?
            .line(code)
            .ok_or_else(|| StatementError::AccountNotFound {
                section: section_id.to_string(),
                code: code.to_string(),
            })
    }

    pub fn sections_with_role(&self, role: SectionRole) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.role == role)
    }

    pub fn total_lines(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Section,Code,Label,Role\n");

        for section in &self.sections {
            for line in &section.lines {
                output.push_str(&format!(
                    "{},{},{},{:?}\n",
                    section.id,
                    line.code,
                    csv_field(&line.label),
                    section.role
                ));
            }
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str("# Chart of Accounts\n\n");

        for section in &self.sections {
            output.push_str(&format!("## {}\n\n", section.title));
            for line in &section.lines {
                output.push_str(&format!("- `{}` {}\n", line.code, line.label));
            }
            output.push_str(&format!("\n**{}**\n\n", section.total_label));
        }

        output
    }
}

pub(crate) fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn lines(items: &[(&str, &str)]) -> Vec<AccountLine> {
    items
        .iter()
        .map(|(code, label)| AccountLine::new(*code, *label))
        .collect()
}

fn standard_sections() -> Vec<Section> {
    vec![
        Section::new(
            REVENUE,
            "Revenue",
            "Total Revenue",
            SectionRole::Revenue,
            lines(&[
                ("4105", "Food Sales"),
                ("4110", "Non-Alcoholic Beverage Sales"),
                ("4120", "Beer & Wine Sales"),
                ("4130", "Liquor Sales"),
                ("4140", "Catering & Private Events"),
                ("4150", "Delivery & Takeout Sales"),
                ("4190", "Merchandise & Other Sales"),
            ]),
        ),
        Section::new(
            COGS,
            "Cost of Goods Sold",
            "Total Cost of Goods Sold",
            SectionRole::CostOfSales,
            lines(&[
                ("5105", "Food Cost"),
                ("5110", "Non-Alcoholic Beverage Cost"),
                ("5120", "Beer & Wine Cost"),
                ("5130", "Liquor Cost"),
                ("5140", "Paper & Packaging"),
                ("5190", "Merchandise Cost"),
            ]),
        ),
        Section::new(
            LABOR,
            "Labor",
            "Total Labor",
            SectionRole::Labor,
            lines(&[
                ("6105", "Management Salaries"),
                ("6110", "Front of House Wages"),
                ("6115", "Back of House Wages"),
                ("6120", "Payroll Taxes"),
                ("6130", "Employee Benefits"),
                ("6140", "Workers Compensation"),
            ]),
        ),
        Section::new(
            DIRECT_OPERATING,
            "Direct Operating Expenses",
            "Total Direct Operating",
            SectionRole::DirectOperating,
            lines(&[
                ("7105", "Smallwares"),
                ("7110", "Cleaning Supplies"),
                ("7115", "Linen & Uniforms"),
                ("7120", "Kitchen Supplies"),
                ("7125", "Guest Supplies & Decor"),
            ]),
        ),
        Section::new(
            TRANSACTION,
            "Transaction Fees",
            "Total Transaction Fees",
            SectionRole::Transaction,
            lines(&[
                ("7205", "Credit Card Processing"),
                ("7210", "Third-Party Delivery Commissions"),
                ("7215", "POS & Reservation Fees"),
                ("7220", "Bank Charges"),
            ]),
        ),
        Section::new(
            MARKETING,
            "Marketing",
            "Total Marketing",
            SectionRole::Marketing,
            lines(&[
                ("7305", "Advertising"),
                ("7310", "Digital & Social Media"),
                ("7315", "Promotions & Comps"),
                ("7320", "Website & Online Listings"),
            ]),
        ),
        Section::new(
            GENERAL_ADMIN,
            "General & Administrative",
            "Total General & Administrative",
            SectionRole::GeneralAdmin,
            lines(&[
                ("7405", "Accounting & Bookkeeping"),
                ("7410", "Legal & Professional Fees"),
                ("7415", "Insurance"),
                ("7420", "Office Supplies"),
                ("7425", "Software Subscriptions"),
                ("7430", "Licenses & Permits"),
            ]),
        ),
        Section::new(
            TRAVEL_MEALS,
            "Travel & Meals",
            "Total Travel & Meals",
            SectionRole::TravelMeals,
            lines(&[("7505", "Travel"), ("7510", "Meals & Entertainment")]),
        ),
        Section::new(
            REPAIRS_MAINTENANCE,
            "Repairs & Maintenance",
            "Total Repairs & Maintenance",
            SectionRole::RepairsMaintenance,
            lines(&[
                ("7605", "Equipment Repairs"),
                ("7610", "Building Maintenance"),
                ("7615", "Pest Control"),
                ("7620", "Hood & HVAC Service"),
            ]),
        ),
        Section::new(
            PROPERTY,
            "Property & Occupancy",
            "Total Property & Occupancy",
            SectionRole::Property,
            lines(&[
                ("7705", "Rent"),
                ("7710", "Common Area Maintenance"),
                ("7715", "Property Tax"),
                ("7720", "Utilities"),
                ("7725", "Waste Removal"),
            ]),
        ),
        Section::new(
            OTHER_INCOME,
            "Other Income",
            "Total Other Income",
            SectionRole::OtherIncome,
            lines(&[
                ("8105", "Interest Income"),
                ("8110", "Vendor Rebates"),
                ("8190", "Miscellaneous Income"),
            ]),
        ),
        Section::new(
            OTHER_EXPENSES,
            "Other Expenses",
            "Total Other Expenses",
            SectionRole::OtherExpense,
            lines(&[
                ("9105", "Interest Expense"),
                ("9110", "Depreciation"),
                ("9130", "Amortization of Startup Costs"),
                ("9190", "Miscellaneous Expense"),
            ]),
        ),
    ]
}
