use crate::chart_of_accounts::{
    DIRECT_OPERATING, GENERAL_ADMIN, MARKETING, PROPERTY, REPAIRS_MAINTENANCE, TRANSACTION,
    TRAVEL_MEALS,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// One annual operating expense input and the chart line it lands on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingExpenseEntry {
    pub key: String,
    pub label: String,
    pub section_id: String,
    pub code: String,
}

/// One-time startup cost written off over `amortize_months`. Zero means the item
/// never reaches the monthly P&L (e.g. refundable deposits).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupCostItem {
    pub key: String,
    pub label: String,
    pub amortize_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingExpenseCatalog {
    pub entries: Vec<OperatingExpenseEntry>,
}

impl OperatingExpenseCatalog {
    pub fn standard() -> &'static OperatingExpenseCatalog {
        static STANDARD: OnceLock<OperatingExpenseCatalog> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let entry = |key: &str, label: &str, section_id: &str, code: &str| {
                OperatingExpenseEntry {
                    key: key.to_string(),
                    label: label.to_string(),
                    section_id: section_id.to_string(),
                    code: code.to_string(),
                }
            };

            OperatingExpenseCatalog {
                entries: vec![
                    entry("rent", "Rent", PROPERTY, "7705"),
                    entry("cam", "Common Area Maintenance", PROPERTY, "7710"),
                    entry("property_tax", "Property Tax", PROPERTY, "7715"),
                    entry("utilities", "Utilities", PROPERTY, "7720"),
                    entry("waste_removal", "Waste Removal", PROPERTY, "7725"),
                    entry("insurance", "Insurance", GENERAL_ADMIN, "7415"),
                    entry("accounting", "Accounting & Bookkeeping", GENERAL_ADMIN, "7405"),
                    entry("legal", "Legal & Professional Fees", GENERAL_ADMIN, "7410"),
                    entry("software", "Software Subscriptions", GENERAL_ADMIN, "7425"),
                    entry("licenses", "Licenses & Permits", GENERAL_ADMIN, "7430"),
                    entry("marketing", "Advertising & Marketing", MARKETING, "7305"),
                    entry("card_processing", "Credit Card Processing", TRANSACTION, "7205"),
                    entry("pos_fees", "POS & Reservation Fees", TRANSACTION, "7215"),
                    entry("supplies", "Operating Supplies", DIRECT_OPERATING, "7120"),
                    entry("linen", "Linen & Uniforms", DIRECT_OPERATING, "7115"),
                    entry("repairs", "Repairs & Maintenance", REPAIRS_MAINTENANCE, "7605"),
                    entry("travel", "Travel & Meals", TRAVEL_MEALS, "7505"),
                ],
            }
        })
    }

    pub fn get(&self, key: &str) -> Option<&OperatingExpenseEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Sums the annual figures for catalog keys. Keys outside the catalog are ignored.
    pub fn annual_total(&self, annual: &BTreeMap<String, f64>) -> f64 {
        annual
            .iter()
            .filter_map(|(key, value)| match self.get(key) {
                Some(_) => Some(crate::utils::finite_or_zero(*value)),
                None => {
                    debug!("Ignoring unknown operating expense key '{}'", key);
                    None
                }
            })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupCostCatalog {
    pub items: Vec<StartupCostItem>,
}

impl StartupCostCatalog {
    pub fn standard() -> &'static StartupCostCatalog {
        static STANDARD: OnceLock<StartupCostCatalog> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let item = |key: &str, label: &str, amortize_months: u32| StartupCostItem {
                key: key.to_string(),
                label: label.to_string(),
                amortize_months,
            };

            StartupCostCatalog {
                items: vec![
                    item("leasehold_improvements", "Leasehold Improvements", 84),
                    item("kitchen_equipment", "Kitchen Equipment", 60),
                    item("furniture_fixtures", "Furniture & Fixtures", 60),
                    item("signage", "Signage", 60),
                    item("pos_technology", "POS & Technology", 36),
                    item("professional_fees", "Architect, Legal & Design Fees", 36),
                    item("smallwares", "Smallwares", 12),
                    item("pre_opening_marketing", "Pre-Opening Marketing", 12),
                    item("licenses_permits", "Licenses & Permits", 12),
                    item("initial_inventory", "Opening Inventory", 1),
                    item("pre_opening_payroll", "Pre-Opening Payroll & Training", 1),
                    item("deposits", "Security & Utility Deposits", 0),
                    item("working_capital", "Working Capital Reserve", 0),
                ],
            }
        })
    }

    pub fn get(&self, key: &str) -> Option<&StartupCostItem> {
        self.items.iter().find(|i| i.key == key)
    }
}
