use crate::chart_of_accounts::ChartOfAccounts;
use crate::error::Result;
use crate::schema::SparseRecord;
use crate::utils::{finite_or_zero, parse_amount, MonthKey};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A monthly P&L record holding exactly one value per chart line.
///
/// Only [`merge`] builds one, so its key set always matches the chart it was
/// merged against.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DenseRecord(BTreeMap<String, BTreeMap<String, f64>>);

impl DenseRecord {
    pub fn section(&self, section_id: &str) -> Option<&BTreeMap<String, f64>> {
        self.0.get(section_id)
    }

    /// Zero for anything outside the chart.
    pub fn get(&self, section_id: &str, code: &str) -> f64 {
        self.0
            .get(section_id)
            .and_then(|lines| lines.get(code))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, f64>)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, BTreeMap<String, f64>> {
        &self.0
    }

    pub fn into_sparse(self) -> SparseRecord {
        self.0
    }
}

fn lookup(record: &SparseRecord, section_id: &str, code: &str) -> Option<f64> {
    record
        .get(section_id)
        .and_then(|lines| lines.get(code))
        .copied()
        .filter(|v| v.is_finite())
}

/// Resolves every chart line as `stored ?? defaults ?? 0`.
///
/// Sections and codes in the inputs that the chart does not know are dropped.
pub fn merge(chart: &ChartOfAccounts, stored: &SparseRecord, defaults: &SparseRecord) -> DenseRecord {
    let mut dense = BTreeMap::new();

    for section in chart.sections() {
        let lines: BTreeMap<String, f64> = section
            .codes()
            .map(|code| {
                let value = lookup(stored, &section.id, code)
                    .or_else(|| lookup(defaults, &section.id, code))
                    .unwrap_or(0.0);
                (code.to_string(), value)
            })
            .collect();
        dense.insert(section.id.clone(), lines);
    }

    log_schema_drift(chart, stored);
    DenseRecord(dense)
}

fn log_schema_drift(chart: &ChartOfAccounts, stored: &SparseRecord) {
    for (section_id, lines) in stored {
        match chart.section(section_id) {
            Ok(section) => {
                for code in lines.keys() {
                    if section.line(code).is_none() {
                        debug!("Ignoring unknown code {} in section {}", code, section_id);
                    }
                }
            }
            Err(_) => debug!("Ignoring unknown section {}", section_id),
        }
    }
}

/// Pointwise sum of two dense records over the same chart.
pub fn sum_records(chart: &ChartOfAccounts, a: &DenseRecord, b: &DenseRecord) -> DenseRecord {
    let mut summed = SparseRecord::new();
    for section in chart.sections() {
        let lines = summed.entry(section.id.clone()).or_default();
        for code in section.codes() {
            lines.insert(
                code.to_string(),
                a.get(&section.id, code) + b.get(&section.id, code),
            );
        }
    }
    merge(chart, &summed, &SparseRecord::new())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthEntry {
    #[serde(default)]
    pub pl: SparseRecord,
}

/// Recorded actuals, at most one record per month.
///
/// Serializes as `{ "YYYY-MM": { "pl": { section: { code: amount } } } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActualsBook {
    months: BTreeMap<MonthKey, MonthEntry>,
}

impl ActualsBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn months(&self) -> impl Iterator<Item = &MonthKey> {
        self.months.keys()
    }

    pub fn stored(&self, month: &MonthKey) -> Option<&SparseRecord> {
        self.months.get(month).map(|entry| &entry.pl)
    }

    /// Dense actuals for the month; all zeros when nothing has been recorded.
    pub fn actuals_for(&self, chart: &ChartOfAccounts, month: &MonthKey) -> DenseRecord {
        let empty = SparseRecord::new();
        let stored = self.stored(month).unwrap_or(&empty);
        merge(chart, stored, &empty)
    }

    /// Records one cell, rewriting the month's whole record from a merged copy so
    /// every other cell survives the edit.
    pub fn set_cell(
        &mut self,
        chart: &ChartOfAccounts,
        month: &MonthKey,
        section_id: &str,
        code: &str,
        value: f64,
    ) -> Result<()> {
        chart.line(section_id, code)?;

        let mut updated = self.actuals_for(chart, month).into_sparse();

        // Carry unknown keys forward untouched; the merge only drops them from views.
        if let Some(stored) = self.stored(month) {
            for (stored_section, lines) in stored {
                let target = updated.entry(stored_section.clone()).or_default();
                for (stored_code, stored_value) in lines {
                    target.entry(stored_code.clone()).or_insert(*stored_value);
                }
            }
        }

        let value = finite_or_zero(value);
        updated
            .entry(section_id.to_string())
            .or_default()
            .insert(code.to_string(), value);

        self.months
            .insert(month.clone(), MonthEntry { pl: updated });
        debug!("Recorded {}/{} = {} for {}", section_id, code, value, month);

        Ok(())
    }

    /// As [`set_cell`](Self::set_cell), parsing raw user input first.
    pub fn set_cell_text(
        &mut self,
        chart: &ChartOfAccounts,
        month: &MonthKey,
        section_id: &str,
        code: &str,
        raw: &str,
    ) -> Result<()> {
        self.set_cell(chart, month, section_id, code, parse_amount(raw))
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

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
