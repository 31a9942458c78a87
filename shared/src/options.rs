//! Reference option lists (conditions, storage locations, warranties)

use serde::{Deserialize, Serialize};

use crate::models::LaunchRow;

pub const DEFAULT_CONDITION: &str = "Novo";
pub const DEFAULT_WARRANTY: &str = "1 ano";
pub const DEFAULT_LOCATION: &str = "Loja";

/// Fallbacks for rows whose purchase snapshot leaves a field blank
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RowDefaults {
    pub condition: String,
    pub warranty: String,
    pub location: String,
}

impl Default for RowDefaults {
    fn default() -> Self {
        Self {
            condition: DEFAULT_CONDITION.to_string(),
            warranty: DEFAULT_WARRANTY.to_string(),
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl RowDefaults {
    pub fn condition_or(&self, value: Option<&str>) -> String {
        pick(value, &self.condition)
    }

    pub fn warranty_or(&self, value: Option<&str>) -> String {
        pick(value, &self.warranty)
    }

    pub fn location_or(&self, value: Option<&str>) -> String {
        pick(value, &self.location)
    }
}

fn pick(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// Current selector lists, read-only
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceOptions {
    pub conditions: Vec<String>,
    pub locations: Vec<String>,
    pub warranties: Vec<String>,
}

impl ReferenceOptions {
    /// Trim the row's selector fields and fill blanks from the defaults.
    /// Values missing from the current lists are legacy text and are kept.
    pub fn normalize_row(&self, row: &mut LaunchRow, defaults: &RowDefaults) {
        row.condition = defaults.condition_or(Some(&row.condition));
        row.warranty = defaults.warranty_or(Some(&row.warranty));
        row.storage_location = defaults.location_or(Some(&row.storage_location));
    }

    /// Selector entries for one row: the condition list plus any legacy value
    pub fn conditions_for(&self, row: &LaunchRow) -> Vec<String> {
        options_with_legacy(&self.conditions, &row.condition)
    }

    pub fn locations_for(&self, row: &LaunchRow) -> Vec<String> {
        options_with_legacy(&self.locations, &row.storage_location)
    }

    pub fn warranties_for(&self, row: &LaunchRow) -> Vec<String> {
        options_with_legacy(&self.warranties, &row.warranty)
    }
}

/// The list, plus `current` appended when it is a non-empty value not in it
pub fn options_with_legacy(list: &[String], current: &str) -> Vec<String> {
    let current = current.trim();
    let mut options = list.to_vec();
    if !current.is_empty() && !list.iter().any(|option| option.trim() == current) {
        options.push(current.to_string());
    }
    options
}
