//! Identifier validation for launch batches
//!
//! IMEI format checks and intra-batch duplicate detection. IMEI1 and IMEI2
//! share one lookup table: a value stored as IMEI1 on one row and IMEI2 on
//! another is still the same device.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::LaunchError;
use crate::models::{IdentifierField, LaunchRow};

pub const IMEI_LENGTH: usize = 15;

/// A non-empty IMEI must be exactly 15 ASCII digits
pub fn is_valid_imei(value: &str) -> bool {
    let value = value.trim();
    value.len() == IMEI_LENGTH && value.bytes().all(|b| b.is_ascii_digit())
}

/// Blank is allowed; anything else must be a well-formed IMEI
pub fn is_acceptable_imei(value: &str) -> bool {
    value.trim().is_empty() || is_valid_imei(value)
}

/// Mark every malformed IMEI and report the first one found
pub fn validate_imei_formats(rows: &mut [LaunchRow]) -> Result<(), LaunchError> {
    let mut first = None;
    for (index, row) in rows.iter_mut().enumerate() {
        for field in [IdentifierField::Imei1, IdentifierField::Imei2] {
            let value = row.identifier(field);
            if !is_acceptable_imei(value) {
                let value = value.trim().to_string();
                row.flags.mark(field);
                first.get_or_insert(LaunchError::InvalidImei {
                    row: index,
                    field,
                    value,
                });
            }
        }
    }
    first.map_or(Ok(()), Err)
}

/// Which lookup table a duplicate came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Serial,
    Imei,
}

/// One identifier value claimed by more than one slot in the batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub kind: IdentifierKind,
    pub value: String,
    pub members: Vec<(usize, IdentifierField)>,
}

/// Result of the intra-batch duplicate scan
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    pub groups: Vec<DuplicateGroup>,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sorted indices of every row taking part in any collision
    pub fn rows(&self) -> Vec<usize> {
        self.groups
            .iter()
            .flat_map(|group| group.members.iter().map(|(row, _)| *row))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Flag the colliding field on every contributing row
    pub fn mark(&self, rows: &mut [LaunchRow]) {
        for (index, field) in self.groups.iter().flat_map(|g| g.members.iter()) {
            if let Some(row) = rows.get_mut(*index) {
                row.flags.mark(*field);
            }
        }
    }
}

type Lookup = BTreeMap<String, Vec<(usize, IdentifierField)>>;

/// Build the serial and IMEI tables and keep every value claimed more than once
pub fn find_duplicates(rows: &[LaunchRow]) -> DuplicateReport {
    let mut serials = Lookup::new();
    let mut imeis = Lookup::new();

    for (index, row) in rows.iter().enumerate() {
        if let Some(serial) = row.serial() {
            serials
                .entry(serial.to_string())
                .or_default()
                .push((index, IdentifierField::SerialNumber));
        }
        for (field, imei) in row.imeis() {
            imeis.entry(imei.to_string()).or_default().push((index, field));
        }
    }

    let collect = |table: Lookup, kind: IdentifierKind| {
        table
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(move |(value, members)| DuplicateGroup {
                kind,
                value,
                members,
            })
    };

    DuplicateReport {
        groups: collect(serials, IdentifierKind::Serial)
            .chain(collect(imeis, IdentifierKind::Imei))
            .collect(),
    }
}
