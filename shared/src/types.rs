//! Wire types exchanged with the persistence layer

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{IdentifierField, LaunchRow};

pub const DUPLICATE_ENTRIES: &str = "DUPLICATE_ENTRIES";

/// Structured rejection returned when submitted identifiers already exist
///
/// `{ "code": "DUPLICATE_ENTRIES", "duplicates": { "imei1": [], "imei2": [], "serialNumber": [] } }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuplicateConflict {
    pub code: String,
    pub duplicates: ConflictDuplicates,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDuplicates {
    #[serde(default)]
    pub imei1: Vec<String>,
    #[serde(default)]
    pub imei2: Vec<String>,
    #[serde(default)]
    pub serial_number: Vec<String>,
}

impl DuplicateConflict {
    pub fn new(duplicates: ConflictDuplicates) -> Self {
        Self {
            code: DUPLICATE_ENTRIES.to_string(),
            duplicates,
        }
    }

    pub fn is_duplicate_entries(&self) -> bool {
        self.code == DUPLICATE_ENTRIES
    }

    pub fn is_empty(&self) -> bool {
        self.duplicates.imei1.is_empty()
            && self.duplicates.imei2.is_empty()
            && self.duplicates.serial_number.is_empty()
    }

    /// One consolidated message for the whole conflict
    pub fn message(&self) -> String {
        let d = &self.duplicates;
        let mut parts = Vec::new();
        let imeis: Vec<&str> = d
            .imei1
            .iter()
            .chain(d.imei2.iter())
            .map(String::as_str)
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        if !imeis.is_empty() {
            parts.push(format!("IMEI: {}", imeis.join(", ")));
        }
        if !d.serial_number.is_empty() {
            parts.push(format!("Serial: {}", d.serial_number.join(", ")));
        }
        format!(
            "Identificadores já cadastrados no estoque ({}). Corrija as linhas destacadas.",
            parts.join("; ")
        )
    }
}

/// Mark rows whose identifiers the server reported as taken.
///
/// An IMEI is checked against both server lists whatever slot it sits in.
/// Returns the sorted indices of rows that were marked.
pub fn mark_conflicts(rows: &mut [LaunchRow], conflict: &DuplicateConflict) -> Vec<usize> {
    let normalize = |values: &[String]| -> HashSet<String> {
        values.iter().map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect()
    };
    let d = &conflict.duplicates;
    let taken_imeis: HashSet<String> = normalize(&d.imei1).union(&normalize(&d.imei2)).cloned().collect();
    let taken_serials = normalize(&d.serial_number);

    let mut marked = Vec::new();
    for (index, row) in rows.iter_mut().enumerate() {
        let mut hit = Vec::new();
        for (field, imei) in row.imeis() {
            if taken_imeis.contains(imei) {
                hit.push(field);
            }
        }
        if row.serial().is_some_and(|serial| taken_serials.contains(serial)) {
            hit.push(IdentifierField::SerialNumber);
        }
        if !hit.is_empty() {
            hit.into_iter().for_each(|field| row.flags.mark(field));
            marked.push(index);
        }
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(serial: &str, imei1: &str, imei2: &str) -> LaunchRow {
        LaunchRow {
            serial_number: serial.into(),
            imei1: imei1.into(),
            imei2: imei2.into(),
            quantity: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_conflict_payload_wire_shape() {
        let json = r#"{"code":"DUPLICATE_ENTRIES","duplicates":{"imei1":["111111111111111"],"serialNumber":["SN9"]}}"#;
        let conflict: DuplicateConflict = serde_json::from_str(json).unwrap();
        assert!(conflict.is_duplicate_entries());
        assert_eq!(conflict.duplicates.imei2, Vec::<String>::new());
        assert_eq!(conflict.duplicates.serial_number, vec!["SN9".to_string()]);
    }

    #[test]
    fn test_imei_matches_across_slots() {
        let mut rows = vec![
            device("", "", "111111111111111"),
            device("", "222222222222222", ""),
            device("", "333333333333333", ""),
        ];
        let conflict = DuplicateConflict::new(ConflictDuplicates {
            imei1: vec!["111111111111111".into()],
            imei2: vec!["222222222222222".into()],
            serial_number: vec![],
        });
        let marked = mark_conflicts(&mut rows, &conflict);
        assert_eq!(marked, vec![0, 1]);
        assert!(rows[0].flags.imei2);
        assert!(rows[1].flags.imei1);
        assert!(!rows[2].flags.any());
    }

    #[test]
    fn test_serial_conflict_marks_serial() {
        let mut rows = vec![device("SN1", "", ""), device("SN2", "", "")];
        let conflict = DuplicateConflict::new(ConflictDuplicates {
            serial_number: vec!["SN2".into()],
            ..Default::default()
        });
        assert_eq!(mark_conflicts(&mut rows, &conflict), vec![1]);
        assert!(rows[1].flags.serial_number);
    }

    #[test]
    fn test_message_is_consolidated() {
        let conflict = DuplicateConflict::new(ConflictDuplicates {
            imei1: vec!["111111111111111".into()],
            imei2: vec!["111111111111111".into()],
            serial_number: vec!["SN1".into()],
        });
        let message = conflict.message();
        assert_eq!(message.matches("111111111111111").count(), 1);
        assert!(message.contains("SN1"));
    }
}
