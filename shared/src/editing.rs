//! Row edits coming from the launch grid

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LaunchError;
use crate::models::{IdentifierField, LaunchRow};
use crate::validation::is_acceptable_imei;

/// A single-field edit on a launch row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum RowEdit {
    Description(String),
    SerialNumber(String),
    Imei1(String),
    Imei2(String),
    Condition(String),
    BatteryHealth(Option<i32>),
    Warranty(String),
    StorageLocation(String),
    Cost(Decimal),
    AdditionalCost(Decimal),
    Markup(Option<Decimal>),
    SalePrice(Option<Decimal>),
    WholesalePrice(Option<Decimal>),
    MinimumStock(Option<i32>),
    Barcode(String),
}

impl RowEdit {
    pub fn field_name(&self) -> &'static str {
        match self {
            RowEdit::Description(_) => "description",
            RowEdit::SerialNumber(_) => "serialNumber",
            RowEdit::Imei1(_) => "imei1",
            RowEdit::Imei2(_) => "imei2",
            RowEdit::Condition(_) => "condition",
            RowEdit::BatteryHealth(_) => "batteryHealth",
            RowEdit::Warranty(_) => "warranty",
            RowEdit::StorageLocation(_) => "storageLocation",
            RowEdit::Cost(_) => "cost",
            RowEdit::AdditionalCost(_) => "additionalCost",
            RowEdit::Markup(_) => "markup",
            RowEdit::SalePrice(_) => "salePrice",
            RowEdit::WholesalePrice(_) => "wholesalePrice",
            RowEdit::MinimumStock(_) => "minimumStock",
            RowEdit::Barcode(_) => "barcode",
        }
    }

    /// Unique per-unit values cannot be copied to every row
    pub fn is_bulk_applicable(&self) -> bool {
        !matches!(
            self,
            RowEdit::SerialNumber(_) | RowEdit::Imei1(_) | RowEdit::Imei2(_) | RowEdit::Barcode(_)
        )
    }
}

impl LaunchRow {
    pub fn apply(&mut self, edit: &RowEdit) {
        match edit {
            RowEdit::Description(v) => self.description = v.clone(),
            RowEdit::SerialNumber(v) => {
                self.serial_number = v.clone();
                self.flags.serial_number = false;
            }
            RowEdit::Imei1(v) => self.set_imei(IdentifierField::Imei1, v),
            RowEdit::Imei2(v) => self.set_imei(IdentifierField::Imei2, v),
            RowEdit::Condition(v) => self.condition = v.clone(),
            RowEdit::BatteryHealth(v) => self.battery_health = *v,
            RowEdit::Warranty(v) => self.warranty = v.clone(),
            RowEdit::StorageLocation(v) => self.storage_location = v.clone(),
            RowEdit::Cost(v) => self.set_cost(*v),
            RowEdit::AdditionalCost(v) => self.set_additional_cost(*v),
            RowEdit::Markup(v) => self.set_markup(*v),
            RowEdit::SalePrice(v) => self.set_sale_price(*v),
            RowEdit::WholesalePrice(v) => self.wholesale_price = *v,
            RowEdit::MinimumStock(v) => self.minimum_stock = *v,
            RowEdit::Barcode(v) => self.barcode = v.clone(),
        }
    }

    // The marker stays until the value is well-formed again.
    fn set_imei(&mut self, field: IdentifierField, value: &str) {
        match field {
            IdentifierField::Imei1 => self.imei1 = value.to_string(),
            IdentifierField::Imei2 => self.imei2 = value.to_string(),
            IdentifierField::SerialNumber => return,
        }
        if is_acceptable_imei(value) {
            self.flags.set(field, false);
        }
    }
}

pub fn edit_row(rows: &mut [LaunchRow], index: usize, edit: &RowEdit) -> Result<(), LaunchError> {
    let row = rows.get_mut(index).ok_or(LaunchError::RowOutOfRange(index))?;
    row.apply(edit);
    Ok(())
}

/// Apply one edit to every row
pub fn apply_to_all(rows: &mut [LaunchRow], edit: &RowEdit) -> Result<(), LaunchError> {
    if !edit.is_bulk_applicable() {
        return Err(LaunchError::NotBulkEditable(edit.field_name()));
    }
    rows.iter_mut().for_each(|row| row.apply(edit));
    Ok(())
}
