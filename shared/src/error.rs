//! Launch error taxonomy

use thiserror::Error;
use uuid::Uuid;

use crate::models::IdentifierField;

/// Errors raised while planning, validating or submitting a launch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LaunchError {
    // Validation errors, recovered locally and never sent to the network
    #[error("Row {}: {} '{}' must have exactly 15 digits", .row + 1, .field.label(), .value)]
    InvalidImei {
        row: usize,
        field: IdentifierField,
        value: String,
    },

    #[error("Duplicate identifiers in {} row(s) of this batch", .rows.len())]
    DuplicateIdentifiers { rows: Vec<usize> },

    #[error("Sale price is required for {} row(s)", .rows.len())]
    MissingSalePrice { rows: Vec<usize> },

    #[error("Invalid quantity in {} row(s): serialized rows carry exactly one unit", .rows.len())]
    InvalidQuantity { rows: Vec<usize> },

    // Server-reported duplicates
    #[error("{message}")]
    Conflict { rows: Vec<usize>, message: String },

    // Any other submission failure, surfaced verbatim
    #[error("{0}")]
    Transient(String),

    #[error("Purchase item {0} is not part of this purchase order")]
    UnknownItem(Uuid),

    #[error("Purchase order is cancelled")]
    OrderCancelled,

    #[error("Nothing left to launch for this purchase order")]
    NothingToLaunch,

    #[error("No launched units to revert")]
    NothingToRevert,

    #[error("Cannot revert: {sold} unit(s) of this purchase were already sold")]
    RevertRefused { sold: i64 },

    #[error("Row {0} does not exist")]
    RowOutOfRange(usize),

    #[error("Field '{0}' cannot be applied to every row")]
    NotBulkEditable(&'static str),
}

impl LaunchError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            LaunchError::InvalidImei { .. } => "INVALID_IMEI",
            LaunchError::DuplicateIdentifiers { .. } => "DUPLICATE_IDENTIFIERS",
            LaunchError::MissingSalePrice { .. } => "MISSING_SALE_PRICE",
            LaunchError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            LaunchError::Conflict { .. } => crate::types::DUPLICATE_ENTRIES,
            LaunchError::Transient(_) => "LAUNCH_FAILED",
            LaunchError::UnknownItem(_) => "UNKNOWN_PURCHASE_ITEM",
            LaunchError::OrderCancelled => "ORDER_CANCELLED",
            LaunchError::NothingToLaunch => "NOTHING_TO_LAUNCH",
            LaunchError::NothingToRevert => "NOTHING_TO_REVERT",
            LaunchError::RevertRefused { .. } => "REVERT_REFUSED",
            LaunchError::RowOutOfRange(_) => "ROW_OUT_OF_RANGE",
            LaunchError::NotBulkEditable(_) => "NOT_BULK_EDITABLE",
        }
    }

    /// Validation errors never reach the persistence layer
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LaunchError::InvalidImei { .. }
                | LaunchError::DuplicateIdentifiers { .. }
                | LaunchError::MissingSalePrice { .. }
                | LaunchError::InvalidQuantity { .. }
        )
    }

    /// Portuguese message shown to the operator
    pub fn message_pt(&self) -> String {
        match self {
            LaunchError::InvalidImei { row, field, value } => format!(
                "Linha {}: {} '{}' deve ter exatamente 15 dígitos",
                row + 1,
                field.label(),
                value
            ),
            LaunchError::DuplicateIdentifiers { rows } => {
                format!("Identificadores duplicados em {} linha(s) do lote", rows.len())
            }
            LaunchError::MissingSalePrice { rows } => {
                format!("Preço de venda obrigatório em {} linha(s)", rows.len())
            }
            LaunchError::InvalidQuantity { rows } => format!(
                "Quantidade inválida em {} linha(s): itens com IMEI são lançados um por linha",
                rows.len()
            ),
            LaunchError::Conflict { message, .. } => message.clone(),
            LaunchError::Transient(message) => message.clone(),
            LaunchError::UnknownItem(_) => "Item não pertence a esta compra".to_string(),
            LaunchError::OrderCancelled => "Compra cancelada".to_string(),
            LaunchError::NothingToLaunch => "Nada restante para lançar nesta compra".to_string(),
            LaunchError::NothingToRevert => "Nenhum produto lançado para estornar".to_string(),
            LaunchError::RevertRefused { sold } => format!(
                "Não é possível estornar: {} produto(s) desta compra já foram vendidos",
                sold
            ),
            LaunchError::RowOutOfRange(row) => format!("Linha {} não existe", row),
            LaunchError::NotBulkEditable(field) => {
                format!("O campo '{}' não pode ser aplicado a todas as linhas", field)
            }
        }
    }
}
