//! WebAssembly module for the purchase launch grid
//!
//! Runs the launch rules in the browser so the grid reacts without a round
//! trip:
//! - Row edits with price/markup derivation
//! - IMEI and duplicate checks before submit
//! - Planning and draft restore for offline sessions
//!
//! Every function takes and returns JSON strings in the server's wire format.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    apply_to_all, check_preconditions, draft_key, edit_row, is_valid_imei, mark_conflicts,
    markup_from_sale_price, plan_launch, restore_draft, sale_price_from_markup, Draft,
    DraftRestore, DuplicateConflict, InventoryUnit, LaunchRow, LaunchSummary, PurchaseOrder,
    RowDefaults, RowEdit,
};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

/// Rows after an edit, with refreshed totals
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EditedRows {
    rows: Vec<LaunchRow>,
    summary: LaunchSummary,
}

/// Outcome of the pre-submit checks
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchCheck {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    rows: Vec<LaunchRow>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RestoredDraft {
    accepted: bool,
    rows: Vec<LaunchRow>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkedConflict {
    rows: Vec<LaunchRow>,
    marked: Vec<usize>,
    message: String,
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// True when the value is exactly 15 digits
#[wasm_bindgen]
pub fn check_imei(value: &str) -> bool {
    is_valid_imei(value)
}

/// Sale price for a markup, as a decimal string; none when the cost is zero
#[wasm_bindgen]
pub fn price_for_markup(final_cost: &str, markup: &str) -> Option<String> {
    let cost = Decimal::from_str(final_cost).ok()?;
    let markup = Decimal::from_str(markup).ok()?;
    sale_price_from_markup(cost, markup).map(|p| p.to_string())
}

#[wasm_bindgen]
pub fn markup_for_price(final_cost: &str, sale_price: &str) -> Option<String> {
    let cost = Decimal::from_str(final_cost).ok()?;
    let price = Decimal::from_str(sale_price).ok()?;
    markup_from_sale_price(cost, price).map(|m| m.to_string())
}

fn apply_row_edit_json(rows_json: &str, index: usize, edit_json: &str) -> Result<String, String> {
    let mut rows: Vec<LaunchRow> = parse(rows_json, "rows")?;
    let edit: RowEdit = parse(edit_json, "edit")?;
    edit_row(&mut rows, index, &edit).map_err(|e| e.message_pt())?;
    to_json(&EditedRows {
        summary: LaunchSummary::of(&rows),
        rows,
    })
}

/// Apply one field edit to one row
#[wasm_bindgen]
pub fn apply_row_edit(rows_json: &str, index: usize, edit_json: &str) -> Result<String, JsValue> {
    apply_row_edit_json(rows_json, index, edit_json).map_err(js_err)
}

fn apply_edit_to_all_json(rows_json: &str, edit_json: &str) -> Result<String, String> {
    let mut rows: Vec<LaunchRow> = parse(rows_json, "rows")?;
    let edit: RowEdit = parse(edit_json, "edit")?;
    apply_to_all(&mut rows, &edit).map_err(|e| e.message_pt())?;
    to_json(&EditedRows {
        summary: LaunchSummary::of(&rows),
        rows,
    })
}

/// Apply one field edit to every row
#[wasm_bindgen]
pub fn apply_edit_to_all(rows_json: &str, edit_json: &str) -> Result<String, JsValue> {
    apply_edit_to_all_json(rows_json, edit_json).map_err(js_err)
}

fn validate_batch_json(rows_json: &str) -> Result<String, String> {
    let mut rows: Vec<LaunchRow> = parse(rows_json, "rows")?;
    let check = match check_preconditions(&mut rows) {
        Ok(()) => BatchCheck {
            ok: true,
            code: None,
            message: None,
            rows,
        },
        Err(e) => BatchCheck {
            ok: false,
            code: Some(e.code()),
            message: Some(e.message_pt()),
            rows,
        },
    };
    to_json(&check)
}

/// Run the pre-submit checks; offending fields come back flagged
#[wasm_bindgen]
pub fn validate_batch(rows_json: &str) -> Result<String, JsValue> {
    validate_batch_json(rows_json).map_err(js_err)
}

fn plan_launch_rows_json(order_json: &str, units_json: &str) -> Result<String, String> {
    let order: PurchaseOrder = parse(order_json, "order")?;
    let units: Vec<InventoryUnit> = parse(units_json, "units")?;
    to_json(&plan_launch(&order, &units, &RowDefaults::default()))
}

/// Expand the unlaunched remainder of an order into rows
#[wasm_bindgen]
pub fn plan_launch_rows(order_json: &str, units_json: &str) -> Result<String, JsValue> {
    plan_launch_rows_json(order_json, units_json).map_err(js_err)
}

fn restore_launch_draft_json(draft_json: Option<String>, order_json: &str) -> Result<String, String> {
    let order: PurchaseOrder = parse(order_json, "order")?;
    // A draft that no longer parses is treated as absent
    let draft: Option<Draft> = draft_json.and_then(|json| serde_json::from_str(&json).ok());
    let restored = match restore_draft(draft, &order) {
        DraftRestore::Accepted(rows) => RestoredDraft {
            accepted: true,
            rows,
        },
        DraftRestore::Discarded { .. } | DraftRestore::Empty => RestoredDraft {
            accepted: false,
            rows: Vec::new(),
        },
    };
    to_json(&restored)
}

/// Decide whether a locally stored draft still fits the order
#[wasm_bindgen]
pub fn restore_launch_draft(draft_json: Option<String>, order_json: &str) -> Result<String, JsValue> {
    restore_launch_draft_json(draft_json, order_json).map_err(js_err)
}

/// Local storage key for an order's draft
#[wasm_bindgen]
pub fn launch_draft_key(order_id: &str) -> Result<String, JsValue> {
    Uuid::parse_str(order_id)
        .map(draft_key)
        .map_err(|e| js_err(format!("Invalid order id: {}", e)))
}

fn mark_duplicate_conflict_json(rows_json: &str, conflict_json: &str) -> Result<String, String> {
    let mut rows: Vec<LaunchRow> = parse(rows_json, "rows")?;
    let conflict: DuplicateConflict = parse(conflict_json, "conflict")?;
    let marked = mark_conflicts(&mut rows, &conflict);
    to_json(&MarkedConflict {
        message: conflict.message(),
        rows,
        marked,
    })
}

/// Mark rows named in a server duplicate-conflict payload
#[wasm_bindgen]
pub fn mark_duplicate_conflict(rows_json: &str, conflict_json: &str) -> Result<String, JsValue> {
    mark_duplicate_conflict_json(rows_json, conflict_json).map_err(js_err)
}
