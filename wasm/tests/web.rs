//! Browser-side checks of the exported bindings
//!
//! Run with `wasm-pack test --headless --firefox wasm`.

#![cfg(target_arch = "wasm32")]

use purchase_launch_wasm::{
    check_imei, launch_draft_key, markup_for_price, price_for_markup, validate_batch,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const ROWS: &str = r#"[{
    "purchaseItemId": "7d1f2a4e-0000-4000-8000-000000000001",
    "description": "Capa MagSafe",
    "condition": "Novo",
    "batteryHealth": null,
    "warranty": "1 ano",
    "storageLocation": "Loja",
    "cost": "20",
    "markup": null,
    "salePrice": null,
    "wholesalePrice": null,
    "quantity": 5,
    "minimumStock": 2
}]"#;

#[wasm_bindgen_test]
fn imei_check() {
    assert!(check_imei("356938035643809"));
    assert!(!check_imei("35693803564380"));
}

#[wasm_bindgen_test]
fn prices_that_do_not_fit_are_not_derived() {
    assert_eq!(price_for_markup("100", "25").as_deref(), Some("125.00"));
    assert_eq!(markup_for_price("0.0000000001", "100000000000000000000"), None);
}

#[wasm_bindgen_test]
fn unpriced_batch_is_reported() {
    let out = validate_batch(ROWS).unwrap();
    assert!(out.contains("MISSING_SALE_PRICE"));
}

#[wasm_bindgen_test]
fn malformed_order_id_is_an_error() {
    assert!(launch_draft_key("not-a-uuid").is_err());
    assert!(launch_draft_key("7d1f2a4e-0000-4000-8000-000000000001").is_ok());
}
