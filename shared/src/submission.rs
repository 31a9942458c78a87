//! Launch submission: preconditions and payload mapping

use rust_decimal::Decimal;

use crate::error::LaunchError;
use crate::models::{
    LaunchRow, PurchaseItem, PurchaseOrder, RowFlags, UnitFields, UnitOrigin, UnitPayload,
};
use crate::validation::{find_duplicates, validate_imei_formats};

/// Check a batch before any network call; the first failing rule wins.
///
/// 1. every non-empty IMEI has 15 digits
/// 2. no identifier is used twice inside the batch
/// 3. every row has a sale price above zero
///
/// Markers from an earlier attempt are cleared first; offending fields are
/// flagged on the rows so the operator can correct them.
pub fn check_preconditions(rows: &mut [LaunchRow]) -> Result<(), LaunchError> {
    if rows.is_empty() {
        return Err(LaunchError::NothingToLaunch);
    }
    rows.iter_mut().for_each(|row| row.flags = RowFlags::default());

    validate_imei_formats(rows)?;

    let duplicates = find_duplicates(rows);
    if !duplicates.is_empty() {
        duplicates.mark(rows);
        return Err(LaunchError::DuplicateIdentifiers {
            rows: duplicates.rows(),
        });
    }

    let unpriced: Vec<usize> = rows
        .iter_mut()
        .enumerate()
        .filter(|(_, row)| !row.has_sale_price())
        .map(|(index, row)| {
            row.flags.sale_price = true;
            index
        })
        .collect();
    if !unpriced.is_empty() {
        return Err(LaunchError::MissingSalePrice { rows: unpriced });
    }

    Ok(())
}

/// A serialized row is one device; a bulk row carries at least one unit
pub fn quantity_fits(item: &PurchaseItem, quantity: i32) -> bool {
    if item.has_imei {
        quantity == 1
    } else {
        quantity >= 1
    }
}

/// Check every row's quantity against its purchase line and flag the ones
/// that do not fit. Rows for unknown lines are left to [`build_payloads`].
pub fn check_quantities(order: &PurchaseOrder, rows: &mut [LaunchRow]) -> Result<(), LaunchError> {
    let invalid: Vec<usize> = rows
        .iter_mut()
        .enumerate()
        .filter(|(_, row)| {
            order
                .item(row.purchase_item_id)
                .is_some_and(|item| !quantity_fits(item, row.quantity))
        })
        .map(|(index, row)| {
            row.flags.quantity = true;
            index
        })
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(LaunchError::InvalidQuantity { rows: invalid })
    }
}

/// Map rows to unit creation payloads, combining the line's static fields
/// with the row's editable ones
pub fn build_payloads(
    order: &PurchaseOrder,
    rows: &[LaunchRow],
) -> Result<Vec<UnitPayload>, LaunchError> {
    let origin = if order.purchased_from_customer {
        UnitOrigin::PurchasedFromCustomer
    } else {
        UnitOrigin::Purchase
    };

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let item = order
                .item(row.purchase_item_id)
                .ok_or(LaunchError::UnknownItem(row.purchase_item_id))?;
            if !quantity_fits(item, row.quantity) {
                return Err(LaunchError::InvalidQuantity { rows: vec![index] });
            }
            let details = &item.product_details;

            Ok(UnitPayload {
                purchase_item_id: item.id,
                purchase_order_id: order.id,
                supplier_id: order.supplier_id,
                fields: UnitFields {
                    description: row.description.trim().to_string(),
                    brand: details.brand.clone(),
                    model: details.model.clone(),
                    category: details.category.clone(),
                    serial_number: non_empty(&row.serial_number),
                    imei1: non_empty(&row.imei1),
                    imei2: non_empty(&row.imei2),
                    condition: row.condition.trim().to_string(),
                    battery_health: row.battery_health,
                    warranty: row.warranty.trim().to_string(),
                    storage_location: row.storage_location.trim().to_string(),
                    cost: row.cost,
                    additional_cost: row.additional_cost,
                    markup: row.markup,
                    sale_price: row.sale_price.unwrap_or(Decimal::ZERO),
                    wholesale_price: row.wholesale_price,
                    stock: row.quantity,
                    minimum_stock: row.minimum_stock,
                    barcode: non_empty(&row.barcode),
                    origin,
                },
            })
        })
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdentifierField, ProductDetails, PurchaseItem, StockStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn priced(imei1: &str, serial: &str) -> LaunchRow {
        LaunchRow {
            imei1: imei1.into(),
            serial_number: serial.into(),
            quantity: 1,
            cost: Decimal::from(100),
            sale_price: Some(Decimal::from(150)),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        assert_eq!(check_preconditions(&mut []), Err(LaunchError::NothingToLaunch));
    }

    #[test]
    fn test_imei_format_checked_before_duplicates() {
        let mut rows = vec![priced("12345", "SN1"), priced("", "SN1")];
        let err = check_preconditions(&mut rows).unwrap_err();
        assert!(matches!(err, LaunchError::InvalidImei { row: 0, .. }));
        assert!(!rows[1].flags.serial_number);
    }

    #[test]
    fn test_duplicates_checked_before_price() {
        let mut rows = vec![priced("111111111111111", ""), priced("111111111111111", "")];
        rows[1].sale_price = None;
        let err = check_preconditions(&mut rows).unwrap_err();
        assert_eq!(err, LaunchError::DuplicateIdentifiers { rows: vec![0, 1] });
        assert!(rows.iter().all(|r| r.flags.is_marked(IdentifierField::Imei1)));
        assert!(!rows[1].flags.sale_price);
    }

    #[test]
    fn test_missing_or_zero_price_is_flagged() {
        let mut rows = vec![priced("", "A"), priced("", "B"), priced("", "C")];
        rows[0].sale_price = None;
        rows[2].sale_price = Some(Decimal::ZERO);
        let err = check_preconditions(&mut rows).unwrap_err();
        assert_eq!(err, LaunchError::MissingSalePrice { rows: vec![0, 2] });
        assert!(rows[0].flags.sale_price && rows[2].flags.sale_price);
        assert!(!rows[1].flags.sale_price);
    }

    #[test]
    fn test_markers_from_a_previous_attempt_are_cleared() {
        let mut rows = vec![priced("111111111111111", ""), priced("111111111111111", "")];
        assert!(check_preconditions(&mut rows).is_err());
        assert!(rows[0].flags.imei1 && rows[1].flags.imei1);

        rows[1].imei1 = "222222222222222".into();
        rows[1].flags.sale_price = true;
        assert!(check_preconditions(&mut rows).is_ok());
        assert!(rows.iter().all(|r| !r.flags.any()));
    }

    #[test]
    fn test_valid_batch_passes() {
        let mut rows = vec![priced("111111111111111", "A"), priced("222222222222222", "B")];
        assert!(check_preconditions(&mut rows).is_ok());
    }

    fn order_with(items: Vec<PurchaseItem>) -> PurchaseOrder {
        PurchaseOrder {
            id: Uuid::new_v4(),
            display_number: 4,
            supplier_id: None,
            supplier_name: None,
            purchased_from_customer: false,
            items,
            stock_status: StockStatus::Pending,
            financial_status: Default::default(),
            total_amount: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    fn line(quantity: i32, has_imei: bool) -> PurchaseItem {
        PurchaseItem {
            id: Uuid::new_v4(),
            purchase_order_id: Uuid::nil(),
            quantity,
            has_imei,
            control_by_barcode: !has_imei,
            unit_cost: Decimal::from(100),
            additional_cost: Decimal::ZERO,
            minimum_stock: None,
            product_details: ProductDetails::default(),
        }
    }

    #[test]
    fn test_serialized_row_must_carry_one_unit() {
        let order = order_with(vec![line(2, true), line(5, false)]);
        let mut phone = priced("111111111111111", "");
        phone.purchase_item_id = order.items[0].id;
        phone.quantity = 2;
        let mut cases = priced("", "");
        cases.purchase_item_id = order.items[1].id;
        cases.quantity = 5;
        let mut rows = vec![phone, cases];

        let err = check_quantities(&order, &mut rows).unwrap_err();
        assert_eq!(err, LaunchError::InvalidQuantity { rows: vec![0] });
        assert!(rows[0].flags.quantity);
        assert!(!rows[1].flags.quantity);
        assert_eq!(
            build_payloads(&order, &rows),
            Err(LaunchError::InvalidQuantity { rows: vec![0] })
        );

        rows[0].quantity = 1;
        rows[1].quantity = 0;
        let err = check_quantities(&order, &mut rows).unwrap_err();
        assert_eq!(err, LaunchError::InvalidQuantity { rows: vec![1] });

        rows[1].quantity = 3;
        assert!(check_quantities(&order, &mut rows).is_ok());
        assert_eq!(build_payloads(&order, &rows).unwrap()[0].fields.stock, 1);
    }

    #[test]
    fn test_payloads_carry_item_fields_and_origin() {
        let item_id = Uuid::new_v4();
        let order = PurchaseOrder {
            id: Uuid::new_v4(),
            display_number: 3,
            supplier_id: Some(Uuid::new_v4()),
            supplier_name: None,
            purchased_from_customer: true,
            items: vec![PurchaseItem {
                id: item_id,
                purchase_order_id: Uuid::nil(),
                quantity: 1,
                has_imei: true,
                control_by_barcode: false,
                unit_cost: Decimal::from(100),
                additional_cost: Decimal::ZERO,
                minimum_stock: None,
                product_details: ProductDetails {
                    brand: "Samsung".into(),
                    model: "Galaxy S21".into(),
                    category: Some("Celulares".into()),
                    ..Default::default()
                },
            }],
            stock_status: StockStatus::Pending,
            financial_status: Default::default(),
            total_amount: Decimal::ZERO,
            created_at: Utc::now(),
        };
        let mut row = priced(" 111111111111111 ", "");
        row.purchase_item_id = item_id;

        let payloads = build_payloads(&order, &[row.clone()]).unwrap();
        let p = &payloads[0];
        assert_eq!(p.fields.brand, "Samsung");
        assert_eq!(p.fields.category.as_deref(), Some("Celulares"));
        assert_eq!(p.fields.imei1.as_deref(), Some("111111111111111"));
        assert_eq!(p.fields.serial_number, None);
        assert_eq!(p.fields.origin, UnitOrigin::PurchasedFromCustomer);
        assert_eq!(p.supplier_id, order.supplier_id);

        row.purchase_item_id = Uuid::new_v4();
        assert!(matches!(build_payloads(&order, &[row]), Err(LaunchError::UnknownItem(_))));
    }
}
