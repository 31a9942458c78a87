//! PostgreSQL implementation of the launch gateway

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    ConflictDuplicates, DuplicateConflict, FinancialStatus, InventoryUnit, ProductDetails,
    PurchaseItem, PurchaseOrder, ReferenceOptions, StockStatus, UnitFields, UnitOrigin,
    UnitPayload,
};
use sqlx::{types::Json, FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{GatewayError, GatewayResult, LaunchGateway};

const AUDIT_STOCK_LAUNCH: &str = "STOCK_LAUNCH";
const AUDIT_STOCK_LAUNCH_REVERTED: &str = "STOCK_LAUNCH_REVERTED";

/// Gateway backed by the application database
#[derive(Clone)]
pub struct PgLaunchGateway {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    display_number: i32,
    supplier_id: Option<Uuid>,
    supplier_name: Option<String>,
    purchased_from_customer: bool,
    stock_status: String,
    financial_status: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    purchase_order_id: Uuid,
    quantity: i32,
    has_imei: bool,
    control_by_barcode: bool,
    unit_cost: Decimal,
    additional_cost: Decimal,
    minimum_stock: Option<i32>,
    product_details: Json<ProductDetails>,
}

impl From<ItemRow> for PurchaseItem {
    fn from(row: ItemRow) -> Self {
        PurchaseItem {
            id: row.id,
            purchase_order_id: row.purchase_order_id,
            quantity: row.quantity,
            has_imei: row.has_imei,
            control_by_barcode: row.control_by_barcode,
            unit_cost: row.unit_cost,
            additional_cost: row.additional_cost,
            minimum_stock: row.minimum_stock,
            product_details: row.product_details.0,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    purchase_item_id: Option<Uuid>,
    purchase_order_id: Option<Uuid>,
    description: String,
    brand: String,
    model: String,
    category: Option<String>,
    serial_number: Option<String>,
    imei1: Option<String>,
    imei2: Option<String>,
    condition: String,
    battery_health: Option<i32>,
    warranty: String,
    storage_location: String,
    cost: Decimal,
    additional_cost: Decimal,
    markup: Option<Decimal>,
    sale_price: Decimal,
    wholesale_price: Option<Decimal>,
    stock: i32,
    minimum_stock: Option<i32>,
    barcode: Option<String>,
    origin: String,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for InventoryUnit {
    fn from(row: ProductRow) -> Self {
        InventoryUnit {
            id: row.id,
            purchase_item_id: row.purchase_item_id,
            purchase_order_id: row.purchase_order_id,
            fields: UnitFields {
                description: row.description,
                brand: row.brand,
                model: row.model,
                category: row.category,
                serial_number: row.serial_number,
                imei1: row.imei1,
                imei2: row.imei2,
                condition: row.condition,
                battery_health: row.battery_health,
                warranty: row.warranty,
                storage_location: row.storage_location,
                cost: row.cost,
                additional_cost: row.additional_cost,
                markup: row.markup,
                sale_price: row.sale_price,
                wholesale_price: row.wholesale_price,
                stock: row.stock,
                minimum_stock: row.minimum_stock,
                barcode: row.barcode,
                origin: UnitOrigin::from_str(&row.origin).unwrap_or_default(),
            },
            created_at: row.created_at,
        }
    }
}

/// Identifiers already stored, by the slot they occupy
#[derive(Debug, FromRow)]
struct IdentifierRow {
    serial_number: Option<String>,
    imei1: Option<String>,
    imei2: Option<String>,
}

#[derive(Debug, FromRow)]
struct LineBalanceRow {
    id: Uuid,
    quantity: i32,
    has_imei: bool,
    launched: i64,
}

impl PgLaunchGateway {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn existing_identifiers(
        tx: &mut Transaction<'_, Postgres>,
        payloads: &[UnitPayload],
    ) -> GatewayResult<ConflictDuplicates> {
        let imeis: HashSet<String> = payloads
            .iter()
            .flat_map(|p| [p.fields.imei1.clone(), p.fields.imei2.clone()])
            .flatten()
            .collect();
        let serials: HashSet<String> = payloads
            .iter()
            .filter_map(|p| p.fields.serial_number.clone())
            .collect();

        if imeis.is_empty() && serials.is_empty() {
            return Ok(ConflictDuplicates::default());
        }

        let imei_list: Vec<String> = imeis.iter().cloned().collect();
        let serial_list: Vec<String> = serials.iter().cloned().collect();
        let rows = sqlx::query_as::<_, IdentifierRow>(
            r#"
            SELECT serial_number, imei1, imei2
            FROM products
            WHERE imei1 = ANY($1) OR imei2 = ANY($1) OR serial_number = ANY($2)
            "#,
        )
        .bind(&imei_list)
        .bind(&serial_list)
        .fetch_all(&mut **tx)
        .await?;

        let mut duplicates = ConflictDuplicates::default();
        for row in rows {
            if let Some(v) = row.imei1.filter(|v| imeis.contains(v)) {
                duplicates.imei1.push(v);
            }
            if let Some(v) = row.imei2.filter(|v| imeis.contains(v)) {
                duplicates.imei2.push(v);
            }
            if let Some(v) = row.serial_number.filter(|v| serials.contains(v)) {
                duplicates.serial_number.push(v);
            }
        }
        Ok(duplicates)
    }

    /// Reject a batch that would launch more than a line still has open, or
    /// a serialized unit whose stock is not exactly one.
    /// Runs under the order row lock taken by `submit_launch`.
    async fn check_quantities(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        payloads: &[UnitPayload],
    ) -> GatewayResult<()> {
        let balances = sqlx::query_as::<_, LineBalanceRow>(
            r#"
            SELECT pi.id, pi.quantity, pi.has_imei,
                   COALESCE(SUM(p.stock), 0)::BIGINT AS launched
            FROM purchase_items pi
            LEFT JOIN products p ON p.purchase_item_id = pi.id
            WHERE pi.purchase_order_id = $1
            GROUP BY pi.id, pi.quantity, pi.has_imei
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;

        let serialized: HashSet<Uuid> = balances
            .iter()
            .filter(|b| b.has_imei)
            .map(|b| b.id)
            .collect();
        let open: HashMap<Uuid, i64> = balances
            .into_iter()
            .map(|b| (b.id, i64::from(b.quantity) - b.launched))
            .collect();

        let mut requested: BTreeMap<Uuid, i64> = BTreeMap::new();
        for payload in payloads {
            let stock = payload.fields.stock;
            if stock < 1 || (serialized.contains(&payload.purchase_item_id) && stock != 1) {
                return Err(GatewayError::Rejected(format!(
                    "Quantidade inválida ({}) para o item {}",
                    stock, payload.purchase_item_id
                )));
            }
            *requested.entry(payload.purchase_item_id).or_default() += i64::from(stock);
        }

        for (item_id, quantity) in requested {
            let Some(remaining) = open.get(&item_id).copied() else {
                return Err(GatewayError::Rejected(format!(
                    "Item {} não pertence a esta compra",
                    item_id
                )));
            };
            if quantity > remaining {
                return Err(GatewayError::Rejected(format!(
                    "Quantidade lançada ({}) excede o saldo do item ({})",
                    quantity,
                    remaining.max(0)
                )));
            }
        }
        Ok(())
    }

    async fn insert_unit(
        tx: &mut Transaction<'_, Postgres>,
        payload: &UnitPayload,
    ) -> GatewayResult<()> {
        let f = &payload.fields;
        sqlx::query(
            r#"
            INSERT INTO products (purchase_item_id, purchase_order_id, supplier_id, description,
                                  brand, model, category, serial_number, imei1, imei2, condition,
                                  battery_health, warranty, storage_location, cost, additional_cost,
                                  markup, sale_price, wholesale_price, stock, minimum_stock,
                                  barcode, origin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(payload.purchase_item_id)
        .bind(payload.purchase_order_id)
        .bind(payload.supplier_id)
        .bind(&f.description)
        .bind(&f.brand)
        .bind(&f.model)
        .bind(&f.category)
        .bind(&f.serial_number)
        .bind(&f.imei1)
        .bind(&f.imei2)
        .bind(&f.condition)
        .bind(f.battery_health)
        .bind(&f.warranty)
        .bind(&f.storage_location)
        .bind(f.cost)
        .bind(f.additional_cost)
        .bind(f.markup)
        .bind(f.sale_price)
        .bind(f.wholesale_price)
        .bind(f.stock)
        .bind(f.minimum_stock)
        .bind(&f.barcode)
        .bind(f.origin.as_str())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn audit(
        tx: &mut Transaction<'_, Postgres>,
        action: &str,
        order_id: Uuid,
        operator: &str,
        details: serde_json::Value,
    ) -> GatewayResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (action, entity_type, entity_id, operator, details)
            VALUES ($1, 'purchase_order', $2, $3, $4)
            "#,
        )
        .bind(action)
        .bind(order_id)
        .bind(operator)
        .bind(Json(details))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn names(&self, table: &str) -> GatewayResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(&format!(
            "SELECT name FROM {} ORDER BY name",
            table
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(names)
    }
}

#[async_trait]
impl LaunchGateway for PgLaunchGateway {
    async fn fetch_purchase_order(&self, order_id: Uuid) -> GatewayResult<PurchaseOrder> {
        let order = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, display_number, supplier_id, supplier_name, purchased_from_customer,
                   stock_status, financial_status, total_amount, created_at
            FROM purchase_orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GatewayError::NotFound(order_id))?;

        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, purchase_order_id, quantity, has_imei, control_by_barcode, unit_cost,
                   additional_cost, minimum_stock, product_details
            FROM purchase_items
            WHERE purchase_order_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseOrder {
            id: order.id,
            display_number: order.display_number,
            supplier_id: order.supplier_id,
            supplier_name: order.supplier_name,
            purchased_from_customer: order.purchased_from_customer,
            items: items.into_iter().map(PurchaseItem::from).collect(),
            stock_status: StockStatus::from_str(&order.stock_status).unwrap_or_default(),
            financial_status: FinancialStatus::from_str(&order.financial_status)
                .unwrap_or_default(),
            total_amount: order.total_amount,
            created_at: order.created_at,
        })
    }

    async fn fetch_launched_units(&self, order_id: Uuid) -> GatewayResult<Vec<InventoryUnit>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT p.id, p.purchase_item_id, p.purchase_order_id, p.description, p.brand,
                   p.model, p.category, p.serial_number, p.imei1, p.imei2, p.condition,
                   p.battery_health, p.warranty, p.storage_location, p.cost, p.additional_cost,
                   p.markup, p.sale_price, p.wholesale_price, p.stock, p.minimum_stock,
                   p.barcode, p.origin, p.created_at
            FROM products p
            JOIN purchase_items pi ON pi.id = p.purchase_item_id
            WHERE pi.purchase_order_id = $1
            ORDER BY p.created_at, p.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(InventoryUnit::from).collect())
    }

    async fn submit_launch(
        &self,
        order_id: Uuid,
        payloads: &[UnitPayload],
        operator: &str,
    ) -> GatewayResult<()> {
        let mut tx = self.db.begin().await?;

        // Serialize launches of the same order
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM purchase_orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(GatewayError::NotFound(order_id))?;

        let duplicates = Self::existing_identifiers(&mut tx, payloads).await?;
        let conflict = DuplicateConflict::new(duplicates);
        if !conflict.is_empty() {
            return Err(GatewayError::Duplicates(conflict));
        }

        Self::check_quantities(&mut tx, order_id, payloads).await?;

        for payload in payloads {
            Self::insert_unit(&mut tx, payload).await?;
        }

        let units: i64 = payloads.iter().map(|p| i64::from(p.fields.stock)).sum();
        Self::audit(
            &mut tx,
            AUDIT_STOCK_LAUNCH,
            order_id,
            operator,
            serde_json::json!({ "rows": payloads.len(), "units": units }),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn revert_launch(&self, order_id: Uuid, operator: &str) -> GatewayResult<u64> {
        let mut tx = self.db.begin().await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM products
            WHERE purchase_item_id IN (
                SELECT id FROM purchase_items WHERE purchase_order_id = $1
            )
            "#,
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        Self::audit(
            &mut tx,
            AUDIT_STOCK_LAUNCH_REVERTED,
            order_id,
            operator,
            serde_json::json!({ "deleted": deleted }),
        )
        .await?;

        tx.commit().await?;
        Ok(deleted)
    }

    async fn count_sold_units(&self, order_id: Uuid) -> GatewayResult<i64> {
        let sold = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(si.quantity), 0)::BIGINT
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            JOIN purchase_items pi ON pi.id = p.purchase_item_id
            WHERE pi.purchase_order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;
        Ok(sold)
    }

    async fn update_stock_status(&self, order_id: Uuid, status: StockStatus) -> GatewayResult<()> {
        let updated = sqlx::query(
            "UPDATE purchase_orders SET stock_status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(order_id)
        .bind(status.as_str())
        .execute(&self.db)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(GatewayError::NotFound(order_id));
        }
        Ok(())
    }

    async fn reference_options(&self) -> GatewayResult<ReferenceOptions> {
        Ok(ReferenceOptions {
            conditions: self.names("product_conditions").await?,
            locations: self.names("storage_locations").await?,
            warranties: self.names("warranties").await?,
        })
    }
}
