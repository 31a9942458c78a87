//! Shared fixtures for backend integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use purchase_launch_backend::drafts::MemoryDraftStore;
use purchase_launch_backend::gateway::{GatewayError, GatewayResult, LaunchGateway};
use purchase_launch_backend::services::{LaunchService, LaunchSession, OpenSession};
use rust_decimal::Decimal;
use shared::{
    ConflictDuplicates, DuplicateConflict, InventoryUnit, ProductDetails, PurchaseItem,
    PurchaseOrder, ReferenceOptions, RowDefaults, StockStatus, UnitPayload,
};
use tokio::sync::Mutex;
use uuid::Uuid;

pub type TestService = LaunchService<InMemoryGateway, MemoryDraftStore>;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// How the next `submit_launch` call should fail
#[derive(Debug, Clone)]
pub enum SubmitFailure {
    Duplicates(DuplicateConflict),
    Message(String),
}

#[derive(Debug, Default)]
struct Store {
    orders: HashMap<Uuid, PurchaseOrder>,
    units: Vec<InventoryUnit>,
    sold: HashMap<Uuid, i64>,
    audit: Vec<(String, Uuid, String)>,
    submit_calls: usize,
    fail_next_submit: Option<SubmitFailure>,
    fail_after_next_launch: bool,
    unavailable: bool,
}

fn unavailable() -> GatewayError {
    GatewayError::Database(sqlx::Error::PoolTimedOut)
}

/// Gateway keeping orders and units in memory, with the same duplicate and
/// quantity checks the database performs
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    store: Mutex<Store>,
    options: ReferenceOptions,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
            options: ReferenceOptions {
                conditions: vec!["Novo".into(), "Seminovo".into(), "Usado".into()],
                locations: vec!["Loja".into(), "Estoque".into()],
                warranties: vec!["3 meses".into(), "1 ano".into()],
            },
        }
    }

    pub async fn insert_order(&self, order: PurchaseOrder) {
        self.store.lock().await.orders.insert(order.id, order);
    }

    /// A unit that already exists in stock, outside any purchase
    pub async fn insert_unit(&self, unit: InventoryUnit) {
        self.store.lock().await.units.push(unit);
    }

    pub async fn mark_sold(&self, order_id: Uuid, units: i64) {
        self.store.lock().await.sold.insert(order_id, units);
    }

    pub async fn fail_next_submit(&self, failure: SubmitFailure) {
        self.store.lock().await.fail_next_submit = Some(failure);
    }

    /// Let the next launch commit, then fail every unit read and status write
    pub async fn fail_after_next_launch(&self) {
        self.store.lock().await.fail_after_next_launch = true;
    }

    pub async fn stored_status(&self, order_id: Uuid) -> StockStatus {
        self.store.lock().await.orders[&order_id].stock_status
    }

    pub async fn units_of(&self, order_id: Uuid) -> Vec<InventoryUnit> {
        self.store
            .lock()
            .await
            .units
            .iter()
            .filter(|u| u.purchase_order_id == Some(order_id))
            .cloned()
            .collect()
    }

    pub async fn submit_calls(&self) -> usize {
        self.store.lock().await.submit_calls
    }

    pub async fn audit_actions(&self, order_id: Uuid) -> Vec<String> {
        self.store
            .lock()
            .await
            .audit
            .iter()
            .filter(|(_, id, _)| *id == order_id)
            .map(|(action, _, _)| action.clone())
            .collect()
    }
}

#[async_trait]
impl LaunchGateway for InMemoryGateway {
    async fn fetch_purchase_order(&self, order_id: Uuid) -> GatewayResult<PurchaseOrder> {
        self.store
            .lock()
            .await
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(GatewayError::NotFound(order_id))
    }

    async fn fetch_launched_units(&self, order_id: Uuid) -> GatewayResult<Vec<InventoryUnit>> {
        if self.store.lock().await.unavailable {
            return Err(unavailable());
        }
        Ok(self.units_of(order_id).await)
    }

    async fn submit_launch(
        &self,
        order_id: Uuid,
        payloads: &[UnitPayload],
        operator: &str,
    ) -> GatewayResult<()> {
        let mut store = self.store.lock().await;
        store.submit_calls += 1;

        match store.fail_next_submit.take() {
            Some(SubmitFailure::Duplicates(conflict)) => {
                return Err(GatewayError::Duplicates(conflict))
            }
            Some(SubmitFailure::Message(message)) => return Err(GatewayError::Rejected(message)),
            None => {}
        }

        let imeis: Vec<&String> = payloads
            .iter()
            .flat_map(|p| [p.fields.imei1.as_ref(), p.fields.imei2.as_ref()])
            .flatten()
            .collect();
        let serials: Vec<&String> = payloads
            .iter()
            .filter_map(|p| p.fields.serial_number.as_ref())
            .collect();

        let mut duplicates = ConflictDuplicates::default();
        for unit in &store.units {
            if let Some(v) = unit.fields.imei1.as_ref().filter(|v| imeis.contains(v)) {
                duplicates.imei1.push(v.clone());
            }
            if let Some(v) = unit.fields.imei2.as_ref().filter(|v| imeis.contains(v)) {
                duplicates.imei2.push(v.clone());
            }
            if let Some(v) = unit.fields.serial_number.as_ref().filter(|v| serials.contains(v)) {
                duplicates.serial_number.push(v.clone());
            }
        }
        let conflict = DuplicateConflict::new(duplicates);
        if !conflict.is_empty() {
            return Err(GatewayError::Duplicates(conflict));
        }

        check_quantities(&store, order_id, payloads)?;

        for payload in payloads {
            store.units.push(InventoryUnit {
                id: Uuid::new_v4(),
                purchase_item_id: Some(payload.purchase_item_id),
                purchase_order_id: Some(payload.purchase_order_id),
                fields: payload.fields.clone(),
                created_at: Utc::now(),
            });
        }
        store
            .audit
            .push(("STOCK_LAUNCH".into(), order_id, operator.to_string()));
        if std::mem::take(&mut store.fail_after_next_launch) {
            store.unavailable = true;
        }
        Ok(())
    }

    async fn revert_launch(&self, order_id: Uuid, operator: &str) -> GatewayResult<u64> {
        let mut store = self.store.lock().await;
        let before = store.units.len();
        store
            .units
            .retain(|u| u.purchase_order_id != Some(order_id));
        let removed = (before - store.units.len()) as u64;
        store
            .audit
            .push(("STOCK_LAUNCH_REVERTED".into(), order_id, operator.to_string()));
        Ok(removed)
    }

    async fn count_sold_units(&self, order_id: Uuid) -> GatewayResult<i64> {
        Ok(self
            .store
            .lock()
            .await
            .sold
            .get(&order_id)
            .copied()
            .unwrap_or(0))
    }

    async fn update_stock_status(&self, order_id: Uuid, status: StockStatus) -> GatewayResult<()> {
        let mut store = self.store.lock().await;
        if store.unavailable {
            return Err(unavailable());
        }
        let order = store
            .orders
            .get_mut(&order_id)
            .ok_or(GatewayError::NotFound(order_id))?;
        order.stock_status = status;
        Ok(())
    }

    async fn reference_options(&self) -> GatewayResult<ReferenceOptions> {
        Ok(self.options.clone())
    }
}

// Same rules as the database: serialized units carry one unit each and no
// line is launched beyond its ordered quantity.
fn check_quantities(store: &Store, order_id: Uuid, payloads: &[UnitPayload]) -> GatewayResult<()> {
    let order = store
        .orders
        .get(&order_id)
        .ok_or(GatewayError::NotFound(order_id))?;

    let mut requested: HashMap<Uuid, i64> = HashMap::new();
    for payload in payloads {
        let item = order.item(payload.purchase_item_id).ok_or_else(|| {
            GatewayError::Rejected(format!(
                "Item {} não pertence a esta compra",
                payload.purchase_item_id
            ))
        })?;
        let stock = payload.fields.stock;
        if stock < 1 || (item.has_imei && stock != 1) {
            return Err(GatewayError::Rejected(format!(
                "Quantidade inválida ({}) para o item {}",
                stock, item.id
            )));
        }
        *requested.entry(item.id).or_default() += i64::from(stock);
    }

    for (item_id, quantity) in requested {
        let launched: i64 = store
            .units
            .iter()
            .filter(|u| u.purchase_item_id == Some(item_id))
            .map(|u| i64::from(u.fields.stock))
            .sum();
        let remaining = order
            .item(item_id)
            .map(|item| i64::from(item.quantity) - launched)
            .unwrap_or(0);
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

pub fn item(order_id: Uuid, quantity: i32, has_imei: bool, model: &str) -> PurchaseItem {
    PurchaseItem {
        id: Uuid::new_v4(),
        purchase_order_id: order_id,
        quantity,
        has_imei,
        control_by_barcode: !has_imei,
        unit_cost: dec("100"),
        additional_cost: Decimal::ZERO,
        minimum_stock: if has_imei { None } else { Some(2) },
        product_details: ProductDetails {
            brand: "Apple".into(),
            model: model.into(),
            capacity: has_imei.then(|| "128GB".to_string()),
            ..Default::default()
        },
    }
}

/// One bulk line of 5 cases and one serialized line of 2 phones
pub fn mixed_order() -> PurchaseOrder {
    let id = Uuid::new_v4();
    PurchaseOrder {
        id,
        display_number: 42,
        supplier_id: Some(Uuid::new_v4()),
        supplier_name: Some("Distribuidora Sul".into()),
        purchased_from_customer: false,
        items: vec![
            item(id, 5, false, "Capa MagSafe"),
            item(id, 2, true, "iPhone 13"),
        ],
        stock_status: StockStatus::Pending,
        financial_status: Default::default(),
        total_amount: dec("700"),
        created_at: Utc::now(),
    }
}

pub async fn service_with(order: &PurchaseOrder) -> TestService {
    let gateway = InMemoryGateway::new();
    gateway.insert_order(order.clone()).await;
    LaunchService::new(gateway, MemoryDraftStore::new(), RowDefaults::default())
}

pub async fn open_rows(service: &TestService, order_id: Uuid) -> OpenSession {
    match service.open(order_id).await.unwrap() {
        LaunchSession::Open(session) => session,
        other => panic!("expected an open session, got {:?}", other),
    }
}

/// Distinct, well-formed IMEI for test row `n`
pub fn imei(n: u64) -> String {
    format!("{:015}", 350_000_000_000_000u64 + n)
}
