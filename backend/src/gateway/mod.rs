//! Persistence port for purchase launches
//!
//! The launch service never touches the database directly. Everything it
//! needs from the remote store goes through [`LaunchGateway`], so the same
//! workflow runs against PostgreSQL in production and an in-memory store in
//! tests.

use async_trait::async_trait;
use shared::{
    DuplicateConflict, InventoryUnit, PurchaseOrder, ReferenceOptions, StockStatus, UnitPayload,
};
use thiserror::Error;
use uuid::Uuid;

pub mod postgres;

pub use postgres::PgLaunchGateway;

/// Errors reported by the persistence collaborator
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Submitted identifiers already exist in stock
    #[error("Identifiers already registered in stock")]
    Duplicates(DuplicateConflict),

    /// The store refused the operation; the message is shown as-is
    #[error("{0}")]
    Rejected(String),

    #[error("Purchase order {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait LaunchGateway: Send + Sync {
    async fn fetch_purchase_order(&self, order_id: Uuid) -> GatewayResult<PurchaseOrder>;

    /// Units created from any line of the order
    async fn fetch_launched_units(&self, order_id: Uuid) -> GatewayResult<Vec<InventoryUnit>>;

    /// Create every unit of the batch or none of them
    async fn submit_launch(
        &self,
        order_id: Uuid,
        payloads: &[UnitPayload],
        operator: &str,
    ) -> GatewayResult<()>;

    /// Delete every unit launched from the order
    async fn revert_launch(&self, order_id: Uuid, operator: &str) -> GatewayResult<u64>;

    /// Units of the order that appear on a sale
    async fn count_sold_units(&self, order_id: Uuid) -> GatewayResult<i64>;

    async fn update_stock_status(&self, order_id: Uuid, status: StockStatus) -> GatewayResult<()>;

    async fn reference_options(&self) -> GatewayResult<ReferenceOptions>;
}
