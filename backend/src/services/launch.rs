//! Stock launch workflow for purchase orders
//!
//! Drives a launch session end to end: plans rows (or resumes a draft),
//! persists every edit, validates and submits the batch, writes the derived
//! stock status back, and reverts a launch on request.

use serde::Serialize;
use shared::{
    apply_to_all, build_payloads, check_preconditions, check_quantities, draft_from_units,
    edit_row, ledger, mark_conflicts, plan_launch, reconcile_status, restore_draft,
    status_from_ledger, Draft, DraftRestore, LaunchError, LaunchRow, LaunchSummary, PlannedItem,
    PurchaseOrder, QuantityLedger, ReferenceOptions, RowDefaults, RowEdit, StockStatus,
};
use uuid::Uuid;

use crate::drafts::DraftStore;
use crate::error::{AppError, AppResult};
use crate::gateway::{GatewayError, LaunchGateway};

/// Launch service over a persistence gateway and a draft store
pub struct LaunchService<G, D> {
    gateway: G,
    drafts: D,
    defaults: RowDefaults,
}

/// What the operator sees when opening the launch flow
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LaunchSession {
    Open(OpenSession),
    /// Every line is launched; nothing left to do
    FullyLaunched(StatusReport),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSession {
    pub order_id: Uuid,
    pub display_number: i32,
    pub items: Vec<PlannedItem>,
    pub rows: Vec<LaunchRow>,
    pub from_draft: bool,
    pub summary: LaunchSummary,
    pub options: ReferenceOptions,
}

/// Rows after an edit, with refreshed totals
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedRows {
    pub rows: Vec<LaunchRow>,
    pub summary: LaunchSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub order_id: Uuid,
    pub status: StockStatus,
    /// Status as last written on the order
    pub stored_status: StockStatus,
    pub ledger: QuantityLedger,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Launched(LaunchReceipt),
    /// The batch was refused; `rows` carry the markers to correct
    Rejected {
        error: LaunchError,
        rows: Vec<LaunchRow>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchReceipt {
    pub order_id: Uuid,
    pub summary: LaunchSummary,
    pub status: StockStatus,
    pub ledger: QuantityLedger,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertReceipt {
    pub order_id: Uuid,
    pub removed_units: u64,
    /// Rows rebuilt from the removed units, saved as the order's draft
    pub draft_rows: Vec<LaunchRow>,
    pub status: StockStatus,
}

impl<G, D> LaunchService<G, D>
where
    G: LaunchGateway,
    D: DraftStore,
{
    pub fn new(gateway: G, drafts: D, defaults: RowDefaults) -> Self {
        Self {
            gateway,
            drafts,
            defaults,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn drafts(&self) -> &D {
        &self.drafts
    }

    /// Open a launch session: resume the stored draft when it still fits
    /// the order, otherwise plan the remaining quantities afresh. The order
    /// counts as fully launched only when nothing is left to plan and no
    /// draft was accepted.
    pub async fn open(&self, order_id: Uuid) -> AppResult<LaunchSession> {
        let order = self.gateway.fetch_purchase_order(order_id).await?;
        ensure_not_cancelled(&order)?;
        let units = self.gateway.fetch_launched_units(order_id).await?;
        let plan = plan_launch(&order, &units, &self.defaults);

        let restored = restore_draft(self.load_draft(order_id).await, &order);
        if let DraftRestore::Discarded { stale_item_ids } = &restored {
            tracing::debug!(
                %order_id,
                stale_items = stale_item_ids.len(),
                "Discarding stale launch draft"
            );
            self.discard_draft(order_id).await;
        }

        let (mut rows, from_draft) = match restored {
            DraftRestore::Accepted(rows) => (rows, true),
            _ if plan.is_fully_launched() => {
                tracing::info!(%order_id, "Purchase order fully launched");
                return Ok(LaunchSession::FullyLaunched(StatusReport {
                    order_id,
                    status: reconcile_status(&order, &units),
                    stored_status: order.stock_status,
                    ledger: ledger(&order, &units),
                }));
            }
            _ => (plan.rows, false),
        };

        let options = self.gateway.reference_options().await?;
        for row in rows.iter_mut() {
            options.normalize_row(row, &self.defaults);
        }

        tracing::info!(
            %order_id,
            rows = rows.len(),
            from_draft,
            "Launch session opened"
        );

        Ok(LaunchSession::Open(OpenSession {
            order_id,
            display_number: order.display_number,
            items: plan.items,
            summary: LaunchSummary::of(&rows),
            rows,
            from_draft,
            options,
        }))
    }

    /// Persist the operator's current rows
    pub async fn save_draft(&self, order_id: Uuid, rows: Vec<LaunchRow>) -> AppResult<EditedRows> {
        let order = self.gateway.fetch_purchase_order(order_id).await?;
        if let Some(row) = rows.iter().find(|row| !order.has_item(row.purchase_item_id)) {
            return Err(LaunchError::UnknownItem(row.purchase_item_id).into());
        }
        self.write_draft(order_id, &rows).await;
        Ok(EditedRows {
            summary: LaunchSummary::of(&rows),
            rows,
        })
    }

    pub async fn edit_row(
        &self,
        order_id: Uuid,
        mut rows: Vec<LaunchRow>,
        index: usize,
        edit: &RowEdit,
    ) -> AppResult<EditedRows> {
        edit_row(&mut rows, index, edit)?;
        self.write_draft(order_id, &rows).await;
        Ok(EditedRows {
            summary: LaunchSummary::of(&rows),
            rows,
        })
    }

    pub async fn apply_to_all(
        &self,
        order_id: Uuid,
        mut rows: Vec<LaunchRow>,
        edit: &RowEdit,
    ) -> AppResult<EditedRows> {
        apply_to_all(&mut rows, edit)?;
        self.write_draft(order_id, &rows).await;
        Ok(EditedRows {
            summary: LaunchSummary::of(&rows),
            rows,
        })
    }

    /// Validate and launch a batch.
    ///
    /// Refusals come back as [`SubmitOutcome::Rejected`] with the rows the
    /// operator should keep editing. Validation refusals (identifiers, price,
    /// per-row quantity) never reach the gateway. A duplicate conflict reported by the gateway marks the
    /// colliding rows; any other gateway failure returns the rows untouched.
    pub async fn submit(
        &self,
        order_id: Uuid,
        mut rows: Vec<LaunchRow>,
        operator: &str,
    ) -> AppResult<SubmitOutcome> {
        let order = self.gateway.fetch_purchase_order(order_id).await?;
        ensure_not_cancelled(&order)?;

        let checked =
            check_preconditions(&mut rows).and_then(|()| check_quantities(&order, &mut rows));
        if let Err(error) = checked {
            tracing::debug!(%order_id, code = error.code(), "Launch batch failed validation");
            self.write_draft(order_id, &rows).await;
            return Ok(SubmitOutcome::Rejected { error, rows });
        }

        let payloads = build_payloads(&order, &rows)?;
        let summary = LaunchSummary::of(&rows);
        let before = ledger(&order, &self.gateway.fetch_launched_units(order_id).await?);

        if let Err(err) = self
            .gateway
            .submit_launch(order_id, &payloads, operator)
            .await
        {
            let error = match err {
                GatewayError::Duplicates(conflict) => {
                    let marked = mark_conflicts(&mut rows, &conflict);
                    LaunchError::Conflict {
                        rows: marked,
                        message: conflict.message(),
                    }
                }
                other => LaunchError::Transient(other.to_string()),
            };
            tracing::warn!(%order_id, code = error.code(), "Launch submission refused: {}", error);
            self.write_draft(order_id, &rows).await;
            return Ok(SubmitOutcome::Rejected { error, rows });
        }

        // Committed: from here on failures are logged, never returned
        self.discard_draft(order_id).await;

        let quantities = match self.gateway.fetch_launched_units(order_id).await {
            Ok(units) => ledger(&order, &units),
            Err(e) => {
                tracing::warn!(%order_id, "Failed to reload launched units: {}", e);
                before.with_launched(summary.units)
            }
        };
        let status = status_from_ledger(&quantities);
        if let Err(e) = self.gateway.update_stock_status(order_id, status).await {
            tracing::warn!(
                %order_id,
                status = status.as_str(),
                "Failed to write stock status back: {}",
                e
            );
        }

        tracing::info!(
            %order_id,
            rows = summary.rows,
            units = summary.units,
            status = status.as_str(),
            operator,
            "Stock launched"
        );

        Ok(SubmitOutcome::Launched(LaunchReceipt {
            order_id,
            summary,
            status,
            ledger: quantities,
        }))
    }

    /// Remove every unit launched from the order and hand the manifest back
    /// as a draft. Refused when any of those units was sold.
    pub async fn revert(&self, order_id: Uuid, operator: &str) -> AppResult<RevertReceipt> {
        let order = self.gateway.fetch_purchase_order(order_id).await?;
        ensure_not_cancelled(&order)?;

        let sold = self.gateway.count_sold_units(order_id).await?;
        if sold > 0 {
            return Err(LaunchError::RevertRefused { sold }.into());
        }

        let units = self.gateway.fetch_launched_units(order_id).await?;
        if units.is_empty() {
            return Err(LaunchError::NothingToRevert.into());
        }
        let draft_rows = draft_from_units(&order, &units);

        let removed_units = self.gateway.revert_launch(order_id, operator).await?;
        self.write_draft(order_id, &draft_rows).await;
        self.gateway
            .update_stock_status(order_id, StockStatus::Pending)
            .await?;

        tracing::info!(%order_id, removed_units, operator, "Stock launch reverted");

        Ok(RevertReceipt {
            order_id,
            removed_units,
            draft_rows,
            status: StockStatus::Pending,
        })
    }

    /// Stock status derived from the units currently launched
    pub async fn status(&self, order_id: Uuid) -> AppResult<StatusReport> {
        let order = self.gateway.fetch_purchase_order(order_id).await?;
        let units = self.gateway.fetch_launched_units(order_id).await?;
        Ok(StatusReport {
            order_id,
            status: reconcile_status(&order, &units),
            stored_status: order.stock_status,
            ledger: ledger(&order, &units),
        })
    }

    pub async fn options(&self) -> AppResult<ReferenceOptions> {
        Ok(self.gateway.reference_options().await?)
    }

    // A draft that cannot be read is treated as absent.
    async fn load_draft(&self, order_id: Uuid) -> Option<Draft> {
        match self.drafts.get(order_id).await {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!(%order_id, "Ignoring unreadable launch draft: {}", e);
                None
            }
        }
    }

    async fn write_draft(&self, order_id: Uuid, rows: &[LaunchRow]) {
        let draft = Draft::new(order_id, rows.to_vec());
        if let Err(e) = self.drafts.put(order_id, &draft).await {
            tracing::warn!(%order_id, "Failed to save launch draft: {}", e);
        }
    }

    async fn discard_draft(&self, order_id: Uuid) {
        if let Err(e) = self.drafts.clear(order_id).await {
            tracing::warn!(%order_id, "Failed to clear launch draft: {}", e);
        }
    }
}

fn ensure_not_cancelled(order: &PurchaseOrder) -> Result<(), AppError> {
    if order.stock_status == StockStatus::Cancelled {
        return Err(LaunchError::OrderCancelled.into());
    }
    Ok(())
}
