//! Stock reconciliation coordinator
//!
//! Orchestrates the invoice, item and company stores so that an item's stock
//! always equals its initial quantity minus everything invoiced against it.
//! Every store call is awaited in sequence and each step gates the next:
//!
//! ```text
//! create: Validating ─▶ Committing ─▶ ReconcilingStock ─▶ Reconciled
//! update: Validating ─▶ Loading ─▶ Validating ─▶ Committing ─▶ ReconcilingStock ─▶ Reconciled
//! remove: Validating ─▶ Loading ─▶ Committing ─▶ ReconcilingStock ─▶ Reconciled
//! ```
//!
//! A failure after the first write unwinds the [`CompensationLog`] unless
//! `workflow.rollback_on_failure` is off.

use crate::config::{AdminConfig, ServicesConfig, WorkflowConfig};
use crate::core::error::{AdminError, AdminResult, StoreError};
use crate::core::query::{FindQuery, Populate, Sort};
use crate::core::{AuthContext, DataService, Populator, ServiceFetcher};
use crate::entities::{Company, Invoice, InvoicePatch, Item, PopulatedInvoice};
use crate::invoicing::compensation::{Compensation, CompensationLog};
use crate::invoicing::draft::InvoiceDraft;
use crate::invoicing::pricing::Pricing;
use crate::invoicing::reconcile::{self, StockLine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// The stores the invoice workflow reads and writes
#[derive(Clone)]
pub struct InvoiceServices {
    pub invoices: Arc<dyn DataService<Invoice>>,
    pub items: Arc<dyn DataService<Item>>,
    pub companies: Arc<dyn DataService<Company>>,
}

impl InvoiceServices {
    pub fn new(
        invoices: Arc<dyn DataService<Invoice>>,
        items: Arc<dyn DataService<Item>>,
        companies: Arc<dyn DataService<Company>>,
    ) -> Self {
        Self {
            invoices,
            items,
            companies,
        }
    }
}

/// Where a save was when it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStage {
    Idle,
    Loading,
    Validating,
    Committing,
    ReconcilingStock,
    Reconciled,
    Failed,
}

impl fmt::Display for SaveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaveStage::Idle => "idle",
            SaveStage::Loading => "loading",
            SaveStage::Validating => "validating",
            SaveStage::Committing => "committing",
            SaveStage::ReconcilingStock => "reconciling stock",
            SaveStage::Reconciled => "reconciled",
            SaveStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A save that did not reach [`SaveStage::Reconciled`]
#[derive(Debug, thiserror::Error)]
#[error("invoice {operation} failed while {stage}: {error}")]
pub struct SaveFailure {
    pub operation: &'static str,
    pub stage: SaveStage,
    #[source]
    pub error: AdminError,
    /// Whether committed writes were undone
    pub rolled_back: bool,
}

impl SaveFailure {
    pub fn into_error(self) -> AdminError {
        self.error
    }
}

/// One entry of a selection list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Uuid,
    pub label: String,
}

/// Price and availability of a freshly selected item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSelection {
    pub item_id: Uuid,
    pub unit_price: f64,
    /// Highest quantity the invoice may request
    pub available: f64,
}

#[derive(Debug)]
struct SaveRun {
    operation: &'static str,
    stage: SaveStage,
    log: CompensationLog,
}

impl SaveRun {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            stage: SaveStage::Idle,
            log: CompensationLog::new(),
        }
    }

    fn enter(&mut self, stage: SaveStage) {
        tracing::debug!(operation = self.operation, from = %self.stage, to = %stage, "save stage");
        self.stage = stage;
    }
}

/// Keeps item stock consistent with invoice mutations
pub struct StockCoordinator {
    services: InvoiceServices,
    populator: Populator,
    names: ServicesConfig,
    workflow: WorkflowConfig,
    list_limit: usize,
}

impl StockCoordinator {
    pub fn new(services: InvoiceServices, config: &AdminConfig) -> Self {
        let populator = Populator::new()
            .register(
                &config.services.companies,
                Arc::new(ServiceFetcher::new(services.companies.clone())),
            )
            .register(
                &config.services.items,
                Arc::new(ServiceFetcher::new(services.items.clone())),
            );

        Self {
            services,
            populator,
            names: config.services.clone(),
            workflow: config.workflow.clone(),
            list_limit: config.query.list_limit,
        }
    }

    pub fn services(&self) -> &InvoiceServices {
        &self.services
    }

    // =========================================================================
    // Form support
    // =========================================================================

    /// Companies for the selection list, newest first, labelled by name
    pub async fn company_options(&self) -> AdminResult<Vec<SelectOption>> {
        let found = self.services.companies.find(&self.options_query()).await?;
        Ok(found
            .data
            .into_iter()
            .map(|c| SelectOption {
                value: c.id,
                label: c.name,
            })
            .collect())
    }

    /// Items for the selection list, newest first, labelled by details
    pub async fn item_options(&self) -> AdminResult<Vec<SelectOption>> {
        let found = self.services.items.find(&self.options_query()).await?;
        Ok(found
            .data
            .into_iter()
            .map(|i| SelectOption {
                value: i.id,
                label: i.details,
            })
            .collect())
    }

    /// Unit price and availability ceiling for `item_id`
    ///
    /// `original` is the stock line the edited invoice was saved with, if any.
    /// It only frees stock when invoices reserve stock.
    pub async fn item_selection(
        &self,
        item_id: Uuid,
        original: Option<StockLine>,
    ) -> AdminResult<ItemSelection> {
        let item = self.services.items.get(&item_id).await?;
        Ok(ItemSelection {
            item_id,
            unit_price: item.price,
            available: reconcile::availability_ceiling(
                item.quantity,
                item_id,
                self.held(original),
            ),
        })
    }

    /// Fetch an invoice with its company name and item details resolved
    pub async fn fetch_populated(&self, invoice_id: Uuid) -> AdminResult<PopulatedInvoice> {
        let query = FindQuery::new()
            .with_limit(self.list_limit)
            .with_ids([invoice_id])
            .populate(Populate::new("companyId", &self.names.companies, ["name"]))
            .populate(Populate::new("itemId", &self.names.items, ["details"]));

        let found = self.services.invoices.find(&query).await?;
        let docs = self.populator.populate(found.data, &query.populate).await?;
        let doc = docs
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found("invoice", invoice_id))?;

        serde_json::from_value(doc).map_err(|e| AdminError::Internal(e.to_string()))
    }

    // =========================================================================
    // Saves
    // =========================================================================

    /// Create an invoice from `draft` and reserve its stock
    pub async fn create(
        &self,
        auth: &AuthContext,
        draft: &InvoiceDraft,
    ) -> Result<PopulatedInvoice, SaveFailure> {
        let mut run = SaveRun::new("create");
        match self.run_create(auth, draft, &mut run).await {
            Ok(invoice) => Ok(invoice),
            Err(error) => Err(self.fail(run, error).await),
        }
    }

    /// Apply `draft` to an existing invoice and reconcile item stock
    pub async fn update(
        &self,
        auth: &AuthContext,
        invoice_id: Uuid,
        draft: &InvoiceDraft,
    ) -> Result<PopulatedInvoice, SaveFailure> {
        let mut run = SaveRun::new("update");
        match self.run_update(auth, invoice_id, draft, &mut run).await {
            Ok(invoice) => Ok(invoice),
            Err(error) => Err(self.fail(run, error).await),
        }
    }

    /// Remove an invoice and return its quantity to stock
    pub async fn remove(
        &self,
        auth: &AuthContext,
        invoice_id: Uuid,
    ) -> Result<Invoice, SaveFailure> {
        let mut run = SaveRun::new("remove");
        match self.run_remove(auth, invoice_id, &mut run).await {
            Ok(invoice) => Ok(invoice),
            Err(error) => Err(self.fail(run, error).await),
        }
    }

    async fn run_create(
        &self,
        auth: &AuthContext,
        draft: &InvoiceDraft,
        run: &mut SaveRun,
    ) -> AdminResult<PopulatedInvoice> {
        run.enter(SaveStage::Validating);
        let author = auth.require_user()?;
        let (company_id, item_id) = required_references(draft)?;

        let item = self.services.items.get(&item_id).await?;
        draft.check_availability(item.quantity)?;

        run.enter(SaveStage::Committing);
        let quantity = draft.quantity();
        let pricing = entered_pricing(draft);

        let mut invoice = Invoice::new(author);
        invoice.company_id = Some(company_id);
        invoice.item_id = Some(item_id);
        invoice.quantity = Some(quantity);
        invoice.sub_total = Some(pricing.sub_total);
        invoice.discount = Some(draft.discount());
        invoice.total = Some(pricing.total);

        let created = self.services.invoices.create(invoice).await?;
        run.log.record(Compensation::RemoveInvoice {
            invoice_id: created.id,
        });

        run.enter(SaveStage::ReconcilingStock);
        if self.workflow.reserve_stock_on_create {
            let line = StockLine::new(item_id, quantity);
            self.apply_plan(reconcile::plan(None, Some(line)), run).await?;
        }

        run.enter(SaveStage::Reconciled);
        tracing::info!(
            invoice_id = %created.id,
            item_id = %item_id,
            quantity,
            total = pricing.total,
            "invoice created"
        );
        Ok(self.populated_or_unresolved(&created).await)
    }

    async fn run_update(
        &self,
        auth: &AuthContext,
        invoice_id: Uuid,
        draft: &InvoiceDraft,
        run: &mut SaveRun,
    ) -> AdminResult<PopulatedInvoice> {
        run.enter(SaveStage::Validating);
        let editor = auth.require_user()?;
        let (company_id, item_id) = required_references(draft)?;

        run.enter(SaveStage::Loading);
        let original = self.services.invoices.get(&invoice_id).await?;
        let original_line = self.held(
            original
                .item_id
                .map(|id| StockLine::new(id, original.quantity())),
        );
        let item = self.services.items.get(&item_id).await?;

        run.enter(SaveStage::Validating);
        let available = reconcile::availability_ceiling(item.quantity, item_id, original_line);
        draft.check_availability(available)?;

        run.enter(SaveStage::Committing);
        let quantity = draft.quantity();
        let pricing = entered_pricing(draft);
        let patch = InvoicePatch {
            company_id: Some(company_id),
            item_id: Some(item_id),
            quantity: Some(quantity),
            sub_total: Some(pricing.sub_total),
            discount: Some(draft.discount()),
            total: Some(pricing.total),
            updated_by: Some(editor),
        };

        let updated = self.services.invoices.patch(&invoice_id, patch).await?;
        run.log.record(Compensation::RestoreInvoice {
            previous: Box::new(original),
        });

        run.enter(SaveStage::ReconcilingStock);
        if self.workflow.reserve_stock_on_create {
            let deltas = reconcile::plan(original_line, Some(StockLine::new(item_id, quantity)));
            if deltas.is_empty() {
                tracing::debug!(invoice_id = %invoice_id, "stock unchanged");
            }
            self.apply_plan(deltas, run).await?;
        }

        run.enter(SaveStage::Reconciled);
        tracing::info!(
            invoice_id = %invoice_id,
            item_id = %item_id,
            quantity,
            total = pricing.total,
            "invoice updated"
        );
        Ok(self.populated_or_unresolved(&updated).await)
    }

    async fn run_remove(
        &self,
        auth: &AuthContext,
        invoice_id: Uuid,
        run: &mut SaveRun,
    ) -> AdminResult<Invoice> {
        run.enter(SaveStage::Validating);
        auth.require_user()?;

        run.enter(SaveStage::Loading);
        let original = self.services.invoices.get(&invoice_id).await?;
        let original_line = original
            .item_id
            .map(|id| StockLine::new(id, original.quantity()));

        run.enter(SaveStage::Committing);
        let removed = self.services.invoices.remove(&invoice_id).await?;
        run.log.record(Compensation::RecreateInvoice {
            removed: Box::new(removed.clone()),
        });

        run.enter(SaveStage::ReconcilingStock);
        if self.workflow.reserve_stock_on_create {
            self.apply_plan(reconcile::plan(original_line, None), run)
                .await?;
        }

        run.enter(SaveStage::Reconciled);
        tracing::info!(invoice_id = %invoice_id, "invoice removed");
        Ok(removed)
    }

    /// The stock `line` holds, if invoices reserve stock at all
    fn held(&self, line: Option<StockLine>) -> Option<StockLine> {
        line.filter(|_| self.workflow.reserve_stock_on_create)
    }

    async fn apply_plan(
        &self,
        deltas: Vec<reconcile::StockDelta>,
        run: &mut SaveRun,
    ) -> AdminResult<()> {
        for delta in deltas {
            reconcile::apply_stock_delta(self.services.items.as_ref(), delta).await?;
            run.log.record(Compensation::RevertStock { applied: delta });
        }
        Ok(())
    }

    async fn populated_or_unresolved(&self, invoice: &Invoice) -> PopulatedInvoice {
        match self.fetch_populated(invoice.id).await {
            Ok(populated) => populated,
            Err(e) => {
                tracing::warn!(
                    invoice_id = %invoice.id,
                    error = %e,
                    "saved invoice could not be re-fetched with references"
                );
                PopulatedInvoice::unresolved(invoice)
            }
        }
    }

    async fn fail(&self, run: SaveRun, error: AdminError) -> SaveFailure {
        let SaveRun {
            operation,
            stage,
            log,
        } = run;

        if log.is_empty() {
            tracing::debug!(operation, stage = %stage, error = %error, "save rejected before any write");
            return SaveFailure {
                operation,
                stage,
                error,
                rolled_back: false,
            };
        }

        if !self.workflow.rollback_on_failure {
            tracing::warn!(
                operation,
                stage = %stage,
                error = %error,
                committed = log.len(),
                "save failed, rollback disabled"
            );
            return SaveFailure {
                operation,
                stage,
                error,
                rolled_back: false,
            };
        }

        tracing::warn!(
            operation,
            stage = %stage,
            error = %error,
            steps = log.len(),
            "save failed, rolling back"
        );
        match log.unwind(&self.services).await {
            Ok(_) => SaveFailure {
                operation,
                stage,
                error,
                rolled_back: true,
            },
            Err(residue) => {
                tracing::error!(
                    operation,
                    stage = %stage,
                    residue = ?residue,
                    "rollback incomplete, stock may be inconsistent"
                );
                SaveFailure {
                    operation,
                    stage,
                    error: AdminError::ReconciliationIncomplete {
                        cause: into_store_error(error, &self.names.invoices, operation),
                        residue,
                    },
                    rolled_back: false,
                }
            }
        }
    }

    fn options_query(&self) -> FindQuery {
        FindQuery::new()
            .with_limit(self.list_limit)
            .sorted_by(Sort::desc("createdAt"))
    }
}

fn required_references(draft: &InvoiceDraft) -> AdminResult<(Uuid, Uuid)> {
    draft.validate_fields()?;
    match (draft.company_id(), draft.item_id()) {
        (Some(company_id), Some(item_id)) => Ok((company_id, item_id)),
        _ => Err(AdminError::Internal(
            "validated draft is missing a reference".to_string(),
        )),
    }
}

/// Prices as the user saw them, from the unit price captured at item selection
fn entered_pricing(draft: &InvoiceDraft) -> Pricing {
    Pricing::derive(
        Some(draft.quantity()),
        Some(draft.unit_price()),
        Some(draft.discount()),
    )
}

fn into_store_error(error: AdminError, service: &str, operation: &str) -> StoreError {
    match error {
        AdminError::Store(e) => e,
        other => StoreError::Operation {
            service: service.to_string(),
            operation: operation.to_string(),
            message: other.to_string(),
        },
    }
}
