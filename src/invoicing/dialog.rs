//! Invoice create/edit dialog
//!
//! Holds the form state for one dialog session and is the boundary where
//! every workflow error becomes visible state plus an alert. Nothing here
//! panics or propagates: a failed save leaves the dialog open and editable.

use crate::core::error::AdminError;
use crate::core::{Alert, AlertSink, AuthContext};
use crate::entities::PopulatedInvoice;
use crate::invoicing::coordinator::{SaveStage, SelectOption, StockCoordinator};
use crate::invoicing::draft::InvoiceDraft;
use crate::invoicing::pricing::Pricing;
use crate::invoicing::reconcile::StockLine;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Key under which errors without a field are reported
pub const GENERAL_ERROR_KEY: &str = "error";

/// Whether the dialog creates a new invoice or edits a stored one
#[derive(Debug, Clone, PartialEq)]
pub enum DialogMode {
    Create,
    Edit {
        invoice_id: Uuid,
        /// Stock held by the invoice when the dialog opened
        original: Option<StockLine>,
    },
}

pub struct InvoiceDialog {
    coordinator: Arc<StockCoordinator>,
    alerts: Arc<dyn AlertSink>,
    auth: AuthContext,
    mode: DialogMode,
    draft: InvoiceDraft,
    company_options: Vec<SelectOption>,
    item_options: Vec<SelectOption>,
    available: Option<f64>,
    errors: BTreeMap<String, String>,
    stage: SaveStage,
    open: bool,
    loading: bool,
}

impl InvoiceDialog {
    /// Open an empty dialog and load the selection lists
    pub async fn open_create(
        coordinator: Arc<StockCoordinator>,
        alerts: Arc<dyn AlertSink>,
        auth: AuthContext,
    ) -> Self {
        let mut dialog = Self::blank(coordinator, alerts, auth, DialogMode::Create);
        dialog.load_options().await;
        dialog
    }

    /// Open a dialog on a stored invoice
    ///
    /// Loads the selection lists and the price and availability of the
    /// invoice's item. Stock the invoice already holds counts as available.
    pub async fn open_edit(
        coordinator: Arc<StockCoordinator>,
        alerts: Arc<dyn AlertSink>,
        auth: AuthContext,
        invoice_id: Uuid,
    ) -> Result<Self, AdminError> {
        let invoice = coordinator.services().invoices.get(&invoice_id).await?;
        let original = invoice
            .item_id
            .map(|id| StockLine::new(id, invoice.quantity()));

        let mut dialog = Self::blank(
            coordinator,
            alerts,
            auth,
            DialogMode::Edit {
                invoice_id,
                original,
            },
        );
        dialog.draft = InvoiceDraft::from_invoice(&invoice);
        dialog.load_options().await;

        if let Some(item_id) = invoice.item_id {
            match dialog.coordinator.item_selection(item_id, original).await {
                Ok(selection) => {
                    dialog.draft.set_unit_price(selection.unit_price);
                    dialog.available = Some(selection.available);
                    dialog.draft.recompute();
                }
                Err(e) => {
                    tracing::warn!(invoice_id = %invoice_id, error = %e, "initial item load failed");
                    dialog.alert(Alert::error(
                        "Initial Item Load",
                        "Failed to fetch item details",
                    ));
                }
            }
        }

        Ok(dialog)
    }

    fn blank(
        coordinator: Arc<StockCoordinator>,
        alerts: Arc<dyn AlertSink>,
        auth: AuthContext,
        mode: DialogMode,
    ) -> Self {
        Self {
            coordinator,
            alerts,
            auth,
            mode,
            draft: InvoiceDraft::new(),
            company_options: Vec::new(),
            item_options: Vec::new(),
            available: None,
            errors: BTreeMap::new(),
            stage: SaveStage::Idle,
            open: true,
            loading: false,
        }
    }

    async fn load_options(&mut self) {
        match self.coordinator.company_options().await {
            Ok(options) => self.company_options = options,
            Err(e) => {
                tracing::warn!(error = %e, "company options failed to load");
                self.alert(Alert::error("Companies", fallback(&e, "Failed get companies")));
            }
        }
        match self.coordinator.item_options().await {
            Ok(options) => self.item_options = options,
            Err(e) => {
                tracing::warn!(error = %e, "item options failed to load");
                self.alert(Alert::error("Items", fallback(&e, "Failed get items")));
            }
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn set_company(&mut self, company_id: Option<Uuid>) {
        self.clear_error("companyId");
        self.draft.set_company(company_id);
        self.draft.recompute();
    }

    pub fn set_quantity(&mut self, quantity: Option<f64>) {
        self.clear_error("quantity");
        self.draft.set_quantity(quantity);
        self.draft.recompute();
    }

    /// Set the discount percentage, clamped into `[0, 100]`
    pub fn set_discount(&mut self, discount: Option<f64>) {
        self.clear_error("discount");
        self.draft.set_discount(discount);
        self.draft.recompute();
    }

    /// Select an item and load its price and availability
    ///
    /// On failure the selection is kept with a zero price and no known
    /// availability, and an alert is raised.
    pub async fn select_item(&mut self, item_id: Option<Uuid>) {
        self.clear_error("itemId");
        self.clear_error("quantity");

        let Some(id) = item_id else {
            self.draft.set_item(None, 0.0);
            self.available = None;
            self.draft.recompute();
            return;
        };

        match self.coordinator.item_selection(id, self.original()).await {
            Ok(selection) => {
                self.draft.set_item(Some(id), selection.unit_price);
                self.available = Some(selection.available);
            }
            Err(e) => {
                tracing::warn!(item_id = %id, error = %e, "item details failed to load");
                self.draft.set_item(Some(id), 0.0);
                self.available = None;
                self.alert(Alert::error("Item Load", "Failed to fetch item details"));
            }
        }
        self.draft.recompute();
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Validate, save through the coordinator and report the outcome
    ///
    /// Returns the populated invoice on success. On failure the dialog stays
    /// open with its errors set and `None` is returned.
    pub async fn save(&mut self) -> Option<PopulatedInvoice> {
        self.draft.recompute();
        self.errors.clear();

        let local = self.draft.validate_fields().and_then(|()| match self.available {
            Some(available) => self.draft.check_availability(available),
            None => Ok(()),
        });
        if let Err(e) = local {
            self.stage = SaveStage::Failed;
            self.show_errors(&AdminError::from(e));
            return None;
        }

        self.loading = true;
        let outcome = match &self.mode {
            DialogMode::Create => self.coordinator.create(&self.auth, &self.draft).await,
            DialogMode::Edit { invoice_id, .. } => {
                self.coordinator
                    .update(&self.auth, *invoice_id, &self.draft)
                    .await
            }
        };
        self.loading = false;

        match outcome {
            Ok(invoice) => {
                self.stage = SaveStage::Reconciled;
                self.open = false;
                let alert = match self.mode {
                    DialogMode::Create => {
                        Alert::success("Create info", "Info invoices created successfully")
                    }
                    DialogMode::Edit { .. } => {
                        Alert::success("Edit info", "Info invoices updated successfully")
                    }
                };
                self.alert(alert);
                Some(invoice)
            }
            Err(failure) => {
                tracing::warn!(
                    stage = %failure.stage,
                    rolled_back = failure.rolled_back,
                    error = %failure.error,
                    "invoice save failed"
                );
                self.stage = SaveStage::Failed;
                self.show_errors(&failure.error);
                let alert = match self.mode {
                    DialogMode::Create => Alert::error("Create", "Failed to create in Invoices"),
                    DialogMode::Edit { .. } => Alert::error("Edit info", "Failed to update info"),
                };
                self.alert(alert);
                None
            }
        }
    }

    /// Close without saving
    pub fn close(&mut self) {
        self.open = false;
        self.errors.clear();
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn mode(&self) -> &DialogMode {
        &self.mode
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn pricing(&self) -> Pricing {
        self.draft.pricing()
    }

    pub fn company_options(&self) -> &[SelectOption] {
        &self.company_options
    }

    pub fn item_options(&self) -> &[SelectOption] {
        &self.item_options
    }

    /// Availability ceiling of the selected item, once loaded
    pub fn available(&self) -> Option<f64> {
        self.available
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn stage(&self) -> SaveStage {
        self.stage
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn original(&self) -> Option<StockLine> {
        match &self.mode {
            DialogMode::Edit { original, .. } => *original,
            DialogMode::Create => None,
        }
    }

    fn clear_error(&mut self, field: &str) {
        self.errors.remove(field);
        self.errors.remove(GENERAL_ERROR_KEY);
    }

    fn show_errors(&mut self, error: &AdminError) {
        self.errors = error
            .field_messages()
            .unwrap_or_else(|| BTreeMap::from([(GENERAL_ERROR_KEY.to_string(), error.to_string())]));
    }

    fn alert(&self, alert: Alert) {
        self.alerts.raise(alert);
    }
}

fn fallback(error: &AdminError, default: &str) -> String {
    let message = error.to_string();
    if message.is_empty() {
        default.to_string()
    } else {
        message
    }
}
