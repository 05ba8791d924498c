use crate::application::search::MIN_QUERY_LEN;
use crate::domain::bill::{BillSubmission, BillingContext, Doctor, Location, Patient};
use crate::domain::cart::{Cart, CartLine, CartTotals, LineKey};
use crate::domain::ports::{
    DoctorLookupBox, GatewayBox, LocationLookupBox, PatientLookupBox, SharedCatalog,
};
use crate::domain::product::Product;
use crate::error::{BillingError, Result};
use chrono::Utc;

/// Where the billing session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Empty cart.
    Idle,
    /// At least one line in the cart.
    Building,
    /// Confirmation prompt shown; cancellable without side effects.
    Confirming,
    /// Submission in flight; a second submit cannot start.
    Submitting,
}

/// The collaborator handles a session is built over.
pub struct SessionPorts {
    pub catalog: SharedCatalog,
    pub gateway: GatewayBox,
    pub patients: PatientLookupBox,
    pub doctors: DoctorLookupBox,
    pub locations: LocationLookupBox,
}

/// One billing session: the cart, its optional patient/doctor/location
/// context and the session phase.
///
/// Owned by the billing screen for exactly one session; nothing here is
/// process-global and nothing persists. On success the cart empties and the
/// session returns to `Idle`; on failure the cart is left exactly as it was
/// so the operator can retry without re-entering anything.
pub struct BillingSession {
    ports: SessionPorts,
    cart: Cart,
    context: BillingContext,
    phase: SessionPhase,
    location_required: bool,
}

impl BillingSession {
    pub fn new(ports: SessionPorts) -> Self {
        Self {
            ports,
            cart: Cart::new(),
            context: BillingContext::default(),
            phase: SessionPhase::Idle,
            location_required: false,
        }
    }

    /// In a location-scoped deployment the catalog must not be searched
    /// unscoped; `search` refuses until a location is selected.
    pub fn require_location(mut self) -> Self {
        self.location_required = true;
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn context(&self) -> &BillingContext {
        &self.context
    }

    /// Derived fresh from the line collection on every call.
    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    /// Searches the catalog. Trimmed queries shorter than two characters
    /// resolve to an empty list without a collaborator call.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }
        let location = self.context.location.as_ref().map(|location| location.id);
        if self.location_required && location.is_none() {
            return Err(BillingError::Validation(
                "select a location before searching the catalog".to_string(),
            ));
        }
        self.ports.catalog.search(query, location).await
    }

    /// Adds a product to the cart, consolidating repeat scans, and returns
    /// the affected line.
    pub fn add_to_cart(&mut self, product: &Product) -> &CartLine {
        if self.phase == SessionPhase::Idle {
            self.phase = SessionPhase::Building;
        }
        let line = self.cart.add_product(product);
        tracing::debug!(
            product = %line.name,
            batch = %line.batch,
            quantity = line.quantity,
            "product added to cart"
        );
        line
    }

    pub fn update_quantity(&mut self, key: &LineKey, value: i64) {
        self.cart.update_quantity(key, value);
    }

    pub fn update_sale_price(&mut self, key: &LineKey, raw: &str) {
        self.cart.update_sale_price(key, raw);
    }

    pub fn update_batch(&mut self, key: &LineKey, value: &str) {
        self.cart.update_batch(key, value);
    }

    pub fn update_expiry(&mut self, key: &LineKey, value: &str) {
        self.cart.update_expiry(key, value);
    }

    pub fn remove_line(&mut self, key: &LineKey) {
        self.cart.remove_line(key);
        if self.cart.is_empty() && self.phase == SessionPhase::Building {
            self.phase = SessionPhase::Idle;
        }
    }

    /// Loads the location directory. Exactly one entry auto-selects; an
    /// empty directory is a lookup error and search/billing stay blocked
    /// until a retry succeeds.
    pub async fn load_locations(&mut self) -> Result<Vec<Location>> {
        let locations = self.ports.locations.list_all().await?;
        if locations.is_empty() {
            return Err(BillingError::Lookup {
                entity: "location",
                reason: "directory returned no entries".to_string(),
            });
        }
        if let [only] = locations.as_slice() {
            tracing::info!(location = %only.name, "single location available, auto-selecting");
            self.context.location = Some(only.clone());
        }
        Ok(locations)
    }

    pub async fn load_doctors(&mut self) -> Result<Vec<Doctor>> {
        let doctors = self.ports.doctors.list_all().await?;
        if doctors.is_empty() {
            return Err(BillingError::Lookup {
                entity: "doctor",
                reason: "directory returned no entries".to_string(),
            });
        }
        if let [only] = doctors.as_slice() {
            self.context.doctor = Some(only.clone());
        }
        Ok(doctors)
    }

    pub async fn load_patients(&mut self) -> Result<Vec<Patient>> {
        let patients = self.ports.patients.list_all().await?;
        if patients.is_empty() {
            return Err(BillingError::Lookup {
                entity: "patient",
                reason: "directory returned no entries".to_string(),
            });
        }
        if let [only] = patients.as_slice() {
            self.context.patient = Some(only.clone());
        }
        Ok(patients)
    }

    pub fn select_patient(&mut self, patient: Option<Patient>) {
        self.context.patient = patient;
    }

    pub fn select_doctor(&mut self, doctor: Option<Doctor>) {
        self.context.doctor = doctor;
    }

    /// Selecting a location while lines are in the cart needs explicit
    /// confirmation: the lines were assembled against the previous scope.
    pub fn select_location(&mut self, location: Location) -> Result<()> {
        if !self.cart.is_empty() {
            return Err(BillingError::Validation(
                "cart is not empty; confirm the location change to discard it".to_string(),
            ));
        }
        self.context.location = Some(location);
        Ok(())
    }

    /// The user-confirmed path: discards the cart, then applies the change.
    pub fn confirm_location_change(&mut self, location: Location) {
        if !self.cart.is_empty() {
            tracing::info!(lines = self.cart.len(), "location change confirmed, clearing cart");
            self.cart.clear();
        }
        self.phase = SessionPhase::Idle;
        self.context.location = Some(location);
    }

    /// Opens the confirmation step and returns the totals for the prompt.
    pub fn begin_confirmation(&mut self) -> Result<CartTotals> {
        match self.phase {
            SessionPhase::Building | SessionPhase::Confirming => {
                self.phase = SessionPhase::Confirming;
                Ok(self.cart.totals())
            }
            SessionPhase::Submitting => Err(BillingError::Validation(
                "a submission is already in flight".to_string(),
            )),
            SessionPhase::Idle => Err(BillingError::Validation("nothing to bill".to_string())),
        }
    }

    /// Backs out of the confirmation prompt with no side effects.
    pub fn cancel_confirmation(&mut self) {
        if self.phase == SessionPhase::Confirming {
            self.phase = SessionPhase::Building;
        }
    }

    /// Submits the bill through the gateway.
    ///
    /// On success the cart empties and the session returns to `Idle`; on
    /// failure the cart is preserved unchanged and the session reverts to
    /// `Building` for a retry.
    pub async fn submit(&mut self) -> Result<BillSubmission> {
        match self.phase {
            SessionPhase::Confirming => {}
            SessionPhase::Submitting => {
                return Err(BillingError::Validation(
                    "a submission is already in flight".to_string(),
                ));
            }
            _ => {
                return Err(BillingError::Validation(
                    "confirm the bill before submitting".to_string(),
                ));
            }
        }

        let payload = BillSubmission::assemble(&self.cart, &self.context, Utc::now());
        self.phase = SessionPhase::Submitting;
        match self.ports.gateway.submit(&payload).await {
            Ok(()) => {
                tracing::info!(
                    total_items = payload.total_items,
                    total_amount = %payload.total_amount,
                    "bill submitted"
                );
                self.cart.clear();
                self.phase = SessionPhase::Idle;
                Ok(payload)
            }
            Err(error) => {
                tracing::warn!(error = %error, "bill submission failed, cart preserved");
                self.phase = SessionPhase::Building;
                Err(error)
            }
        }
    }
}
