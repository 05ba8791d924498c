use crate::domain::bill::{BillSubmission, Doctor, Location, Patient};
use crate::domain::ports::{
    BillingGateway, DoctorLookup, LocationLookup, PatientLookup, ProductCatalog,
};
use crate::domain::product::Product;
use crate::error::{BillingError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory product catalog backing the CLI driver and the test suite.
///
/// Matching is a case-insensitive substring scan over product and drug
/// names; relevance ranking is explicitly the real backend's concern and
/// this adapter makes no attempt at it.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(RwLock::new(products)),
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn search(&self, query: &str, _location: Option<u32>) -> Result<Vec<Product>> {
        let needle = query.trim().to_lowercase();
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|product| {
                product.name.to_lowercase().contains(&needle)
                    || product.drug.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

/// Fixed patient/doctor/location lists implementing the three lookup
/// ports. Stands in for the directory endpoints of the real backend.
#[derive(Debug, Default, Clone)]
pub struct StaticDirectory {
    pub patients: Vec<Patient>,
    pub doctors: Vec<Doctor>,
    pub locations: Vec<Location>,
}

#[async_trait]
impl PatientLookup for StaticDirectory {
    async fn list_all(&self) -> Result<Vec<Patient>> {
        Ok(self.patients.clone())
    }
}

#[async_trait]
impl DoctorLookup for StaticDirectory {
    async fn list_all(&self) -> Result<Vec<Doctor>> {
        Ok(self.doctors.clone())
    }
}

#[async_trait]
impl LocationLookup for StaticDirectory {
    async fn list_all(&self) -> Result<Vec<Location>> {
        Ok(self.locations.clone())
    }
}

/// Billing gateway that records accepted payloads, or refuses every
/// submission with a fixed reason when told to fail.
#[derive(Default, Clone)]
pub struct RecordingGateway {
    accepted: Arc<RwLock<Vec<BillSubmission>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent submission fail with the given reason.
    pub async fn fail_with(&self, reason: &str) {
        *self.failure.write().await = Some(reason.to_string());
    }

    /// Restores the accepting behavior.
    pub async fn accept(&self) {
        *self.failure.write().await = None;
    }

    pub async fn accepted(&self) -> Vec<BillSubmission> {
        self.accepted.read().await.clone()
    }
}

#[async_trait]
impl BillingGateway for RecordingGateway {
    async fn submit(&self, bill: &BillSubmission) -> Result<()> {
        if let Some(reason) = self.failure.read().await.clone() {
            return Err(BillingError::Submission(reason));
        }
        self.accepted.write().await.push(bill.clone());
        Ok(())
    }
}
