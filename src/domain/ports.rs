use crate::domain::bill::{BillSubmission, Doctor, Location, Patient};
use crate::domain::product::Product;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Shared handle to the product catalog; both the billing session and the
/// search debouncer hold one.
pub type SharedCatalog = Arc<dyn ProductCatalog>;
pub type GatewayBox = Box<dyn BillingGateway>;
pub type PatientLookupBox = Box<dyn PatientLookup>;
pub type DoctorLookupBox = Box<dyn DoctorLookup>;
pub type LocationLookupBox = Box<dyn LocationLookup>;

/// The catalog search collaborator. Relevance ranking is entirely the
/// backend's concern.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn search(&self, query: &str, location: Option<u32>) -> Result<Vec<Product>>;
}

/// The bill submission collaborator. A successful return means the backend
/// recorded the sale.
#[async_trait]
pub trait BillingGateway: Send + Sync {
    async fn submit(&self, bill: &BillSubmission) -> Result<()>;
}

#[async_trait]
pub trait PatientLookup: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Patient>>;
}

#[async_trait]
pub trait DoctorLookup: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Doctor>>;
}

#[async_trait]
pub trait LocationLookup: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Location>>;
}
