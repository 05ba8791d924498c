use crate::domain::product::Product;
use crate::error::BillingError;
use std::io::Read;

/// Reads a product catalog export. Decimal fields arrive string-encoded
/// and parse at this boundary; a malformed row yields an error item without
/// stopping the stream.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn products(self) -> impl Iterator<Item = Result<Product, BillingError>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BillingError::from))
    }
}
