use crate::error::BillingError;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Search the catalog with `name` as the query and add the first hit.
    Scan,
    /// Set the quantity on the `(name, batch)` line to `value`.
    Qty,
    /// Set the sale price on the `(name, batch)` line to `value`.
    Price,
    /// Replace the batch text on the `(name, batch)` line with `value`.
    Rebatch,
    /// Replace the expiry on the `(name, batch)` line with `value`.
    Expiry,
    /// Remove the `(name, batch)` line.
    Remove,
    /// Confirm and submit the bill.
    Submit,
}

/// One recorded operation of a billing session.
///
/// The stream addresses cart lines the way the operator sees them, by
/// product name and batch; the engine resolves that to a line key.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct SessionOp {
    pub op: OpKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub value: String,
}

pub struct OpReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OpReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn ops(self) -> impl Iterator<Item = Result<SessionOp, BillingError>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BillingError::from))
    }
}
