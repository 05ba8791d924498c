use crate::domain::product::{self, Product};
use rust_decimal::Decimal;
use serde::Serialize;

/// Stable identity of a cart line.
///
/// Keyed by normalized product name and batch, so distinct batches of the
/// same product bill as distinct lines. Falls back to the catalog
/// identifier when the batch is blank, and to the name alone when the
/// identifier is also absent. Assigned once at line creation and never
/// recomputed from later edits: an in-flight batch edit must not merge two
/// rows or move one out from under the operator's cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey(String);

impl LineKey {
    pub fn for_product(product: &Product) -> Self {
        let batch = product.batch.trim();
        if batch.is_empty() {
            return match product.id {
                Some(id) => Self(format!("#{id}")),
                None => Self(normalize(&product.name)),
            };
        }
        Self(format!("{}::{}", normalize(&product.name), normalize(batch)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize(field: &str) -> String {
    field.trim().to_lowercase()
}

/// One editable, quantity-bearing row of the bill, derived from a catalog
/// product at add time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub key: LineKey,
    pub product_id: Option<u32>,
    pub name: String,
    pub drug: String,
    pub mrp: Decimal,
    /// Always at least 1.
    pub quantity: u32,
    /// Independently editable per line; never negative.
    pub sale_price: Decimal,
    pub batch: String,
    /// Normalized `YYYY-MM-DD` at creation, free-form after operator edits.
    pub expiry_date: String,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        Self {
            key: LineKey::for_product(product),
            product_id: product.id,
            name: product.name.clone(),
            drug: product.drug.clone(),
            mrp: product.mrp,
            quantity: 1,
            sale_price: product.unit_price.max(Decimal::ZERO),
            batch: product.batch.clone(),
            expiry_date: product::normalize_expiry(&product.expiry),
        }
    }

    /// Derived on demand, never stored.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.sale_price
    }
}

/// Aggregate totals over the cart. Recomputed fresh on every call; there is
/// no cached copy to go stale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CartTotals {
    pub total_items: u64,
    pub total_amount: Decimal,
}

/// The ordered cart line collection and its consolidation rules.
///
/// Line keys are unique within the collection at all times. Lines keep
/// their insertion order; new lines append at the end.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product, consolidating into the existing line when one with
    /// the same key is already present.
    ///
    /// A repeat add only increments the quantity: sale price, batch and
    /// expiry reflect operator edits and must not be overwritten by a
    /// repeat scan. Returns the affected line.
    pub fn add_product(&mut self, product: &Product) -> &CartLine {
        let key = LineKey::for_product(product);
        let index = match self.position(&key) {
            Some(index) => {
                self.lines[index].quantity += 1;
                index
            }
            None => {
                self.lines.push(CartLine::from_product(product));
                self.lines.len() - 1
            }
        };
        &self.lines[index]
    }

    /// Sets the quantity on the addressed line. Anything that is not a
    /// positive integer coerces to 1; there is no upper bound here, stock
    /// checks belong to the backend.
    pub fn update_quantity(&mut self, key: &LineKey, value: i64) {
        if let Some(line) = self.line_mut(key) {
            line.quantity = u32::try_from(value).ok().filter(|q| *q >= 1).unwrap_or(1);
        }
    }

    /// Sets the sale price on the addressed line from raw operator input.
    /// Invalid or negative input coerces to zero.
    pub fn update_sale_price(&mut self, key: &LineKey, raw: &str) {
        if let Some(line) = self.line_mut(key) {
            line.sale_price = product::parse_price(raw);
        }
    }

    /// Replaces the batch text on the addressed line only. The line key is
    /// fixed at creation time, so an edit that collides with another line's
    /// batch never merges the two rows.
    pub fn update_batch(&mut self, key: &LineKey, value: &str) {
        if let Some(line) = self.line_mut(key) {
            line.batch = value.trim().to_string();
        }
    }

    pub fn update_expiry(&mut self, key: &LineKey, value: &str) {
        if let Some(line) = self.line_mut(key) {
            line.expiry_date = value.trim().to_string();
        }
    }

    /// Removing an absent key is a no-op: rapid double-clicks must not
    /// surface a user-visible failure.
    pub fn remove_line(&mut self, key: &LineKey) {
        self.lines.retain(|line| &line.key != key);
    }

    /// Folds the current line collection into totals.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total_items: self.lines.iter().map(|line| u64::from(line.quantity)).sum(),
            total_amount: self.lines.iter().map(CartLine::line_total).sum(),
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn get(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.key == key)
    }

    /// Finds the key of the line whose displayed name and batch match, for
    /// callers that address rows by what the operator sees.
    pub fn line_matching(&self, name: &str, batch: &str) -> Option<LineKey> {
        self.lines
            .iter()
            .find(|line| {
                normalize(&line.name) == normalize(name)
                    && normalize(&line.batch) == normalize(batch)
            })
            .map(|line| line.key.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.lines.iter().position(|line| &line.key == key)
    }

    fn line_mut(&mut self, key: &LineKey) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| &line.key == key)
    }
}
