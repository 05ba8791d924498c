#![allow(dead_code)]

use pharmapos::domain::product::{Product, parse_decimal};
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const CATALOG_HEADERS: [&str; 8] = [
    "ProductID",
    "ProductName",
    "Drug",
    "MRP",
    "unitPrice",
    "Batch",
    "Exp",
    "QtyInStock",
];

pub fn write_catalog(path: &Path, rows: &[[&str; 8]]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(CATALOG_HEADERS)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_ops(path: &Path, rows: &[[&str; 4]]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["op", "name", "batch", "value"])?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// The same product in two batches, plus an unrelated one.
pub fn sample_catalog(path: &Path) -> Result<(), Error> {
    write_catalog(
        path,
        &[
            [
                "101",
                "Paracetamol 500mg",
                "Paracetamol",
                "7.00",
                "5.00",
                "B1",
                "2027-03-31T00:00:00.000Z",
                "120",
            ],
            [
                "101",
                "Paracetamol 500mg",
                "Paracetamol",
                "7.50",
                "5.50",
                "B2",
                "2027-09-30",
                "60",
            ],
            [
                "202",
                "Ibuprofen 400mg",
                "Ibuprofen",
                "12.00",
                "9.75",
                "C7",
                "30/06/2027",
                "45",
            ],
        ],
    )
}

pub fn product(id: u32, name: &str, batch: &str, unit_price: &str) -> Product {
    Product {
        id: Some(id),
        name: name.to_string(),
        drug: name.to_string(),
        mrp: parse_decimal(unit_price) + parse_decimal("1.50"),
        unit_price: parse_decimal(unit_price),
        batch: batch.to_string(),
        expiry: "2027-03-31T00:00:00.000Z".to_string(),
        qty_in_stock: Some(100),
    }
}
