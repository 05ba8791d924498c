use crate::domain::cart::{Cart, CartLine};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A registered patient, as returned by the patient lookup service.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Patient {
    #[serde(rename = "Patient_id")]
    pub id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Age", default)]
    pub age: Option<u32>,
    #[serde(rename = "Gender", default)]
    pub gender: Option<String>,
    #[serde(rename = "Mobile", default)]
    pub mobile: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Doctor {
    #[serde(rename = "DoctorID")]
    pub id: u32,
    #[serde(rename = "DoctorName")]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Location {
    #[serde(rename = "LocationID")]
    pub id: u32,
    #[serde(rename = "LocationName")]
    pub name: String,
}

/// Optional patient/doctor/location context, attached to the payload at
/// submission time. Not part of cart identity.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct BillingContext {
    pub location: Option<Location>,
    pub doctor: Option<Doctor>,
    pub patient: Option<Patient>,
}

/// One line of the submission payload, in the backend's wire shape.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct BillLine {
    #[serde(rename = "ProductID")]
    pub product_id: Option<u32>,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "Drug")]
    pub drug: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "MRP", with = "rust_decimal::serde::float")]
    pub mrp: Decimal,
    #[serde(rename = "SalePrice", with = "rust_decimal::serde::float")]
    pub sale_price: Decimal,
    #[serde(rename = "Batch")]
    pub batch: String,
    #[serde(rename = "ExpiryDate")]
    pub expiry_date: String,
}

impl BillLine {
    fn from_line(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.name.clone(),
            drug: line.drug.clone(),
            quantity: line.quantity,
            mrp: line.mrp,
            sale_price: line.sale_price,
            batch: line.batch.clone(),
            expiry_date: line.expiry_date.clone(),
        }
    }
}

/// The finalized payload recording a completed sale.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BillSubmission {
    pub items: Vec<BillLine>,
    pub total_items: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Capture-time, ISO-8601.
    pub billed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_mobile: Option<String>,
}

impl BillSubmission {
    /// Assembles the payload from the current cart state. Pure: performs no
    /// I/O; transmission belongs to the billing gateway.
    pub fn assemble(cart: &Cart, context: &BillingContext, billed_at: DateTime<Utc>) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.iter().map(BillLine::from_line).collect(),
            total_items: totals.total_items,
            total_amount: totals.total_amount,
            billed_at,
            location_id: context.location.as_ref().map(|location| location.id),
            doctor_name: context.doctor.as_ref().map(|doctor| doctor.name.clone()),
            patient_id: context.patient.as_ref().map(|patient| patient.id),
            patient_name: context.patient.as_ref().map(|patient| patient.name.clone()),
            patient_mobile: context
                .patient
                .as_ref()
                .and_then(|patient| patient.mobile.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::Product;
    use rust_decimal_macros::dec;

    fn cart_with_lines() -> Cart {
        let mut cart = Cart::new();
        let p = Product {
            id: Some(101),
            name: "Paracetamol 500mg".to_string(),
            drug: "Paracetamol".to_string(),
            mrp: dec!(7.00),
            unit_price: dec!(5.00),
            batch: "B1".to_string(),
            expiry: "2027-03-31T00:00:00.000Z".to_string(),
            qty_in_stock: Some(120),
        };
        cart.add_product(&p);
        cart.add_product(&p);
        cart
    }

    #[test]
    fn test_assemble_maps_lines_and_totals() {
        let cart = cart_with_lines();
        let bill = BillSubmission::assemble(&cart, &BillingContext::default(), Utc::now());

        assert_eq!(bill.items.len(), 1);
        assert_eq!(bill.items[0].product_id, Some(101));
        assert_eq!(bill.items[0].quantity, 2);
        assert_eq!(bill.items[0].mrp, dec!(7.00));
        assert_eq!(bill.items[0].expiry_date, "2027-03-31");
        assert_eq!(bill.total_items, 2);
        assert_eq!(bill.total_amount, dec!(10.00));
        assert_eq!(bill.location_id, None);
    }

    #[test]
    fn test_assemble_attaches_context() {
        let cart = cart_with_lines();
        let context = BillingContext {
            location: Some(Location {
                id: 7,
                name: "OPD Counter".to_string(),
            }),
            doctor: Some(Doctor {
                id: 3,
                name: "Dr. Rao".to_string(),
            }),
            patient: Some(Patient {
                id: 42,
                name: "A. Kumar".to_string(),
                age: Some(34),
                gender: Some("M".to_string()),
                mobile: Some("9876543210".to_string()),
            }),
        };

        let bill = BillSubmission::assemble(&cart, &context, Utc::now());

        assert_eq!(bill.location_id, Some(7));
        assert_eq!(bill.doctor_name.as_deref(), Some("Dr. Rao"));
        assert_eq!(bill.patient_id, Some(42));
        assert_eq!(bill.patient_name.as_deref(), Some("A. Kumar"));
        assert_eq!(bill.patient_mobile.as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_wire_shape() {
        let cart = cart_with_lines();
        let bill = BillSubmission::assemble(&cart, &BillingContext::default(), Utc::now());
        let json = serde_json::to_value(&bill).unwrap();

        let item = &json["items"][0];
        assert_eq!(item["ProductID"], 101);
        assert_eq!(item["ProductName"], "Paracetamol 500mg");
        assert_eq!(item["Quantity"], 2);
        assert_eq!(item["MRP"], 7.0);
        assert_eq!(item["SalePrice"], 5.0);
        assert_eq!(item["Batch"], "B1");
        assert_eq!(item["ExpiryDate"], "2027-03-31");
        assert_eq!(json["totalItems"], 2);
        assert_eq!(json["totalAmount"], 10.0);
        assert!(json["billedAt"].is_string());
        // Absent context is omitted from the wire form, not sent as null.
        assert!(json.get("locationId").is_none());
        assert!(json.get("doctorName").is_none());
    }
}
