mod common;

use common::product;
use pharmapos::application::session::{BillingSession, SessionPhase, SessionPorts};
use pharmapos::domain::bill::{Doctor, Location, Patient};
use pharmapos::error::BillingError;
use pharmapos::infrastructure::in_memory::{InMemoryCatalog, RecordingGateway, StaticDirectory};
use std::sync::Arc;

fn location(id: u32, name: &str) -> Location {
    Location {
        id,
        name: name.to_string(),
    }
}

fn session_over(
    catalog: InMemoryCatalog,
    gateway: RecordingGateway,
    directory: StaticDirectory,
) -> BillingSession {
    BillingSession::new(SessionPorts {
        catalog: Arc::new(catalog),
        gateway: Box::new(gateway),
        patients: Box::new(directory.clone()),
        doctors: Box::new(directory.clone()),
        locations: Box::new(directory),
    })
}

#[tokio::test]
async fn test_full_billing_flow() {
    let gateway = RecordingGateway::new();
    let mut session = session_over(
        InMemoryCatalog::new(),
        gateway.clone(),
        StaticDirectory::default(),
    );
    assert_eq!(session.phase(), SessionPhase::Idle);

    session.add_to_cart(&product(101, "Paracetamol", "B1", "5.00"));
    session.add_to_cart(&product(101, "Paracetamol", "B1", "5.00"));
    session.add_to_cart(&product(202, "Ibuprofen", "C7", "9.75"));
    assert_eq!(session.phase(), SessionPhase::Building);
    assert_eq!(session.totals().total_items, 3);

    let totals = session.begin_confirmation().unwrap();
    assert_eq!(totals.total_items, 3);
    assert_eq!(session.phase(), SessionPhase::Confirming);

    let payload = session.submit().await.unwrap();
    assert_eq!(payload.items.len(), 2);
    assert_eq!(payload.total_items, 3);
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(session.cart().is_empty());

    let accepted = gateway.accepted().await;
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0], payload);
}

#[tokio::test]
async fn test_failed_submission_preserves_cart_for_retry() {
    let gateway = RecordingGateway::new();
    gateway.fail_with("backend unavailable").await;
    let mut session = session_over(
        InMemoryCatalog::new(),
        gateway.clone(),
        StaticDirectory::default(),
    );
    session.add_to_cart(&product(101, "Paracetamol", "B1", "5.00"));
    let before = session.cart().clone();

    session.begin_confirmation().unwrap();
    let result = session.submit().await;
    assert!(matches!(result, Err(BillingError::Submission(_))));
    assert_eq!(session.cart(), &before);
    assert_eq!(session.phase(), SessionPhase::Building);

    // The backend recovers; the retry goes through with the same cart.
    gateway.accept().await;
    session.begin_confirmation().unwrap();
    let payload = session.submit().await.unwrap();
    assert_eq!(payload.total_items, 1);
    assert!(session.cart().is_empty());
}

#[tokio::test]
async fn test_confirmation_can_be_cancelled_without_side_effects() {
    let mut session = session_over(
        InMemoryCatalog::new(),
        RecordingGateway::new(),
        StaticDirectory::default(),
    );
    session.add_to_cart(&product(101, "Paracetamol", "B1", "5.00"));
    let before = session.cart().clone();

    session.begin_confirmation().unwrap();
    session.cancel_confirmation();

    assert_eq!(session.phase(), SessionPhase::Building);
    assert_eq!(session.cart(), &before);
}

#[tokio::test]
async fn test_begin_confirmation_refuses_an_empty_cart() {
    let mut session = session_over(
        InMemoryCatalog::new(),
        RecordingGateway::new(),
        StaticDirectory::default(),
    );

    let result = session.begin_confirmation();
    assert!(matches!(result, Err(BillingError::Validation(_))));
}

#[tokio::test]
async fn test_location_scoped_search_is_refused_unscoped() {
    let catalog = InMemoryCatalog::with_products(vec![product(101, "Paracetamol", "B1", "5.00")]);
    let directory = StaticDirectory {
        locations: vec![location(7, "OPD Counter"), location(8, "Ward Pharmacy")],
        ..StaticDirectory::default()
    };
    let mut session =
        session_over(catalog, RecordingGateway::new(), directory).require_location();

    let result = session.search("paracetamol").await;
    assert!(matches!(result, Err(BillingError::Validation(_))));

    session.select_location(location(7, "OPD Counter")).unwrap();
    let hits = session.search("paracetamol").await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_single_location_auto_selects() {
    let directory = StaticDirectory {
        locations: vec![location(7, "OPD Counter")],
        ..StaticDirectory::default()
    };
    let mut session = session_over(InMemoryCatalog::new(), RecordingGateway::new(), directory);

    let listed = session.load_locations().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(session.context().location.as_ref().unwrap().id, 7);
}

#[tokio::test]
async fn test_empty_location_directory_is_a_lookup_error() {
    let mut session = session_over(
        InMemoryCatalog::new(),
        RecordingGateway::new(),
        StaticDirectory::default(),
    );

    let result = session.load_locations().await;
    assert!(matches!(
        result,
        Err(BillingError::Lookup {
            entity: "location",
            ..
        })
    ));
    assert!(session.context().location.is_none());
}

#[tokio::test]
async fn test_location_change_with_lines_needs_confirmation() {
    let directory = StaticDirectory {
        locations: vec![location(7, "OPD Counter"), location(8, "Ward Pharmacy")],
        ..StaticDirectory::default()
    };
    let mut session = session_over(InMemoryCatalog::new(), RecordingGateway::new(), directory);
    session.select_location(location(7, "OPD Counter")).unwrap();
    session.add_to_cart(&product(101, "Paracetamol", "B1", "5.00"));

    let refused = session.select_location(location(8, "Ward Pharmacy"));
    assert!(matches!(refused, Err(BillingError::Validation(_))));
    assert_eq!(session.context().location.as_ref().unwrap().id, 7);
    assert_eq!(session.cart().len(), 1);

    session.confirm_location_change(location(8, "Ward Pharmacy"));
    assert_eq!(session.context().location.as_ref().unwrap().id, 8);
    assert!(session.cart().is_empty());
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn test_doctor_and_patient_context_rides_the_payload() {
    let directory = StaticDirectory {
        doctors: vec![Doctor {
            id: 3,
            name: "Dr. Rao".to_string(),
        }],
        patients: vec![Patient {
            id: 42,
            name: "A. Kumar".to_string(),
            age: Some(34),
            gender: Some("M".to_string()),
            mobile: Some("9876543210".to_string()),
        }],
        ..StaticDirectory::default()
    };
    let mut session = session_over(InMemoryCatalog::new(), RecordingGateway::new(), directory);

    // Single-entry directories auto-select.
    session.load_doctors().await.unwrap();
    session.load_patients().await.unwrap();
    session.add_to_cart(&product(101, "Paracetamol", "B1", "5.00"));
    session.begin_confirmation().unwrap();

    let payload = session.submit().await.unwrap();
    assert_eq!(payload.doctor_name.as_deref(), Some("Dr. Rao"));
    assert_eq!(payload.patient_id, Some(42));
    assert_eq!(payload.patient_mobile.as_deref(), Some("9876543210"));
}

#[tokio::test]
async fn test_removing_the_last_line_returns_to_idle() {
    let mut session = session_over(
        InMemoryCatalog::new(),
        RecordingGateway::new(),
        StaticDirectory::default(),
    );
    let key = session
        .add_to_cart(&product(101, "Paracetamol", "B1", "5.00"))
        .key
        .clone();

    session.remove_line(&key);

    assert!(session.cart().is_empty());
    assert_eq!(session.phase(), SessionPhase::Idle);
}
