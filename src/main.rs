use clap::Parser;
use miette::{IntoDiagnostic, Result};
use pharmapos::application::session::{BillingSession, SessionPorts};
use pharmapos::domain::bill::Location;
use pharmapos::infrastructure::in_memory::{InMemoryCatalog, RecordingGateway, StaticDirectory};
use pharmapos::interfaces::csv::catalog_reader::CatalogReader;
use pharmapos::interfaces::csv::op_reader::{OpKind, OpReader, SessionOp};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Replays a recorded billing session against a product catalog and prints
/// each submitted bill payload as JSON.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Product catalog CSV file
    catalog: PathBuf,

    /// Recorded session operations CSV file
    ops: PathBuf,

    /// Location to scope the session to. When set, searches are refused
    /// until the location is applied.
    #[arg(long)]
    location: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file = File::open(&cli.catalog).into_diagnostic()?;
    let mut products = Vec::new();
    for result in CatalogReader::new(file).products() {
        match result {
            Ok(product) => products.push(product),
            Err(e) => eprintln!("Error reading catalog row: {e}"),
        }
    }
    tracing::info!(products = products.len(), "catalog loaded");

    let directory = StaticDirectory {
        locations: cli
            .location
            .iter()
            .map(|&id| Location {
                id,
                name: format!("Location {id}"),
            })
            .collect(),
        ..StaticDirectory::default()
    };
    let ports = SessionPorts {
        catalog: Arc::new(InMemoryCatalog::with_products(products)),
        gateway: Box::new(RecordingGateway::new()),
        patients: Box::new(directory.clone()),
        doctors: Box::new(directory.clone()),
        locations: Box::new(directory),
    };

    let mut session = if cli.location.is_some() {
        let mut session = BillingSession::new(ports).require_location();
        // A single-entry directory auto-selects.
        session.load_locations().await.into_diagnostic()?;
        session
    } else {
        BillingSession::new(ports)
    };

    let file = File::open(&cli.ops).into_diagnostic()?;
    for op_result in OpReader::new(file).ops() {
        match op_result {
            Ok(op) => {
                if let Err(e) = apply_op(&mut session, &op).await {
                    eprintln!("Error applying operation: {e}");
                }
            }
            Err(e) => eprintln!("Error reading operation: {e}"),
        }
    }

    Ok(())
}

async fn apply_op(session: &mut BillingSession, op: &SessionOp) -> pharmapos::error::Result<()> {
    match op.op {
        OpKind::Scan => {
            let hits = session.search(&op.name).await?;
            match hits.first() {
                Some(product) => {
                    let product = product.clone();
                    session.add_to_cart(&product);
                }
                None => eprintln!("No catalog match for '{}'", op.name),
            }
        }
        OpKind::Qty => {
            if let Some(key) = session.cart().line_matching(&op.name, &op.batch) {
                session.update_quantity(&key, op.value.parse().unwrap_or(0));
            }
        }
        OpKind::Price => {
            if let Some(key) = session.cart().line_matching(&op.name, &op.batch) {
                session.update_sale_price(&key, &op.value);
            }
        }
        OpKind::Rebatch => {
            if let Some(key) = session.cart().line_matching(&op.name, &op.batch) {
                session.update_batch(&key, &op.value);
            }
        }
        OpKind::Expiry => {
            if let Some(key) = session.cart().line_matching(&op.name, &op.batch) {
                session.update_expiry(&key, &op.value);
            }
        }
        OpKind::Remove => {
            if let Some(key) = session.cart().line_matching(&op.name, &op.batch) {
                session.remove_line(&key);
            }
        }
        OpKind::Submit => {
            session.begin_confirmation()?;
            let payload = session.submit().await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}
