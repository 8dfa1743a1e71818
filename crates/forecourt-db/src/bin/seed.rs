//! # Seed Data Generator
//!
//! Populates a development database with a working forecourt: pumps,
//! nozzles, current fuel prices, credit accounts and a morning's sales.
//!
//! ## Usage
//! ```bash
//! # Seed ./forecourt_dev.db (default)
//! cargo run -p forecourt-db --bin seed
//!
//! # Specify database path and station id
//! cargo run -p forecourt-db --bin seed -- --db ./data/station.db --station stn-lahore-02
//! ```
//!
//! ## Generated Data
//! - 2 pumps with petrol + diesel nozzles, totalizers mid-life
//! - Open price rows for all four fuels
//! - 3 credit accounts with varied limits
//! - A dozen posted sales across cash, credit, mixed and UPI tenders,
//!   one of them voided
//! - A part-payment against the busiest credit account
//! - A draft day-close with the card/UPI settlements filled in
//!
//! The day is left unfinalized so the close screen has something to do.

use std::env;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use forecourt_core::{
    CreditPolicy, ExternalTender, FuelType, Money, PaymentMethod, RequestContext, Role,
    SaleRequest, Volume,
};
use forecourt_db::{Database, DbConfig};

/// Credit accounts: name, phone, limit in paise (0 = unlimited).
const CREDITORS: &[(&str, &str, i64)] = &[
    ("Sharma Transport Co", "9812004455", 50_000_00),
    ("Karachi School Buses", "9330011876", 120_000_00),
    ("Mehul Farm Supply", "9877713320", 0),
];

/// Per-fuel open prices, in paise per litre.
const PRICES: &[(FuelType, i64)] = &[
    (FuelType::Petrol, 9477),
    (FuelType::Diesel, 8803),
    (FuelType::Premium, 9920),
    (FuelType::Cng, 7650),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./forecourt_dev.db");
    let mut station_id = String::from("stn-karachi-01");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--station" | "-s" => {
                if i + 1 < args.len() {
                    station_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Forecourt Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: ./forecourt_dev.db)");
                println!("  -s, --station <ID>    Station id (default: stn-karachi-01)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Forecourt Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Station:  {}", station_id);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // A seeded day on top of an already-seeded day would double the meters.
    let existing = db.fuel_prices().get_current(&station_id, FuelType::Petrol).await?;
    if existing.is_some() {
        println!("⚠ Station {} already has an open petrol price", station_id);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let attendant = RequestContext {
        tenant_id: "tenant-dev".to_string(),
        user_id: "attendant-asif".to_string(),
        role: Role::Attendant,
    };
    let manager = RequestContext {
        tenant_id: "tenant-dev".to_string(),
        user_id: "manager-rukhsana".to_string(),
        role: Role::Manager,
    };

    // Prices
    let price_start = chrono::Utc::now() - chrono::Duration::hours(8);
    for (fuel, paise) in PRICES {
        db.fuel_prices()
            .set_price(&station_id, *fuel, Money::from_paise(*paise), price_start)
            .await?;
    }
    println!("✓ Opened {} price rows", PRICES.len());

    // Pumps and nozzles, totalizers mid-life
    let mut nozzles = Vec::new();
    for (pump, fuel, initial_cl) in [
        ("pump-1", FuelType::Petrol, 1_250_000),
        ("pump-1", FuelType::Diesel, 2_104_300),
        ("pump-2", FuelType::Petrol, 987_550),
        ("pump-2", FuelType::Diesel, 1_477_020),
    ] {
        let nozzle = db
            .nozzles()
            .register(pump, fuel, Volume::from_centilitres(initial_cl))
            .await?;
        nozzles.push(nozzle);
    }
    println!("✓ Registered {} nozzles across 2 pumps", nozzles.len());

    // Credit accounts
    let creditor_service = db.creditor_service();
    let mut creditors = Vec::new();
    for (name, phone, limit) in CREDITORS {
        let creditor = creditor_service
            .register(&station_id, name, Some((*phone).to_string()), Money::from_paise(*limit))
            .await?;
        creditors.push(creditor);
    }
    println!("✓ Registered {} credit accounts", creditors.len());

    // A morning of sales: (nozzle index, litres dispensed in cl, tender)
    enum Tender {
        Cash,
        Credit(usize),
        Mixed(usize, i64),
        External(ExternalTender),
    }
    let pours: &[(usize, i64, Tender)] = &[
        (0, 3_550, Tender::Cash),
        (1, 12_000, Tender::Credit(0)),
        (2, 2_275, Tender::External(ExternalTender::Upi)),
        (0, 4_100, Tender::Mixed(1, 200_00)),
        (3, 8_840, Tender::Cash),
        (1, 6_500, Tender::Credit(0)),
        (2, 1_980, Tender::External(ExternalTender::Card)),
        (0, 2_760, Tender::Cash),
        (3, 15_300, Tender::Credit(2)),
        (2, 3_120, Tender::Cash),
        (1, 9_900, Tender::Cash),
        (0, 1_500, Tender::Cash),
    ];

    let sale_service = db.sale_service(CreditPolicy::Warn);
    let mut readings: Vec<i64> = nozzles.iter().map(|n| n.current_reading_cl).collect();
    let mut posted_ids = Vec::new();

    for (idx, delta_cl, tender) in pours {
        let nozzle = &nozzles[*idx];
        let price = PRICES
            .iter()
            .find(|(fuel, _)| *fuel == nozzle.fuel_type)
            .map(|(_, paise)| Money::from_paise(*paise))
            .unwrap_or_else(Money::zero);
        let amount = Volume::from_centilitres(*delta_cl).amount_at(price);
        readings[*idx] += delta_cl;

        let (cash, credit, party, external) = match tender {
            Tender::Cash => (amount, Money::zero(), None, None),
            Tender::Credit(c) => (Money::zero(), amount, Some(creditors[*c].id.clone()), None),
            Tender::Mixed(c, cash_paise) => {
                let cash = Money::from_paise(*cash_paise);
                (cash, amount - cash, Some(creditors[*c].id.clone()), None)
            }
            Tender::External(t) => (Money::zero(), Money::zero(), None, Some(*t)),
        };

        let posted = sale_service
            .create_sale(
                &attendant,
                SaleRequest {
                    station_id: station_id.clone(),
                    nozzle_id: nozzle.id.clone(),
                    cumulative_reading: Volume::from_centilitres(readings[*idx]),
                    explicit_volume: None,
                    cash_received: cash,
                    credit_given: credit,
                    credit_party_id: party,
                    external_tender: external,
                    notes: None,
                },
            )
            .await?;
        posted_ids.push(posted.sale.id);
    }
    println!("✓ Posted {} sales", posted_ids.len());

    // One void with meter rollback, as happens when a test pour gets rung up.
    if let Some(last) = posted_ids.last() {
        sale_service
            .void_sale(&manager, last, "test pour rung up by mistake", true)
            .await?;
        println!("✓ Voided 1 sale (test pour, meter rolled back)");
    }

    // Part-payment against the busiest account
    creditor_service
        .record_payment(
            &manager,
            &creditors[0].id,
            Money::from_paise(10_000_00),
            PaymentMethod::Cash,
            Some("RCPT-0071".to_string()),
            None,
        )
        .await?;
    println!("✓ Recorded a creditor payment");

    // Draft day-close with the external settlements declared
    let recon_service = db.reconciliation_service();
    let today = chrono::Utc::now().date_naive();
    let day_sales = db.sales().list_for_day(&station_id, today).await?;
    let (card, upi) = day_sales.iter().filter(|s| s.counts_in_totals()).fold(
        (Money::zero(), Money::zero()),
        |(card, upi), sale| match sale.payment_method {
            PaymentMethod::Card => (card + sale.amount(), upi),
            PaymentMethod::Upi => (card, upi + sale.amount()),
            _ => (card, upi),
        },
    );
    let draft = recon_service
        .save_draft(&manager, &station_id, today, card, upi, Some("seeded morning shift"))
        .await?;

    println!("✓ Saved draft day-close");
    println!();
    println!("Day so far:");
    println!("  Sales:  {} (1 voided)", day_sales.len());
    println!("  Total:  {}", draft.total_sales());
    println!("  Cash:   {}", draft.cash_total());
    println!("  Credit: {}", draft.credit_total());
    println!("  Card:   {}", draft.card_total());
    println!("  UPI:    {}", draft.upi_total());
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
