//! # Catalog Seeder
//!
//! Creates (or migrates) a database file and installs a pack catalog.
//!
//! ## Usage
//! ```bash
//! # Install the default catalog (250,500,1000,2000,5000) if the table is empty
//! cargo run -p packcalc-db --bin seed
//!
//! # Replace whatever is there
//! cargo run -p packcalc-db --bin seed -- --packs 23,31,53 --force
//!
//! # Specify database path
//! cargo run -p packcalc-db --bin seed -- --db ./data/packcalc.db
//! ```

use std::env;

use packcalc_core::DEFAULT_PACK_SIZES;
use packcalc_db::{CalculationLog, CatalogStore, DbConfig, SqliteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./packcalc_dev.db");
    let mut packs: Vec<i64> = DEFAULT_PACK_SIZES.to_vec();
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--packs" | "-p" => {
                if i + 1 < args.len() {
                    packs = parse_packs(&args[i + 1])?;
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("Packcalc Catalog Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: ./packcalc_dev.db)");
                println!("  -p, --packs <LIST>    Comma-separated pack sizes (default: 250,500,1000,2000,5000)");
                println!("  -f, --force           Replace an existing catalog");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("🌱 Packcalc Catalog Seeder");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Packs:    {:?}", packs);
    println!();

    let store = SqliteStore::connect(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = store.read_catalog().await?;
    if !existing.is_empty() && !force {
        println!("⚠ Catalog already has sizes {:?}", existing);
        println!("  Pass --force to replace it.");
        return Ok(());
    }

    let stored = store.replace_catalog(&packs).await?;
    println!("✓ Installed catalog {:?}", stored);
    println!("  Calculations on record: {}", store.count().await?);

    store.database().close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Parses `"250, 500,1000"` into sizes. Validation happens in the store.
fn parse_packs(list: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
    list.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}
