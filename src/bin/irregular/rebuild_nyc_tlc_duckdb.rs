use std::{error::Error, path::PathBuf};

use clap::Parser;
use log::{info, warn};
use tlc_trips::db::{nyc::trip_category::TripCategory, prod_db::ProdDb};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// Only rebuild this table, one of yellow, green, fhv, fhvhv
    #[arg(short, long)]
    category: Option<String>,
}

/// Rebuild the DuckDB tables from the parquet files already on disk.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();
    let env_file = PathBuf::from(format!(".env/{}.env", args.env));
    if let Err(e) = dotenvy::from_path(&env_file) {
        warn!("Could not load {}: {}", env_file.display(), e);
    }

    let archive = ProdDb::nyc_tlc_trips();
    match args.category {
        Some(category) => {
            let category = category.parse::<TripCategory>()?;
            let n = archive.rebuild_table(category)?;
            info!("rebuilt {} with {} rows", category.table_name(), n);
        }
        None => archive.update_duckdb()?,
    }
    info!("done");
    Ok(())
}
