use std::{error::Error, path::PathBuf};

use clap::Parser;
use jiff::civil::Date;
use log::{info, warn};
use tlc_trips::{
    db::{nyc::tlc_trips_archive::NycTlcTripsArchive, prod_db::ProdDb},
    utils::lib_download::HttpDownloader,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Download the latest NYC TLC trip record files and rebuild the DuckDB tables."
)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// How many published months to look back
    #[arg(short, long, default_value_t = 3)]
    months: usize,

    /// Pretend today is this date, e.g. 2025-06-15
    #[arg(long)]
    as_of: Option<Date>,

    /// Overrides NYC_TLC_DATA_DIR.  The database goes in this directory too,
    /// unless --duckdb-path is given
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Overrides NYC_TLC_DUCKDB_PATH
    #[arg(long)]
    duckdb_path: Option<PathBuf>,

    /// Only download the files, don't touch DuckDB
    #[arg(long, default_value_t = false)]
    skip_load: bool,
}

/// Run this job once a month, the TLC publishes with a 3 month delay
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();
    let env_file = PathBuf::from(format!(".env/{}.env", args.env));
    if let Err(e) = dotenvy::from_path(&env_file) {
        warn!("Could not load {}: {}", env_file.display(), e);
    }

    let mut archive = match args.data_dir {
        Some(data_dir) => NycTlcTripsArchive::in_dir(data_dir),
        None => ProdDb::nyc_tlc_trips(),
    };
    if let Some(duckdb_path) = args.duckdb_path {
        archive.duckdb_path = duckdb_path;
    }

    let downloader = HttpDownloader::new()?;
    let downloads = match args.as_of {
        Some(today) => archive.download_last_n_months_as_of(&downloader, today, args.months),
        None => archive.download_last_n_months(&downloader, args.months),
    };
    for (i, res) in downloads.enumerate() {
        let month = res?;
        info!("Downloaded month {} ({}/{})", month, i + 1, args.months);
    }

    if args.skip_load {
        return Ok(());
    }
    archive.update_duckdb()?;
    info!("Updated {} successfully", archive.duckdb_path.display());

    Ok(())
}
