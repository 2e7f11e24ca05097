use std::env;
use std::path::PathBuf;

use crate::db::nyc::tlc_trips_archive::NycTlcTripsArchive;

pub struct ProdDb {}

impl ProdDb {
    /// Locations come from the `NYC_TLC_DATA_DIR` and `NYC_TLC_DUCKDB_PATH`
    /// environment variables, usually set in the `.env/<env>.env` file.
    pub fn nyc_tlc_trips() -> NycTlcTripsArchive {
        let base_dir = env::var("NYC_TLC_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let mut archive = NycTlcTripsArchive::in_dir(base_dir);
        if let Ok(path) = env::var("NYC_TLC_DUCKDB_PATH") {
            archive.duckdb_path = PathBuf::from(path);
        }
        archive
    }
}
