use jiff::civil::Date;
use jiff::Zoned;
use log::info;
use std::fs;
use std::iter::{successors, Successors, Take};
use std::path::{Path, PathBuf};

use crate::db::nyc::trip_category::TripCategory;
use crate::error::TripDataError;
use crate::interval::month::Month;
use crate::utils::lib_download::{download_file, Downloader};
use crate::utils::lib_duckdb::{count_rows, quote_literal, with_connection};

/// The TLC publishes the trip data with a delay of 3 months.
pub const PUBLICATION_DELAY_MONTHS: i32 = 3;

pub const DUCKDB_FILENAME: &str = "nyc_taxi_data.duckdb";

const BASE_URL: &str = "https://d37ci6vzurychx.cloudfront.net/trip-data";

/// Months walking back in time, see [`NycTlcTripsArchive::target_months`].
pub type TargetMonths = Take<Successors<Month, fn(&Month) -> Option<Month>>>;

/// The month before, or `None` at the start of the calendar.
fn earlier(month: &Month) -> Option<Month> {
    let previous = month.previous();
    (previous < *month).then_some(previous)
}

/// NYC Taxi & Limousine Commission trip records.
///
/// Raw files live in `base_dir/<category>/<YYYY-MM>.parquet`, one per
/// category and month.  Each category gets one table in the DuckDB file at
/// `duckdb_path`, rebuilt from scratch from all the raw files on every update.
///
/// See <https://www.nyc.gov/site/tlc/about/tlc-trip-record-data.page>
#[derive(Clone, Debug)]
pub struct NycTlcTripsArchive {
    pub base_dir: PathBuf,
    pub duckdb_path: PathBuf,
}

impl NycTlcTripsArchive {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(base_dir: P, duckdb_path: Q) -> Self {
        NycTlcTripsArchive {
            base_dir: base_dir.into(),
            duckdb_path: duckdb_path.into(),
        }
    }

    /// Keep the DuckDB file next to the raw data.
    pub fn in_dir<P: Into<PathBuf>>(base_dir: P) -> Self {
        let base_dir = base_dir.into();
        let duckdb_path = base_dir.join(DUCKDB_FILENAME);
        NycTlcTripsArchive {
            base_dir,
            duckdb_path,
        }
    }

    pub fn category_dir(&self, category: TripCategory) -> PathBuf {
        self.base_dir.join(category.slug())
    }

    /// Return the parquet filename for the month.  Does not check if the file exists.
    pub fn filename(&self, category: TripCategory, month: &Month) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}.parquet", month))
    }

    pub fn url(category: TripCategory, month: &Month) -> String {
        format!(
            "{}/{}_tripdata_{}.parquet",
            BASE_URL,
            category.slug(),
            month
        )
    }

    /// The most recent month the TLC should have published as of `today`.
    pub fn latest_published_month(today: Date) -> Month {
        Month::containing(today).minus(PUBLICATION_DELAY_MONTHS)
    }

    /// The `n` months to download as of `today`, most recent first.
    /// Stops early if the calendar runs out.
    pub fn target_months(today: Date, n: usize) -> TargetMonths {
        successors(
            Some(Self::latest_published_month(today)),
            earlier as fn(&Month) -> Option<Month>,
        )
        .take(n)
    }

    /// Download the file for this category and month unless it is already on disk.
    /// Return `true` if a download happened.
    pub fn download_missing_file(
        &self,
        downloader: &dyn Downloader,
        category: TripCategory,
        month: &Month,
    ) -> Result<bool, TripDataError> {
        let path = self.filename(category, month);
        if path.exists() {
            info!("{} already exists. Skipping download.", path.display());
            return Ok(false);
        }
        let url = Self::url(category, month);
        info!("Downloading {} to {} ...", url, path.display());
        let n = download_file(downloader, &url, &path)?;
        info!("  wrote {} bytes", n);
        Ok(true)
    }

    /// Download the last `n` published months for all categories, skipping
    /// the files that already exist.  The returned iterator does the work
    /// lazily and yields once per month, so the caller can report progress.
    pub fn download_last_n_months<'a>(
        &'a self,
        downloader: &'a dyn Downloader,
        n: usize,
    ) -> MonthlyDownloads<'a> {
        self.download_last_n_months_as_of(downloader, Zoned::now().date(), n)
    }

    pub fn download_last_n_months_as_of<'a>(
        &'a self,
        downloader: &'a dyn Downloader,
        today: Date,
        n: usize,
    ) -> MonthlyDownloads<'a> {
        MonthlyDownloads {
            archive: self,
            downloader,
            months: Self::target_months(today, n),
            failed: false,
        }
    }

    /// Drop and recreate the table for this category from all the parquet
    /// files in its directory.  Return the number of rows in the new table.
    ///
    /// Fails without touching the database if the directory doesn't exist or
    /// has no parquet files.
    pub fn rebuild_table(&self, category: TripCategory) -> Result<u64, TripDataError> {
        let dir = self.category_dir(category);
        if !dir.is_dir() {
            return Err(TripDataError::MissingDirectory(dir));
        }
        let files = parquet_files(&dir)?;
        if files.is_empty() {
            return Err(TripDataError::NoParquetFiles(dir));
        }

        // list the files explicitly, DuckDB would treat [ ] ? * in the path as a glob
        let table = category.table_name();
        let list = files
            .iter()
            .map(|e| quote_literal(&e.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
DROP TABLE IF EXISTS {table};
CREATE TABLE {table} AS SELECT * FROM read_parquet([{list}]);
"#
        );
        info!(
            "rebuilding table {} from {} files in {} ...",
            table,
            files.len(),
            dir.display()
        );
        let n = with_connection(&self.duckdb_path, |conn| {
            let tx = conn.transaction()?;
            tx.execute_batch(&sql)?;
            tx.commit()?;
            Ok(count_rows(conn, table)?)
        })?;
        info!("  table {} has {} rows", table, n);
        Ok(n)
    }

    /// Rebuild the tables for all categories, one after the other.
    pub fn update_duckdb(&self) -> Result<(), TripDataError> {
        for category in TripCategory::ALL {
            self.rebuild_table(category)?;
        }
        Ok(())
    }
}

/// All the `*.parquet` files in the directory, sorted by name.
fn parquet_files(dir: &Path) -> Result<Vec<PathBuf>, TripDataError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "parquet") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Yields the month after all its categories have been downloaded (or
/// skipped).  Stops after the first error.
pub struct MonthlyDownloads<'a> {
    archive: &'a NycTlcTripsArchive,
    downloader: &'a dyn Downloader,
    months: TargetMonths,
    failed: bool,
}

impl Iterator for MonthlyDownloads<'_> {
    type Item = Result<Month, TripDataError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let month = self.months.next()?;
        for category in TripCategory::ALL {
            if let Err(e) = self
                .archive
                .download_missing_file(self.downloader, category, &month)
            {
                self.failed = true;
                return Some(Err(e));
            }
        }
        Some(Ok(month))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, self.months.size_hint().1)
        }
    }
}
