pub mod lib_download;
pub mod lib_duckdb;
