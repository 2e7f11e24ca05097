pub mod nyc;
pub mod prod_db;
