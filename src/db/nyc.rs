pub mod tlc_trips_archive;
pub mod trip_category;
