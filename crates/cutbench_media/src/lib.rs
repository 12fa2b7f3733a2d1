pub mod assist;
pub mod data_uri;
pub mod error;
pub mod ingest;
pub mod library;
