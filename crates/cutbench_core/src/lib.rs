pub mod editing;
pub mod error;
pub mod geometry;
pub mod history;
pub mod placement;
pub mod policy;
pub mod timeline;
pub mod types;
