// Listing Lens - filtered and aggregated views over a flat file of property listings.
// This is the library root that exposes the public API

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod state;

// Re-export commonly used types for convenience
pub use app::router;
pub use data::loader::{FileSource, TableSource};
pub use data::model::{Listing, Table};
pub use error::QueryError;
pub use state::AppState;
