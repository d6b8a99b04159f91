//! Tonggwan Catalog - Category profiles
//!
//! Per-category customs metadata: duty rate, list-clearance
//! eligibility, surcharge rate, and the risk floor.

pub mod profile;
pub mod store;

pub use profile::CategoryProfile;
pub use store::{CatalogError, CatalogResult, CategoryStore};
