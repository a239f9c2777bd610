//! File-backed persistence for the site assistant
//!
//! Provides storage for:
//! - Site records (`<sites_dir>/<siteId>.json`)
//! - Trained model artifacts (`<models_dir>/<siteId>.nlp.json`)
//!
//! Every write goes to a temp file in the target directory and is then
//! renamed over the final path, so readers never observe a partial file.

pub mod atomic;
pub mod error;
pub mod models;
pub mod sites;

pub use error::PersistenceError;
pub use models::ModelStore;
pub use sites::{FileSiteStore, SiteStore};
