//! Site assistant orchestration
//!
//! Features:
//! - [`QueryResolver`]: cached per-site inference with knowledge base enrichment
//! - [`SiteAssistant`]: store-then-train flow, resolution and site lookup behind one handle

pub mod assistant;
pub mod resolver;

pub use assistant::SiteAssistant;
pub use resolver::QueryResolver;
