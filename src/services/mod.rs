// src/services/mod.rs

//! Service layer for the lead pipeline.
//!
//! - Listing discovery over the results feed (`ListingDiscovery`)
//! - Per-listing detail extraction (`DetailExtractor`)
//! - Website enrichment orchestration (`EnrichmentOrchestrator`)
//! - Internal page discovery (`pages`)
//! - Contact mining (`miner`)

mod details;
mod discovery;
mod enrichment;
pub mod miner;
pub mod pages;

pub use details::DetailExtractor;
pub use discovery::ListingDiscovery;
pub use enrichment::EnrichmentOrchestrator;
