// src/models/listing.rs

//! Listing identity and per-listing detail data.

use serde::{Deserialize, Serialize};

use super::ContactBundle;

/// Minimal identity for one discovered business, before enrichment.
///
/// Identity is the detail link; duplicate feed DOM nodes share a link and
/// are collapsed before emission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingStub {
    /// Display name as shown in the feed
    pub display_name: String,

    /// Full URL to the listing's detail page
    pub detail_link: String,
}

/// Extracted detail for one listing.
///
/// Absence of a field is an empty string, never an inference; partial data
/// is preferred over dropping the listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListingDetail {
    /// Business name
    pub name: String,

    /// Link back to the listing detail page
    pub maps_link: String,

    /// Normalized phone number, empty if not found
    pub phone: String,

    /// Website URL, empty if the listing has none
    pub website: String,

    /// Rating label, e.g. "4.6", empty if not found
    pub rating: String,

    /// Review count label with grouping separators, e.g. "1,234"
    pub review_count: String,

    /// Contact channels mined from the website
    pub contacts: ContactBundle,
}

impl ListingDetail {
    /// Start a detail record from a stub, all extracted fields empty.
    pub fn from_stub(stub: &ListingStub) -> Self {
        Self {
            name: stub.display_name.clone(),
            maps_link: stub.detail_link.clone(),
            ..Self::default()
        }
    }
}
