// src/models/record.rs

//! Exported lead record.

use serde::{Deserialize, Serialize};

use super::ListingDetail;

/// Delimiter for multi-valued export fields.
const FIELD_JOIN: &str = ", ";

/// Terminal, exported unit: listing detail flattened with its contact
/// bundle. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeadRecord {
    pub business_name: String,
    pub phone: String,
    pub website: String,
    pub rating: String,
    pub reviews: String,
    pub emails: String,
    pub facebook: String,
    pub instagram: String,
    pub maps_link: String,
}

impl LeadRecord {
    /// Export column headers, in row order.
    pub const HEADERS: [&'static str; 9] = [
        "Business Name",
        "Phone",
        "Website",
        "Rating",
        "Reviews",
        "Emails",
        "Facebook",
        "Instagram",
        "Maps Link",
    ];

    /// Flatten a listing detail into an export row.
    pub fn from_detail(detail: &ListingDetail) -> Self {
        let join = |set: &std::collections::BTreeSet<String>| {
            set.iter().cloned().collect::<Vec<_>>().join(FIELD_JOIN)
        };

        Self {
            business_name: detail.name.clone(),
            phone: detail.phone.clone(),
            website: detail.website.clone(),
            rating: detail.rating.clone(),
            reviews: detail.review_count.clone(),
            emails: join(&detail.contacts.emails),
            facebook: join(&detail.contacts.facebook),
            instagram: join(&detail.contacts.instagram),
            maps_link: detail.maps_link.clone(),
        }
    }

    /// Field values in header order.
    pub fn row(&self) -> [&str; 9] {
        [
            &self.business_name,
            &self.phone,
            &self.website,
            &self.rating,
            &self.reviews,
            &self.emails,
            &self.facebook,
            &self.instagram,
            &self.maps_link,
        ]
    }
}
