// src/models/mod.rs

//! Domain models for the lead pipeline.

mod contact;
mod listing;
mod record;

pub use contact::{is_profile_root, select_instagram, ContactBundle};
pub use listing::{ListingDetail, ListingStub};
pub use record::LeadRecord;
