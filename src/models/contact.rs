// src/models/contact.rs

//! Contact channels mined from one or more pages.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Deduplicated contact channels for one website.
///
/// Invariant: if `instagram` is non-empty it contains only profile-root
/// links, unless no profile-root link exists at all — then it holds exactly
/// one post/reel/story link as a fallback signal.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContactBundle {
    /// Email addresses, lowercased
    pub emails: BTreeSet<String>,

    /// Facebook profile links
    pub facebook: BTreeSet<String>,

    /// Instagram links, profile roots preferred
    pub instagram: BTreeSet<String>,
}

impl ContactBundle {
    /// True when no channel holds anything.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.facebook.is_empty() && self.instagram.is_empty()
    }

    /// True when every channel holds at least one entry.
    ///
    /// Quantity-only: a single stray link satisfies its channel. Further
    /// mining stops here as a politeness optimization, not a quality check.
    pub fn is_sufficient(&self) -> bool {
        !self.emails.is_empty() && !self.facebook.is_empty() && !self.instagram.is_empty()
    }

    /// Union another bundle into this one.
    ///
    /// Emails and Facebook merge as plain set unions. Instagram re-derives
    /// the profile-root subset after the union, so a fallback post link is
    /// dropped once any page contributes a real profile link.
    pub fn merge(&mut self, other: ContactBundle) {
        self.emails.extend(other.emails);
        self.facebook.extend(other.facebook);

        let mut raw: Vec<String> = self.instagram.iter().cloned().collect();
        for link in other.instagram {
            if !raw.contains(&link) {
                raw.push(link);
            }
        }
        self.instagram = select_instagram(raw);
    }
}

/// True for an Instagram link pointing at an account page rather than a
/// specific post, reel, clip or story.
pub fn is_profile_root(link: &str) -> bool {
    !["/p/", "/reel/", "/tv/", "/stories/"]
        .iter()
        .any(|marker| link.contains(marker))
}

/// Apply the profile-root preference to an ordered list of raw links.
///
/// Keeps all profile-root links; if none exist, keeps exactly the first
/// raw link so some contact signal survives.
pub fn select_instagram(raw: Vec<String>) -> BTreeSet<String> {
    let profiles: BTreeSet<String> = raw
        .iter()
        .filter(|link| is_profile_root(link))
        .cloned()
        .collect();

    if profiles.is_empty() {
        raw.into_iter().take(1).collect()
    } else {
        profiles
    }
}
