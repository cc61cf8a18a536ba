// src/services/miner.rs

//! Contact mining.
//!
//! Pure functions over rendered page content: no side effects, same input
//! always yields the same bundle. Extraction is regex-based and tolerant
//! of the usual obfuscation tricks.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{select_instagram, ContactBundle};

/// File suffixes that mark an email-shaped match as an asset path.
const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg"];

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b")
            .expect("email pattern")
    })
}

fn obfuscated_email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b([a-z0-9._%+-]+)\s*\[\s*at\s*\]\s*([a-z0-9.-]+)\s*\[\s*dot\s*\]\s*([a-z]{2,})\b",
        )
        .expect("obfuscated email pattern")
    })
}

fn facebook_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:https?://)?(?:www\.)?facebook\.com/[a-z0-9_.%/?=&#-]+")
            .expect("facebook pattern")
    })
}

fn instagram_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:https?://)?(?:www\.)?instagram\.com/[a-z0-9_.%/?=&#-]+")
            .expect("instagram pattern")
    })
}

/// Mine every contact channel from rendered page content.
pub fn mine(content: &str) -> ContactBundle {
    ContactBundle {
        emails: mine_emails(content),
        facebook: mine_facebook(content),
        instagram: mine_instagram(content),
    }
}

/// Extract emails: a plain pass and an obfuscated `[at]`/`[dot]` pass,
/// unioned under case-insensitive dedup.
fn mine_emails(content: &str) -> BTreeSet<String> {
    let mut emails = BTreeSet::new();

    for m in email_re().find_iter(content) {
        if let Some(email) = filter_email(m.as_str()) {
            emails.insert(email);
        }
    }

    for caps in obfuscated_email_re().captures_iter(content) {
        let candidate = format!("{}@{}.{}", &caps[1], &caps[2], &caps[3]);
        if let Some(email) = filter_email(&candidate) {
            emails.insert(email);
        }
    }

    emails
}

/// Drop email-shaped false positives. Lowercases the survivors.
fn filter_email(candidate: &str) -> Option<String> {
    let email = candidate.to_lowercase();

    if IMAGE_SUFFIXES.iter().any(|suffix| email.ends_with(suffix)) {
        return None;
    }
    if email.contains("example") || email.contains("test@") {
        return None;
    }

    let domain = email.split('@').nth(1)?;
    if !domain.contains('.') {
        return None;
    }

    Some(email)
}

/// Extract Facebook profile links, excluding navigation chrome.
fn mine_facebook(content: &str) -> BTreeSet<String> {
    facebook_re()
        .find_iter(content)
        .filter_map(|m| normalize_social(m.as_str(), "facebook.com"))
        .filter(|link| {
            let lower = link.to_lowercase();
            !lower.contains("/login") && !lower.contains("/share")
        })
        .collect()
}

/// Extract Instagram links with the profile-root preference applied.
fn mine_instagram(content: &str) -> BTreeSet<String> {
    let mut raw: Vec<String> = Vec::new();
    for m in instagram_re().find_iter(content) {
        if let Some(link) = normalize_social(m.as_str(), "instagram.com") {
            if !raw.contains(&link) {
                raw.push(link);
            }
        }
    }
    select_instagram(raw)
}

/// Normalize a matched social link to `https://<host>/<path>`.
///
/// Strips scheme and `www.` variants so the same profile never appears
/// twice, and trims trailing sentence punctuation the pattern may have
/// swallowed.
fn normalize_social(raw: &str, host: &str) -> Option<String> {
    let trimmed = raw.trim_end_matches(['.', ',', ';', ':', ')', '\'', '"', '/']);
    let idx = trimmed.to_lowercase().find(host)?;
    let path = trimmed[idx + host.len()..].trim_start_matches('/');

    if path.is_empty() {
        return None;
    }
    Some(format!("https://{}/{}", host, path))
}
