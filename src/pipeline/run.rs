// src/pipeline/run.rs

//! Full pipeline run.
//!
//! Strictly sequential: one listing at a time, one page at a time. The
//! pacing is deliberate — a single rendering session keeps the feed and
//! the mined websites from seeing concurrent bursts.

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::Result;
use crate::exports::ExportStore;
use crate::models::LeadRecord;
use crate::render::Renderer;
use crate::services::{DetailExtractor, EnrichmentOrchestrator, ListingDiscovery};

/// One pipeline run request.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub query: String,
    pub target_count: usize,
    pub visit_internal_pages: bool,
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub query: String,
    pub listing_count: usize,
    pub export_file: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Run the full pipeline for one request.
///
/// Fails only at job level (the feed session cannot be established or the
/// export cannot be written); listing- and page-level problems degrade to
/// empty fields on their own records.
pub async fn run_pipeline(
    config: &Config,
    renderer: &dyn Renderer,
    store: &ExportStore,
    request: &JobRequest,
) -> Result<RunSummary> {
    let started_at = Utc::now();
    let target = request
        .target_count
        .clamp(1, config.crawler.max_listings);

    log::info!(
        "Starting lead run: query={:?} target={}",
        request.query,
        target
    );

    let discovery = ListingDiscovery::new(&config.discovery, &config.selectors);
    let stubs = discovery.discover(renderer, &request.query, target).await?;
    log::info!("Discovered {} listings", stubs.len());

    let enricher = EnrichmentOrchestrator::new(&config.enrichment);
    let extractor = DetailExtractor::new(&config.selectors, &enricher);

    let mut records = Vec::with_capacity(stubs.len());
    for (index, stub) in stubs.iter().enumerate() {
        log::info!("[{}/{}] {}", index + 1, stubs.len(), stub.display_name);
        let detail = extractor
            .extract(renderer, stub, request.visit_internal_pages)
            .await;
        records.push(LeadRecord::from_detail(&detail));
    }

    let export_file = store.write_records(&request.query, &records).await?;
    log::info!("Exported {} records to {}", records.len(), export_file);

    Ok(RunSummary {
        query: request.query.clone(),
        listing_count: records.len(),
        export_file,
        started_at,
        finished_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fake::{FakePage, FakeRenderer};
    use crate::render::LinkTarget;
    use tempfile::TempDir;

    /// Config with millisecond pacing so tests stay fast.
    fn fast_config() -> Config {
        let mut config = Config::default();
        config.discovery.settle_short_ms = 1;
        config.discovery.settle_long_ms = 1;
        config.discovery.stall_grace_ms = 1;
        config
    }

    #[tokio::test]
    async fn test_two_listings_without_websites_export_two_rows() {
        let config = fast_config();
        let tmp = TempDir::new().unwrap();
        let store = ExportStore::new(tmp.path());

        let renderer = FakeRenderer::new();
        let discovery = ListingDiscovery::new(&config.discovery, &config.selectors);
        renderer.insert(
            discovery.feed_url("bakery"),
            FakePage {
                counts: vec![2],
                entries: vec![
                    LinkTarget {
                        text: "Corner Bakery".to_string(),
                        href: "https://maps.example.com/place/1".to_string(),
                    },
                    LinkTarget {
                        text: "Daily Bread".to_string(),
                        href: "https://maps.example.com/place/2".to_string(),
                    },
                ],
                ..FakePage::default()
            },
        );
        // detail pages render but expose no fields at all
        renderer.insert("https://maps.example.com/place/1", FakePage::default());
        renderer.insert("https://maps.example.com/place/2", FakePage::default());

        let request = JobRequest {
            query: "bakery".to_string(),
            target_count: 2,
            visit_internal_pages: true,
        };
        let summary = run_pipeline(&config, &renderer, &store, &request)
            .await
            .unwrap();

        assert_eq!(summary.listing_count, 2);

        let bytes = store.read(&summary.export_file).await.unwrap().unwrap();
        let content = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        for line in &lines[1..] {
            let fields: Vec<&str> = line.split(',').collect();
            // Business Name present, Website/Emails/Facebook/Instagram empty
            assert!(!fields[0].is_empty());
            assert_eq!(fields[2], "");
            assert_eq!(fields[5], "");
            assert_eq!(fields[6], "");
            assert_eq!(fields[7], "");
        }
        // only the feed and the two detail pages were rendered
        assert_eq!(renderer.open_count(), 3);
    }

    #[tokio::test]
    async fn test_failed_feed_session_produces_no_export() {
        let config = fast_config();
        let tmp = TempDir::new().unwrap();
        let store = ExportStore::new(tmp.path());

        let renderer = FakeRenderer::new();
        let discovery = ListingDiscovery::new(&config.discovery, &config.selectors);
        renderer.insert(discovery.feed_url("bakery"), {
            let mut page = FakePage::default();
            page.fail_open = true;
            page
        });

        let request = JobRequest {
            query: "bakery".to_string(),
            target_count: 2,
            visit_internal_pages: true,
        };
        assert!(run_pipeline(&config, &renderer, &store, &request)
            .await
            .is_err());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_target_is_clamped_to_configured_cap() {
        let mut config = fast_config();
        config.crawler.max_listings = 1;
        let tmp = TempDir::new().unwrap();
        let store = ExportStore::new(tmp.path());

        let renderer = FakeRenderer::new();
        let discovery = ListingDiscovery::new(&config.discovery, &config.selectors);
        renderer.insert(
            discovery.feed_url("bakery"),
            FakePage {
                counts: vec![3],
                entries: (0..3)
                    .map(|i| LinkTarget {
                        text: format!("Business {}", i),
                        href: format!("https://maps.example.com/place/{}", i),
                    })
                    .collect(),
                ..FakePage::default()
            },
        );
        renderer.insert("https://maps.example.com/place/0", FakePage::default());

        let request = JobRequest {
            query: "bakery".to_string(),
            target_count: 50,
            visit_internal_pages: true,
        };
        let summary = run_pipeline(&config, &renderer, &store, &request)
            .await
            .unwrap();
        assert_eq!(summary.listing_count, 1);
    }
}
