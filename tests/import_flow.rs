mod common;

use common::{hdri_provider, StubFetcher};
use lily_scraper::scraper::polyhaven_hdri::{self, PolyHavenHdriScraper};
use lily_scraper::{
    AssetData, ImportSession, Library, ScrapeError, Scraper, ScraperRegistry, TextureStore,
};
use std::sync::Arc;
use tempfile::TempDir;

const PAGE: &str = "https://polyhaven.com/a/kloppenheim_06";

fn store(dir: &TempDir, fetcher: &Arc<StubFetcher>) -> TextureStore {
    TextureStore::new(dir.path(), fetcher.clone())
}

#[test]
fn natural_order_of_resolutions() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(hdri_provider(
        "kloppenheim_06",
        "Kloppenheim 06",
        0,
        &["1k", "2k", "4k", "16k"],
    ));
    let registry = ScraperRegistry::with_defaults();

    let session = ImportSession::open(&registry, &store(&dir, &fetcher), PAGE, None).unwrap();
    assert_eq!(
        session.variants(),
        ["1k (hdr)", "2k (hdr)", "4k (hdr)", "16k (hdr)"]
    );
}

#[test]
fn second_fetch_is_served_from_disk() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(hdri_provider(
        "kloppenheim_06",
        "Kloppenheim 06",
        0,
        &["1k", "2k"],
    ));
    let registry = ScraperRegistry::with_defaults();
    let mut session = ImportSession::open(&registry, &store(&dir, &fetcher), PAGE, None).unwrap();

    let first = session.fetch(1).unwrap();
    let downloads = fetcher.downloads();
    assert_eq!(downloads, 2, "variant file and thumbnail");

    let second = session.fetch(1).unwrap();
    assert_eq!(fetcher.downloads(), downloads);
    assert_eq!(first, second);
    assert!(session.is_downloaded("2k (hdr)"));
}

#[test]
fn out_of_range_selection_leaves_output_untouched() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(hdri_provider("kloppenheim_06", "Kloppenheim 06", 0, &["1k"]));
    let mut scraper = PolyHavenHdriScraper::new(store(&dir, &fetcher));
    scraper.variant_list(PAGE).unwrap();

    let mut out = AssetData::default();
    let err = scraper.fetch_variant(1, &mut out).unwrap_err();
    assert!(matches!(err, ScrapeError::InvalidVariantIndex { index: 1, count: 1 }));
    assert_eq!(out, AssetData::default());
    assert!(scraper.error().unwrap().starts_with("Invalid variant index"));
}

#[test]
fn incompatible_type_never_populates_variants() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(hdri_provider("kloppenheim_06", "Kloppenheim 06", 2, &["1k"]));
    let mut scraper = PolyHavenHdriScraper::new(store(&dir, &fetcher));

    let err = scraper.variant_list(PAGE).unwrap_err();
    assert!(matches!(err, ScrapeError::NotSupportedAssetType { .. }));
    assert!(scraper.metadata().variants.is_empty());
    assert!(scraper.error().is_some());
}

#[test]
fn reloaded_metadata_answers_without_network() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(hdri_provider(
        "kloppenheim_06",
        "Kloppenheim 06",
        0,
        &["1k", "2k"],
    ));
    let registry = ScraperRegistry::with_defaults();
    let mut session = ImportSession::open(&registry, &store(&dir, &fetcher), PAGE, None).unwrap();
    let imported = session.fetch(0).unwrap();
    let metadata_path = session.scraper().metadata_path();

    let offline = Arc::new(StubFetcher::default());
    let mut scraper = PolyHavenHdriScraper::new(store(&dir, &offline));
    scraper.load_metadata(&metadata_path).unwrap();

    assert!(scraper.is_downloaded("1k (hdr)"));
    assert!(!scraper.is_downloaded("2k (hdr)"));

    let mut out = AssetData::default();
    scraper.fetch_variant(0, &mut out).unwrap();
    assert_eq!(out, imported);
    assert_eq!(offline.requests(), 0);
}

#[test]
fn library_lists_imported_assets_for_reimport() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(hdri_provider(
        "kloppenheim_06",
        "Kloppenheim 06",
        0,
        &["1k"],
    ));
    let registry = ScraperRegistry::with_defaults();
    let mut session = ImportSession::open(&registry, &store(&dir, &fetcher), PAGE, None).unwrap();
    session.fetch(0).unwrap();

    let mut library = Library::new(dir.path());
    let entry = library
        .find(&polyhaven_hdri::INFO, "Kloppenheim 06")
        .unwrap()
        .unwrap();
    assert_eq!(entry.fetch_url, PAGE);
    assert_eq!(
        entry.thumbnail,
        Some(dir.path().join("hdrihaven/Kloppenheim 06/thumbnail.png"))
    );

    let reopened =
        ImportSession::open(&registry, &store(&dir, &fetcher), &entry.fetch_url, None).unwrap();
    assert!(reopened.is_downloaded("1k (hdr)"));
}

#[test]
fn guessed_url_round_trips_through_dispatch() {
    let registry = ScraperRegistry::with_defaults();
    let factory = registry.find_by_id("polyhaven-hdri").unwrap();
    let url = factory.url_from_name("Kloppenheim 06");
    assert_eq!(url, PAGE);
    assert_eq!(registry.find_for_url(&url).unwrap().info().id, "polyhaven-hdri");
}
