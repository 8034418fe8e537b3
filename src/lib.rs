//! Discover and download texture, HDRI and light assets from provider web
//! APIs, starting from nothing more than a shared asset page URL.

pub mod config;
pub mod library;
pub mod scraper;
pub mod session;
pub mod utils;

pub use library::{Library, LibraryEntry};
pub use scraper::{
    AssetData, AssetKind, AssetMetadata, HttpFetcher, ReqwestFetcher, ScrapeError, Scraper,
    ScraperFactory, ScraperInfo, ScraperRegistry, TextureStore,
};
pub use session::ImportSession;
