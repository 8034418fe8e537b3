pub use lily_scraper::scraper::testing::StubFetcher;
use serde_json::json;

pub fn hdri_url(id: &str, res: &str) -> String {
    format!("https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/{res}/{id}_{res}.hdr")
}

/// A Poly Haven HDRI with the given resolutions, all in `hdr`.
pub fn hdri_provider(id: &str, name: &str, kind: i64, resolutions: &[&str]) -> StubFetcher {
    let mut hdri = serde_json::Map::new();
    let mut fetcher = StubFetcher::default();
    for res in resolutions {
        hdri.insert(res.to_string(), json!({"hdr": {"url": hdri_url(id, res)}}));
        fetcher = fetcher.with_bytes(&hdri_url(id, res), format!("{id}-{res}").as_bytes());
    }

    fetcher
        .with_json(
            &format!("https://api.polyhaven.com/info/{id}"),
            json!({"type": kind, "name": name}),
        )
        .with_json(
            &format!("https://api.polyhaven.com/files/{id}"),
            json!({ "hdri": hdri }),
        )
        .with_bytes(
            &format!("https://cdn.polyhaven.com/asset_img/thumbs/{id}.png?width=512&height=512"),
            b"PNG",
        )
}
