//! Static catalog tables
//!
//! Known city slugs, URL patterns for the two search modes, the fixed
//! request header set, and the User-Agent pool. These tables are the only
//! place the catalog site's URL layout is spelled out.

use url::Url;

/// Known city slugs and their listing paths on the catalog site
pub const CITY_PATHS: &[(&str, &str)] = &[
    ("tokyo", "/tokyo/"),
    ("osaka", "/osaka/"),
    ("kyoto", "/kyoto/"),
    ("yokohama", "/yokohama/"),
    ("sapporo", "/sapporo/"),
];

/// Fixed header set sent with every request; the User-Agent is added per
/// request from [`USER_AGENTS`].
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.5"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
];

/// Pool of browser User-Agent strings; one is chosen at random per request
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// Returns the listing URL for a known city slug, or None for an unknown one
pub fn city_listing_url(base_url: &str, city: &str) -> Option<String> {
    CITY_PATHS
        .iter()
        .find(|(slug, _)| *slug == city)
        .map(|(_, path)| format!("{}{}", base_url.trim_end_matches('/'), path))
}

/// Returns the listing URL for a free-text food term, sorted by rating
pub fn food_listing_url(base_url: &str, food: &str) -> String {
    format!(
        "{}/rstLst/{}/?SrtT=rt",
        base_url.trim_end_matches('/'),
        food.to_lowercase()
    )
}

/// Builds the URL of the n-th listing page
///
/// Page 1 is the bare listing URL; later pages get a page segment appended.
pub fn page_url(listing_url: &str, page: u32) -> String {
    if page <= 1 {
        listing_url.to_string()
    } else {
        format!("{}/rstLst/{}/", listing_url.trim_end_matches('/'), page)
    }
}

/// Derives the crawl area from a detail URL by matching a known city slug
/// against the URL's path segments
pub fn area_from_url(url: &str) -> Option<&'static str> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    CITY_PATHS
        .iter()
        .map(|(slug, _)| *slug)
        .find(|slug| segments.contains(slug))
}

/// All known city slugs, for CLI argument validation
pub fn known_cities() -> Vec<&'static str> {
    CITY_PATHS.iter().map(|(slug, _)| *slug).collect()
}
