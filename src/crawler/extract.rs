//! Pure HTML extraction for listing and detail pages
//!
//! Turns raw markup into either a list of detail-page URLs or one structured
//! record. No I/O, no retained state.
//!
//! The target markup is irregular (placeholder dashes for missing prices,
//! optional secondary names), so every field extractor has an explicit
//! absent policy instead of failing; only total structural failure (no name
//! container at all) yields no record.

use crate::storage::Record;
use scraper::{ElementRef, Html, Selector};

/// Extracts detail-page URLs from a listing page, in document order
///
/// Selects every anchor carrying the catalog's restaurant-name link class
/// and returns their `href` values. An empty vector is a valid outcome,
/// not an error.
pub fn extract_listing_urls(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let mut urls = Vec::new();
    if let Ok(selector) = Selector::parse("a.list-rst__rst-name-target") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                urls.push(href.to_string());
            }
        }
    }
    urls
}

/// Extracts one structured record from a detail page
///
/// # Extraction steps
///
/// 1. Embedded JSON-LD block, if present: address, city (first whitespace
///    token of the locality), region, coordinates.
/// 2. Plain-markup address selector as a fallback.
/// 3. Primary (Latin) display name plus an optional native-script alias.
/// 4. Rating as a float in the 0-5 scale; absent when unparseable.
/// 5. Review count via a first-integer heuristic; 0 when absent.
/// 6. Lunch/dinner prices from the labeled budget section; a placeholder
///    dash maps to absent.
/// 7. Categories from the table cell following the "Categories" label.
///
/// The area tag is the caller's hint (derived from the URL), else the
/// lowercased region, else `"unknown"`.
///
/// # Returns
///
/// * `Some(Record)` - At least the name container was found
/// * `None` - The page lacks the minimum structure to be a detail page
pub fn extract_record(html: &str, source_url: &str, area_hint: Option<&str>) -> Option<Record> {
    let document = Html::parse_document(html);

    let name_selector = Selector::parse("h2.display-name").ok()?;
    let name_container = document.select(&name_selector).next()?;

    let (name_en, name_local) = extract_names(name_container);
    let rating = extract_rating(&document);
    let review_count = extract_review_count(&document);

    let location = extract_json_ld(&document)
        .map(|value| location_from_json_ld(&value))
        .unwrap_or_default();
    let address = location
        .address
        .or_else(|| extract_address_fallback(&document));

    let price_lunch = extract_price(&document, "Lunch");
    let price_dinner = extract_price(&document, "Dinner");
    let categories = extract_categories(&document);

    let area = area_hint
        .map(str::to_string)
        .or_else(|| location.region.as_ref().map(|r| r.to_lowercase()))
        .unwrap_or_else(|| "unknown".to_string());

    Some(Record {
        name_en,
        name_local,
        rating,
        review_count,
        address,
        city: location.city,
        region: location.region,
        latitude: location.latitude,
        longitude: location.longitude,
        price_lunch,
        price_dinner,
        source_url: source_url.to_string(),
        categories,
        area,
    })
}

/// Location fields derived from an embedded JSON-LD block
#[derive(Debug, Default)]
struct Location {
    address: Option<String>,
    city: Option<String>,
    region: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Returns the first embedded JSON-LD block, parsed
fn extract_json_ld(document: &Html) -> Option<serde_json::Value> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    let script = document.select(&selector).next()?;
    let raw = script.text().collect::<String>();

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Ignoring malformed JSON-LD block: {}", e);
            None
        }
    }
}

/// Derives address, city, region, and coordinates from a JSON-LD block
///
/// City is the first whitespace-delimited token of the locality field.
/// Coordinates are kept only when both arrive as numbers.
fn location_from_json_ld(value: &serde_json::Value) -> Location {
    let address_data = value.get("address");
    let geo_data = value.get("geo");

    let field = |key: &str| -> Option<String> {
        address_data?
            .get(key)?
            .as_str()
            .map(str::to_string)
            .filter(|s| !s.is_empty())
    };

    let street = field("streetAddress");
    let locality = field("addressLocality");
    let region = field("addressRegion");
    let postal = field("postalCode");

    let parts: Vec<&str> = [&street, &locality, &region, &postal]
        .iter()
        .filter_map(|part| part.as_deref())
        .collect();
    let address = if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    };

    let city = locality
        .as_ref()
        .and_then(|l| l.split_whitespace().next())
        .map(str::to_string);

    let latitude = geo_data
        .and_then(|g| g.get("latitude"))
        .and_then(serde_json::Value::as_f64);
    let longitude = geo_data
        .and_then(|g| g.get("longitude"))
        .and_then(serde_json::Value::as_f64);

    // A lone coordinate is useless; keep the pair or drop both.
    let (latitude, longitude) = match (latitude, longitude) {
        (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
        _ => (None, None),
    };

    Location {
        address,
        city,
        region,
        latitude,
        longitude,
    }
}

/// Reads the primary (Latin) name and the optional native-script alias
///
/// The alias lives in a `span.alias` sibling following the name container,
/// wrapped in parentheses that are stripped here.
fn extract_names(container: ElementRef) -> (Option<String>, Option<String>) {
    let name_en = match Selector::parse("span") {
        Ok(selector) => container
            .select(&selector)
            .next()
            .map(|span| span.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty()),
        Err(_) => None,
    };

    let name_local = container
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "span" && e.value().classes().any(|c| c == "alias"))
        .map(|e| clean_text(&e.text().collect::<String>()))
        .filter(|s| !s.is_empty());

    (name_en, name_local)
}

/// Parses the numeric rating when present and within the 0-5 scale
fn extract_rating(document: &Html) -> Option<f64> {
    let selector = Selector::parse("span.rdheader-rating__score-val-dtl").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|e| e.text().collect::<String>().trim().parse::<f64>().ok())
        .filter(|rating| (0.0..=5.0).contains(rating))
}

/// Reads the review count; 0 when the element or number is missing
fn extract_review_count(document: &Html) -> u32 {
    let selector = match Selector::parse("span.rdheader-rating__review-target") {
        Ok(selector) => selector,
        Err(_) => return 0,
    };

    document
        .select(&selector)
        .next()
        .and_then(|e| first_integer(&e.text().collect::<String>()))
        .unwrap_or(0)
}

/// Plain-markup address, used when JSON-LD yields none
fn extract_address_fallback(document: &Html) -> Option<String> {
    let selector = Selector::parse("p.rstinfo-table__address").ok()?;
    document
        .select(&selector)
        .next()
        .map(|e| collapse_whitespace(&e.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Reads the price link next to the labeled budget icon
///
/// A literal placeholder dash means the price is not published.
fn extract_price(document: &Html, meal: &str) -> Option<String> {
    let budget_selector = Selector::parse("div.rdheader-budget").ok()?;
    let budget = document.select(&budget_selector).next()?;

    let icon_selector = Selector::parse(&format!(r#"i[aria-label="{}"]"#, meal)).ok()?;
    let icon = budget.select(&icon_selector).next()?;

    let container = icon
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "p")?;

    let price_selector = Selector::parse("a.rdheader-budget__price-target").ok()?;
    let text = container.select(&price_selector).next()?.text().collect::<String>();
    let text = collapse_whitespace(text.trim());

    if text.is_empty() || text == "-" {
        return None;
    }
    Some(text)
}

/// Splits the table cell following the "Categories" label
fn extract_categories(document: &Html) -> Vec<String> {
    let selector = match Selector::parse("th") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    for th in document.select(&selector) {
        let label = th.text().collect::<String>();
        if !label.to_lowercase().contains("categories") {
            continue;
        }

        let cell = th
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "td");

        if let Some(cell) = cell {
            return cell
                .text()
                .collect::<String>()
                .split(',')
                .map(|category| category.trim().to_string())
                .filter(|category| !category.is_empty())
                .collect();
        }
    }

    Vec::new()
}

/// First run of ASCII digits in `text`, parsed
fn first_integer(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Collapses whitespace runs into single spaces
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips parentheses and collapses whitespace (alias names arrive wrapped)
fn clean_text(text: &str) -> String {
    collapse_whitespace(&text.replace('(', "").replace(')', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = r#"
<html>
<head>
<script type="application/ld+json">
{
  "@type": "Restaurant",
  "name": "Sushi Yuu",
  "address": {
    "@type": "PostalAddress",
    "streetAddress": "1-2-3 Nishiazabu",
    "addressLocality": "Shibuya-ku Tokyo",
    "addressRegion": "Tokyo",
    "postalCode": "150-0001"
  },
  "geo": {
    "@type": "GeoCoordinates",
    "latitude": 35.6595,
    "longitude": 139.7005
  }
}
</script>
</head>
<body>
  <h2 class="display-name"><span>Sushi Yuu</span></h2>
  <span class="alias">(鮨 遊)</span>
  <span class="rdheader-rating__score-val-dtl">3.58</span>
  <span class="rdheader-rating__review-target">112 reviews</span>
  <div class="rdheader-budget">
    <p><i aria-label="Dinner"></i><a class="rdheader-budget__price-target">¥20,000-¥29,999</a></p>
    <p><i aria-label="Lunch"></i><a class="rdheader-budget__price-target">¥8,000-¥9,999</a></p>
  </div>
  <table>
    <tr><th>Categories</th><td>Sushi, Seafood</td></tr>
  </table>
</body>
</html>
"#;

    const SOURCE_URL: &str = "https://tabelog.com/en/tokyo/A1301/A130101/13001122/";

    #[test]
    fn test_listing_urls_in_document_order() {
        let html = r#"
            <div class="list-rst">
              <a class="list-rst__rst-name-target" href="https://x/en/tokyo/1/">One</a>
              <a class="list-rst__rst-name-target" href="https://x/en/tokyo/2/">Two</a>
              <a class="other" href="https://x/en/tokyo/skip/">Skip</a>
              <a class="list-rst__rst-name-target" href="https://x/en/tokyo/3/">Three</a>
            </div>
        "#;
        let urls = extract_listing_urls(html);
        assert_eq!(
            urls,
            vec![
                "https://x/en/tokyo/1/",
                "https://x/en/tokyo/2/",
                "https://x/en/tokyo/3/"
            ]
        );
    }

    #[test]
    fn test_listing_urls_empty_page() {
        let urls = extract_listing_urls("<html><body><p>No results</p></body></html>");
        assert!(urls.is_empty());
    }

    #[test]
    fn test_full_record_extraction() {
        let record = extract_record(DETAIL_PAGE, SOURCE_URL, Some("tokyo")).unwrap();

        assert_eq!(record.name_en.as_deref(), Some("Sushi Yuu"));
        assert_eq!(record.name_local.as_deref(), Some("鮨 遊"));
        assert_eq!(record.rating, Some(3.58));
        assert_eq!(record.review_count, 112);
        assert_eq!(
            record.address.as_deref(),
            Some("1-2-3 Nishiazabu Shibuya-ku Tokyo Tokyo 150-0001")
        );
        assert_eq!(record.city.as_deref(), Some("Shibuya-ku"));
        assert_eq!(record.region.as_deref(), Some("Tokyo"));
        assert_eq!(record.latitude, Some(35.6595));
        assert_eq!(record.longitude, Some(139.7005));
        assert_eq!(record.price_lunch.as_deref(), Some("¥8,000-¥9,999"));
        assert_eq!(record.price_dinner.as_deref(), Some("¥20,000-¥29,999"));
        assert_eq!(record.source_url, SOURCE_URL);
        assert_eq!(record.categories, vec!["Sushi", "Seafood"]);
        assert_eq!(record.area, "tokyo");
    }

    #[test]
    fn test_city_is_first_locality_token() {
        let record = extract_record(DETAIL_PAGE, SOURCE_URL, None).unwrap();
        assert_eq!(record.city.as_deref(), Some("Shibuya-ku"));
    }

    #[test]
    fn test_area_falls_back_to_region() {
        let record = extract_record(DETAIL_PAGE, SOURCE_URL, None).unwrap();
        assert_eq!(record.area, "tokyo");
    }

    #[test]
    fn test_area_unknown_without_hint_or_region() {
        let html = r#"<html><body><h2 class="display-name"><span>Nameless</span></h2></body></html>"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.area, "unknown");
    }

    #[test]
    fn test_missing_name_container_yields_no_record() {
        let html = r#"<html><body><p>Not a detail page</p></body></html>"#;
        assert!(extract_record(html, SOURCE_URL, None).is_none());
    }

    #[test]
    fn test_names_independently_optional() {
        let html = r#"<html><body><h2 class="display-name"><span>Only English</span></h2></body></html>"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.name_en.as_deref(), Some("Only English"));
        assert_eq!(record.name_local, None);
    }

    #[test]
    fn test_dash_price_maps_to_absent() {
        let html = r#"
<html><body>
  <h2 class="display-name"><span>Cheap Eats</span></h2>
  <div class="rdheader-budget">
    <p><i aria-label="Dinner"></i><a class="rdheader-budget__price-target">¥1,000-¥1,999</a></p>
    <p><i aria-label="Lunch"></i><a class="rdheader-budget__price-target">-</a></p>
  </div>
</body></html>
"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.price_lunch, None);
        assert_eq!(record.price_dinner.as_deref(), Some("¥1,000-¥1,999"));
    }

    #[test]
    fn test_missing_budget_section_yields_absent_prices() {
        let html = r#"<html><body><h2 class="display-name"><span>No Prices</span></h2></body></html>"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.price_lunch, None);
        assert_eq!(record.price_dinner, None);
    }

    #[test]
    fn test_unparseable_rating_is_absent() {
        let html = r#"
<html><body>
  <h2 class="display-name"><span>X</span></h2>
  <span class="rdheader-rating__score-val-dtl">N/A</span>
</body></html>
"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.rating, None);
    }

    #[test]
    fn test_out_of_scale_rating_is_absent() {
        let html = r#"
<html><body>
  <h2 class="display-name"><span>X</span></h2>
  <span class="rdheader-rating__score-val-dtl">9.9</span>
</body></html>
"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.rating, None);
    }

    #[test]
    fn test_missing_review_count_defaults_to_zero() {
        let html = r#"<html><body><h2 class="display-name"><span>X</span></h2></body></html>"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.review_count, 0);
    }

    #[test]
    fn test_lone_coordinate_is_dropped() {
        let html = r#"
<html><head>
<script type="application/ld+json">
{"address": {"addressLocality": "Sapporo"}, "geo": {"latitude": 43.06}}
</script>
</head><body>
  <h2 class="display-name"><span>X</span></h2>
</body></html>
"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
        assert_eq!(record.city.as_deref(), Some("Sapporo"));
    }

    #[test]
    fn test_string_coordinates_are_dropped() {
        let html = r#"
<html><head>
<script type="application/ld+json">
{"geo": {"latitude": "35.6", "longitude": "139.7"}}
</script>
</head><body>
  <h2 class="display-name"><span>X</span></h2>
</body></html>
"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
    }

    #[test]
    fn test_address_falls_back_to_markup() {
        let html = r#"
<html><body>
  <h2 class="display-name"><span>X</span></h2>
  <p class="rstinfo-table__address">4-5-6   Dotonbori,
  Chuo-ku, Osaka</p>
</body></html>
"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(
            record.address.as_deref(),
            Some("4-5-6 Dotonbori, Chuo-ku, Osaka")
        );
    }

    #[test]
    fn test_malformed_json_ld_is_ignored() {
        let html = r#"
<html><head>
<script type="application/ld+json">{not json at all</script>
</head><body>
  <h2 class="display-name"><span>X</span></h2>
  <p class="rstinfo-table__address">Fallback Street 1</p>
</body></html>
"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.address.as_deref(), Some("Fallback Street 1"));
    }

    #[test]
    fn test_categories_missing_yields_empty() {
        let html = r#"<html><body><h2 class="display-name"><span>X</span></h2></body></html>"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert!(record.categories.is_empty());
    }

    #[test]
    fn test_categories_trimmed_and_split() {
        let html = r#"
<html><body>
  <h2 class="display-name"><span>X</span></h2>
  <table><tr><th>Categories</th><td> Ramen , Tsukemen,</td></tr></table>
</body></html>
"#;
        let record = extract_record(html, SOURCE_URL, None).unwrap();
        assert_eq!(record.categories, vec!["Ramen", "Tsukemen"]);
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("112 reviews"), Some(112));
        assert_eq!(first_integer("(2,345)"), Some(2));
        assert_eq!(first_integer("no digits"), None);
        assert_eq!(first_integer(""), None);
    }

    #[test]
    fn test_clean_text_strips_parentheses() {
        assert_eq!(clean_text("(鮨 遊)"), "鮨 遊");
        assert_eq!(clean_text("  a  (b)  c "), "a b c");
    }
}
