use std::collections::BTreeMap;
use url::{form_urlencoded, Position, Url};

/// Query parameter names dropped outright. Anything starting with `utm_` is dropped as well.
const TRACKING_PARAMS: &[&str] = &["ref", "fbclid", "gclid"];

fn is_tracking_param(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("utm_") || TRACKING_PARAMS.contains(&name.as_str())
}

/// Reduces a URL to a stable comparison key: tracking parameters removed,
/// remaining parameters sorted by name (first value wins), trailing slashes
/// and the fragment dropped. Input that does not parse is returned unchanged.
pub fn canonicalize(url: &str) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return url.to_string();
    };

    let mut params = BTreeMap::new();
    for (name, value) in parsed.query_pairs() {
        if is_tracking_param(&name) {
            continue;
        }
        params.entry(name.into_owned()).or_insert_with(|| value.into_owned());
    }

    let base = parsed[..Position::AfterPath].trim_end_matches('/');
    if params.is_empty() {
        return base.to_string();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    format!("{}?{}", base, query)
}
