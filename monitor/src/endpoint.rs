use reqwest::Url;
use tracing::debug;

/// Candidates tried after the configured override, in order
pub const FALLBACK_API_BASES: [&str; 2] = ["http://localhost:5008", "http://localhost:5000"];

/// Used when no candidate parses
pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

pub const LATEST_PATH: &str = "/esp32/latest";

/// Picks the first candidate that parses as a URL, override first.
///
/// Blank overrides count as unset. The returned base has its trailing
/// slash removed.
pub fn resolve_api_base(override_base: Option<&str>) -> String {
    let candidates = override_base
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .into_iter()
        .chain(FALLBACK_API_BASES);

    for candidate in candidates {
        match Url::parse(candidate) {
            Ok(_) => return normalize(candidate),
            Err(e) => debug!("Skipping API base {:?}: {}", candidate, e),
        }
    }

    DEFAULT_API_BASE.to_string()
}

/// Full URL of the latest-readings resource under `base`
pub fn latest_url(base: &str) -> String {
    format!("{}{}", normalize(base), LATEST_PATH)
}

fn normalize(base: &str) -> String {
    base.strip_suffix('/').unwrap_or(base).to_string()
}
