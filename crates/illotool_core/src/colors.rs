use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::bytes::Regex;

/// A quoted fill value: `#` plus 3-8 lower-case hex digits, or `none`.
static COLOR_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(#[a-f0-9]{3,8}|none)""#).expect("color token pattern is valid")
});

/// Distinct color tokens found anywhere in an asset's raw content.
pub fn extract_colors(content: &[u8]) -> BTreeSet<String> {
    COLOR_TOKEN
        .captures_iter(content)
        .filter_map(|captures| captures.get(1))
        .map(|token| String::from_utf8_lossy(token.as_bytes()).into_owned())
        .collect()
}
