//! Numeric extraction from free-form answers ("15,5 kg", "1.10 m").

use std::sync::LazyLock;

use regex::Regex;

/// First integer-or-decimal run in the text. Commas are already folded to dots
/// before this is applied.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"));

/// Extract the first number in `text`, ignoring surrounding unit tokens.
///
/// A comma is accepted as decimal separator. Returns `None` when no numeric
/// run exists.
pub fn extract_number(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    let found = NUMBER_RE.find(&normalized)?;
    found.as_str().parse::<f64>().ok()
}
