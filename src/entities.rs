//! Text normalization for character data pulled out of feed XML.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:(amp|lt|gt|quot|apos)|#([0-9]+)|#[xX]([0-9a-fA-F]+));")
        .expect("entity pattern is valid")
});

static CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A<!\[CDATA\[(.*)\]\]>\z").expect("cdata pattern is valid")
});

/// Decode the predefined XML entities and numeric character references.
///
/// Substitution happens in a single pass, so `&amp;lt;` becomes `&lt;`.
/// References that do not name a Unicode scalar value are kept verbatim.
pub fn decode_xml_entities(s: &str) -> Cow<'_, str> {
    ENTITY.replace_all(s, |caps: &Captures| {
        if let Some(name) = caps.get(1) {
            return match name.as_str() {
                "amp" => "&",
                "lt" => "<",
                "gt" => ">",
                "quot" => "\"",
                _ => "'",
            }
            .to_string();
        }

        let code = match (caps.get(2), caps.get(3)) {
            (Some(dec), _) => dec.as_str().parse::<u32>().ok(),
            (None, Some(hex)) => u32::from_str_radix(hex.as_str(), 16).ok(),
            _ => None,
        };

        match code.and_then(char::from_u32) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Unwrap a `<![CDATA[...]]>` envelope, but only when it spans the whole string.
pub fn strip_cdata(s: &str) -> &str {
    match CDATA.captures(s).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => s,
    }
}
