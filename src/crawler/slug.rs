//! Detail-endpoint addressing: slugs and date fragments
//!
//! Galleries and movies are addressed by an upper-cased, substituted name;
//! models by the percent-encoded raw name. The two rules are not
//! interchangeable.

use crate::{IngestError, Result};

/// Characters replaced with `_` in gallery and movie slugs
pub const FORBIDDEN_SLUG_CHARS: &[char] = &[
    ' ', '\'', '<', '>', '(', ')', ':', '"', '/', '\\', '|', '!', '?', '*', '&', ',', '+', '%',
    '#',
];

/// Gallery/movie slug: upper-cased, forbidden characters replaced by `_`
pub fn substitution_slug(name: &str) -> String {
    name.to_uppercase()
        .chars()
        .map(|c| if FORBIDDEN_SLUG_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Model slug: percent-encoding of the raw name, keeping `/` literal
pub fn percent_slug(name: &str) -> String {
    name.split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Second-to-last `/`-delimited segment of an item path
pub fn date_fragment(path: &str) -> Result<&str> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 {
        return Err(IngestError::invalid(
            "path",
            format!("'{}' has no date segment", path),
        ));
    }
    Ok(segments[segments.len() - 2])
}
