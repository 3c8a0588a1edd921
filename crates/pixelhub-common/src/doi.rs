//! Zenodo-style DOI arithmetic
//!
//! DOIs handed out by the deposition service look like `10.5281/zenodo.<n>`.
//! New DOIs are allocated by scanning every DOI already known, keeping the
//! ones whose numeric suffix matches `zenodo\.(\d+)$`, and taking `max + 1`.
//! When nothing matches, allocation starts at [`FIRST_DOI_SUFFIX`].
//!
//! The allocation is only collision-free across restarts when the scanned
//! DOIs come from persistent storage.

use regex::Regex;
use std::sync::LazyLock;

/// Prefix shared by every DOI the platform issues.
pub const DOI_PREFIX: &str = "10.5281/zenodo.";

/// Suffix of the first DOI when no DOI exists yet.
pub const FIRST_DOI_SUFFIX: u64 = 1_000_001;

#[allow(clippy::expect_used)]
static DOI_SUFFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"zenodo\.(\d+)$").expect("DOI suffix pattern is valid"));

/// Build a DOI from its numeric suffix.
pub fn format_doi(suffix: u64) -> String {
    format!("{}{}", DOI_PREFIX, suffix)
}

/// Extract the numeric suffix of a DOI, if it has one.
///
/// Suffixes that overflow `u64` are treated as non-matching.
pub fn doi_suffix(doi: &str) -> Option<u64> {
    DOI_SUFFIX_PATTERN
        .captures(doi)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Compute the next sequential DOI from the DOIs already assigned.
///
/// `None` entries and DOIs without a numeric suffix are ignored.
///
/// ```
/// use pixelhub_common::doi::next_doi;
///
/// assert_eq!(next_doi(Vec::<Option<&str>>::new()), "10.5281/zenodo.1000001");
/// ```
pub fn next_doi<I, S>(existing: I) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let max = existing
        .into_iter()
        .flatten()
        .filter_map(|doi| doi_suffix(doi.as_ref()))
        .max();

    match max {
        Some(suffix) => format_doi(suffix.saturating_add(1)),
        None => format_doi(FIRST_DOI_SUFFIX),
    }
}

/// DOI used when the set of existing DOIs cannot be read.
pub fn fallback_doi() -> String {
    format_doi(FIRST_DOI_SUFFIX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_next_doi_skips_missing_and_malformed() {
        let existing = vec![
            Some("10.5281/zenodo.1000005"),
            Some("10.5281/zenodo.1000010"),
            None,
            Some("bad-format"),
        ];
        assert_eq!(next_doi(existing), "10.5281/zenodo.1000011");
    }

    #[test]
    fn test_next_doi_empty() {
        assert_eq!(next_doi(Vec::<Option<String>>::new()), "10.5281/zenodo.1000001");
        assert_eq!(next_doi(vec![None::<&str>, None]), "10.5281/zenodo.1000001");
    }

    #[test]
    fn test_next_doi_accepts_owned_strings() {
        let existing = vec![Some("10.5281/zenodo.7".to_string())];
        assert_eq!(next_doi(existing), "10.5281/zenodo.8");
    }

    #[test]
    fn test_doi_suffix() {
        assert_eq!(doi_suffix("10.5281/zenodo.1000002"), Some(1_000_002));
        assert_eq!(doi_suffix("zenodo.12"), Some(12));
        assert_eq!(doi_suffix("10.5281/zenodo.12a"), None);
        assert_eq!(doi_suffix("10.1234/other.99"), None);
        assert_eq!(doi_suffix(""), None);
    }

    #[test]
    fn test_fallback_doi() {
        assert_eq!(fallback_doi(), "10.5281/zenodo.1000001");
    }

    proptest! {
        #[test]
        fn prop_next_doi_exceeds_every_existing(suffixes in proptest::collection::vec(0u64..10_000_000, 1..20)) {
            let existing: Vec<Option<String>> = suffixes.iter().map(|s| Some(format_doi(*s))).collect();
            let next = next_doi(existing);
            let next_suffix = doi_suffix(&next).unwrap();
            prop_assert!(suffixes.iter().all(|s| *s < next_suffix));
            prop_assert_eq!(next_suffix, suffixes.iter().max().unwrap() + 1);
        }
    }
}
