//! GSTIN and PAN helpers.

use std::sync::LazyLock;

use regex::Regex;

static GSTIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("valid GSTIN regex")
});

static PAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("valid PAN regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

pub const GSTIN_LEN: usize = 15;
pub const PAN_LEN: usize = 10;

/// Trim and upper-case a tax identifier; blanks become `None`.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    raw.map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
}

/// PAN embedded in a GSTIN (characters 3 to 12), once at least 12 characters are present.
pub fn pan_from_gstin(gstin: &str) -> Option<&str> {
    gstin.get(2..12)
}

pub fn is_valid_gstin(gstin: &str) -> bool {
    gstin.len() == GSTIN_LEN && GSTIN_RE.is_match(gstin)
}

pub fn is_valid_pan(pan: &str) -> bool {
    pan.len() == PAN_LEN && PAN_RE.is_match(pan)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_is_sliced_from_gstin() {
        assert_eq!(pan_from_gstin("27AAPFU0939F1ZV"), Some("AAPFU0939F"));
        assert_eq!(pan_from_gstin("27AAPFU0939F"), Some("AAPFU0939F"));
        assert_eq!(pan_from_gstin("27AAPFU0939"), None);
    }

    #[test]
    fn formats_are_checked() {
        assert!(is_valid_gstin("27AAPFU0939F1ZV"));
        assert!(!is_valid_gstin("27AAPFU0939F1Z"));
        assert!(!is_valid_gstin("27aapfu0939f1zv"));
        assert!(is_valid_pan("AAPFU0939F"));
        assert!(!is_valid_pan("AAPFU0939"));
        assert!(is_valid_email("ops@acme.in"));
        assert!(!is_valid_email("ops@acme"));
        assert!(!is_valid_email("ops acme.in"));
    }

    proptest::proptest! {
        /// Property: every well-formed GSTIN embeds a well-formed PAN.
        #[test]
        fn well_formed_gstin_embeds_valid_pan(gstin in "[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]") {
            proptest::prop_assert!(is_valid_gstin(&gstin));
            let pan = pan_from_gstin(&gstin).unwrap_or_default();
            proptest::prop_assert!(is_valid_pan(pan));
        }
    }

    #[test]
    fn normalize_drops_blanks() {
        assert_eq!(normalize(Some("  ")), None);
        assert_eq!(normalize(Some(" 27aapfu0939f1zv ")), Some("27AAPFU0939F1ZV".to_string()));
        assert_eq!(normalize(None), None);
    }
}
