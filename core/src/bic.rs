//! BIC (ISO 9362) structure checks.
//!
//! A BIC is four letters of institution code, the two-letter country code,
//! two alphanumeric location characters and an optional three-character
//! branch code. Short 8-character BICs stand for the primary office and are
//! compared in their `XXX`-padded form.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Length of a full BIC including the branch code.
pub const BIC_LENGTH: usize = 11;
/// Length of a BIC without the branch code.
pub const SHORT_BIC_LENGTH: usize = 8;
/// Branch code implied by a short BIC.
pub const PRIMARY_OFFICE: &str = "XXX";

// SAFETY: This regex is a compile-time constant and is validated by tests.
static BIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{4}[A-Z]{2}[A-Z0-9]{2}[A-Z0-9]{3}$").expect("static regex must compile")
});

/// Pads a short BIC with the primary office branch code.
///
/// Surrounding whitespace is removed. BICs of any other length are
/// returned trimmed but otherwise unchanged.
pub fn expand_bic(bic: &str) -> Cow<'_, str> {
    let bic = bic.trim();
    if bic.len() == SHORT_BIC_LENGTH {
        Cow::Owned(format!("{bic}{PRIMARY_OFFICE}"))
    } else {
        Cow::Borrowed(bic)
    }
}

/// Returns `true` for a structurally valid 8- or 11-character BIC.
///
/// Letters must be uppercase.
///
/// ```
/// use iban_registry_core::is_valid_bic;
///
/// assert!(is_valid_bic("BSLJSI2X"));
/// assert!(is_valid_bic("SUBASKBXXXX"));
/// assert!(!is_valid_bic("subaskbx"));
/// assert!(!is_valid_bic("1UBASKBX"));
/// ```
pub fn is_valid_bic(bic: &str) -> bool {
    BIC_RE.is_match(&expand_bic(bic))
}

/// Country code embedded in a BIC (characters 5 and 6).
pub fn bic_country(bic: &str) -> Option<&str> {
    bic.trim().get(4..6)
}
