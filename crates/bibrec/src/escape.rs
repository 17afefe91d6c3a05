//! Field value normalization
//!
//! Raw values captured from BibTeX-like field lines go through four steps,
//! in this order:
//! 1. [`strip_braces`] - unwrap brace groups around non-whitespace runs
//! 2. [`strip_quotes`] - trim outer quote and brace characters
//! 3. [`unescape`] - turn `\&` into `&`
//! 4. [`escape`] - double every `%` so the value survives later
//!    percent-style substitution
//!
//! None of these is idempotent; each is meant to be applied once.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A brace group whose content has no whitespace, e.g. `{LaTeX}`
    static ref BRACE_GROUP: Regex = Regex::new(r"\{(\S+?)\}").unwrap();
}

/// Characters trimmed from both ends by [`strip_quotes`]
const QUOTE_CHARS: &[char] = &['"', '{', '}'];

/// Remove the braces around every brace group that contains no whitespace.
///
/// `{2020}` becomes `2020` and `The {LaTeX} Guide` becomes `The LaTeX Guide`.
/// Groups containing whitespace (`{Doe, Jane}`) are left for
/// [`strip_quotes`].
pub fn strip_braces(s: &str) -> String {
    BRACE_GROUP.replace_all(s, "$1").into_owned()
}

/// Trim `"`, `{` and `}` from both ends of the value.
///
/// This is a character-set trim, not a balanced-delimiter check, so a value
/// that legitimately starts or ends with one of those characters loses it:
/// `"quoted"extra"` becomes `quoted"extra`.
pub fn strip_quotes(s: &str) -> String {
    s.trim_matches(QUOTE_CHARS).to_string()
}

/// Replace every `\&` with `&`
pub fn unescape(s: &str) -> String {
    s.replace("\\&", "&")
}

/// Replace every `%` with `%%`
pub fn escape(s: &str) -> String {
    s.replace('%', "%%")
}

/// Run the full pipeline on a raw value.
///
/// Returns `None` when the result is empty or whitespace-only, in which case
/// the field should not be stored at all.
pub fn normalize_value(raw: &str) -> Option<String> {
    let value = strip_braces(raw);
    let value = strip_quotes(&value);
    let value = unescape(&value);
    let value = escape(&value);
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
