//! Turning the agent's free-text answer into a URL.

use std::sync::LazyLock;

use regex::Regex;

use ff_core::Error;

pub const UNABLE_TO_FIND: &str = "Unable to find foundation URL";
pub const NO_VALID_URL: &str = "No valid URL found in response";

const NEGATIVE_MARKERS: &[&str] = &["not found", "unable to", "no official website", "sorry"];

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid URL regex"));

/// Extract the first URL from a raw answer.
///
/// Answers that admit failure, or carry no well-formed URL, are `NoAnswer`.
pub fn extract_url(raw: &str) -> Result<String, Error> {
    let text = raw.trim();
    let lowered = text.to_lowercase();
    if NEGATIVE_MARKERS.iter().any(|m| lowered.contains(m)) {
        return Err(Error::no_answer(UNABLE_TO_FIND));
    }

    let token = URL_PATTERN
        .find(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ')', ']']))
        .ok_or_else(|| Error::no_answer(NO_VALID_URL))?;

    let host_part = token
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    if !host_part.contains('.') {
        return Err(Error::no_answer(NO_VALID_URL));
    }

    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: Error) -> String {
        match err {
            Error::NoAnswer(m) => m,
            other => panic!("expected NoAnswer, got {other:?}"),
        }
    }

    #[test]
    fn test_url_inside_prose() {
        let url = extract_url("The official site is https://www.example.org/about, see also...").unwrap();
        assert_eq!(url, "https://www.example.org/about");
    }

    #[test]
    fn test_negative_marker() {
        let err = extract_url("Unable to find an official website for this foundation.").unwrap_err();
        assert_eq!(message(err), UNABLE_TO_FIND);

        let err = extract_url("NOT FOUND").unwrap_err();
        assert_eq!(message(err), UNABLE_TO_FIND);
    }

    #[test]
    fn test_no_scheme() {
        let err = extract_url("I think it might be example").unwrap_err();
        assert_eq!(message(err), NO_VALID_URL);
    }

    #[test]
    fn test_bare_url_and_trailing_punctuation() {
        assert_eq!(
            extract_url("  https://www.fordfoundation.org\n").unwrap(),
            "https://www.fordfoundation.org"
        );
        assert_eq!(
            extract_url("(see [https://hewlett.org/].)").unwrap(),
            "https://hewlett.org/"
        );
    }

    #[test]
    fn test_truncated_url_rejected() {
        let err = extract_url("https://localhost").unwrap_err();
        assert_eq!(message(err), NO_VALID_URL);
    }
}
