//! Normalization of topics, locators and cache identifiers.
//!
//! Everything that turns free text or a remote URL into something safe to
//! use as a file name or cache key lives here.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Runs of characters that are not allowed in a file name component.
static UNSAFE_FILE_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

/// Repeated separators left behind by sanitizing.
static SEPARATOR_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_.-]{2,}").unwrap());

/// Query string or fragment at the end of a URL.
static URL_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?#].*$").unwrap());

/// Fallback stem when a topic has no usable characters.
const DEFAULT_FILE_STEM: &str = "talk";

/// Strip diacritics by decomposing and dropping combining marks.
fn fold_to_ascii(text: &str) -> String {
    text.nfkd().filter(|c| c.is_ascii()).collect()
}

/// Make a single path component safe for the local file system.
///
/// Returns an empty string when nothing usable remains.
pub fn sanitize_component(text: &str) -> String {
    let folded = fold_to_ascii(text.trim());
    let replaced = UNSAFE_FILE_CHARS_REGEX.replace_all(&folded, "_");
    let collapsed = SEPARATOR_RUN_REGEX.replace_all(&replaced, "_");
    collapsed.trim_matches(|c| c == '_' || c == '.').to_string()
}

/// Base file name for a saved talk about `topic`.
pub fn file_stem_from_topic(topic: &str) -> String {
    let stem = sanitize_component(topic);
    if stem.is_empty() {
        DEFAULT_FILE_STEM.to_string()
    } else {
        stem
    }
}

/// Last path segment of a URL, without query string or fragment.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let without_suffix = URL_SUFFIX_REGEX.replace(url, "");
    let last = without_suffix.trim_end_matches('/').rsplit('/').next()?;
    let name = sanitize_component(last);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Normalized cache identifier for a remote asset.
///
/// The source part may contain `/` to nest groups (for example
/// `reddit/hmmm+wtf`); each segment is sanitized on its own.
pub fn cache_key(source: &str, url: &str) -> Option<String> {
    let name = file_name_from_url(url)?;
    let mut segments: Vec<String> = source
        .split('/')
        .map(sanitize_component)
        .filter(|s| !s.is_empty())
        .collect();
    segments.push(name);
    Some(segments.join("/"))
}

/// Capitalize the first letter of every word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("cat"), "cat");
        assert_eq!(sanitize_component("black cat"), "black_cat");
        assert_eq!(sanitize_component("  what?! no  "), "what_no");
        assert_eq!(sanitize_component("café"), "cafe");
        assert_eq!(sanitize_component("../../etc"), "etc");
    }

    #[test]
    fn test_file_stem_from_topic() {
        assert_eq!(file_stem_from_topic("Cats and dogs"), "Cats_and_dogs");
        assert_eq!(file_stem_from_topic("???"), "talk");
        assert_eq!(file_stem_from_topic(""), "talk");
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("https://i.redd.it/abc123.jpg"),
            Some("abc123.jpg".to_string())
        );
        assert_eq!(
            file_name_from_url("https://example.com/img/photo.png?width=640#top"),
            Some("photo.png".to_string())
        );
        assert_eq!(
            file_name_from_url("https://example.com/dir/"),
            Some("dir".to_string())
        );
        assert_eq!(file_name_from_url("https://example.com/%%%/"), None);
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(
            cache_key("reddit/hmmm+wtf", "https://i.redd.it/abc.jpg"),
            Some("reddit/hmmm_wtf/abc.jpg".to_string())
        );
        assert_eq!(
            cache_key("inspirobot", "https://generated.inspirobot.me/a/xyz.jpg"),
            Some("inspirobot/xyz.jpg".to_string())
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("black cat"), "Black Cat");
        assert_eq!(title_case("HOW to   pet"), "How To Pet");
        assert_eq!(title_case(""), "");
    }
}
