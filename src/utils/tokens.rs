//! Splitting pasted input into URL tokens.

/// Split pasted text into URL tokens.
///
/// Tokens are separated by newlines or commas; surrounding whitespace is
/// trimmed and empty tokens are dropped. No URL validation happens here.
///
/// ```rust
/// use vidq::utils::split_url_input;
///
/// let urls = split_url_input("https://a.test, https://b.test\nhttps://c.test");
/// assert_eq!(urls.len(), 3);
/// assert_eq!(urls[0], "https://a.test");
/// ```
pub fn split_url_input(input: &str) -> Vec<String> {
    input
        .split(['\n', ','])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}
