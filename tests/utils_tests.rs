//! Tests for the utility helpers.

use vidq::utils::{format_bytes, format_eta, format_speed, split_url_input};

#[test]
fn test_split_on_commas() {
    let urls = split_url_input("https://a.test,https://b.test, https://c.test");
    assert_eq!(urls, ["https://a.test", "https://b.test", "https://c.test"]);
}

#[test]
fn test_split_on_newlines() {
    let urls = split_url_input("https://a.test\nhttps://b.test\r\nhttps://c.test");
    assert_eq!(urls, ["https://a.test", "https://b.test", "https://c.test"]);
}

#[test]
fn test_split_mixed_separators_and_whitespace() {
    let urls = split_url_input("  https://a.test , https://b.test\n\nhttps://c.test,\n");
    assert_eq!(urls, ["https://a.test", "https://b.test", "https://c.test"]);
}

#[test]
fn test_split_drops_empty_tokens() {
    assert!(split_url_input("").is_empty());
    assert!(split_url_input(", ,\n ,").is_empty());
}

#[test]
fn test_split_token_count_matches_nonempty_tokens() {
    let input = "https://a.test, https://b.test\nhttps://c.test";
    assert_eq!(split_url_input(input).len(), 3);
}

#[test]
fn test_format_bytes() {
    assert_eq!(format_bytes(512.0), "512 B");
    assert_eq!(format_bytes(1536.0), "1.5 KiB");
    assert_eq!(format_bytes(1024.0 * 1024.0 * 2.25), "2.2 MiB");
    assert_eq!(format_bytes(-1.0), "0 B");
}

#[test]
fn test_format_speed() {
    assert_eq!(format_speed(1024.0 * 1024.0), "1.0 MiB/s");
    assert_eq!(format_speed(0.0), "0 B/s");
}

#[test]
fn test_format_eta() {
    assert_eq!(format_eta(0), "00:00");
    assert_eq!(format_eta(41), "00:41");
    assert_eq!(format_eta(151), "02:31");
    assert_eq!(format_eta(3723), "1:02:03");
}
