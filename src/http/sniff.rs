//! Content-type sniffing for responses without a `Content-Type` header.
//!
//! A reduced form of the WHATWG MIME sniffing algorithm: enough to tell an
//! HTML document apart from everything else, plus a few common signatures.

/// Only the first 512 bytes are considered.
const SNIFF_LEN: usize = 512;

pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const TEXT_XML: &str = "text/xml; charset=utf-8";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Tag openings that mark an HTML document. Each must be followed by a space
/// or `>` to match.
const HTML_SIGNATURES: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const MAGIC_SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"\x1f\x8b\x08", "application/x-gzip"),
];

/// Guess the media type of a body from its first bytes.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    let start = data
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(data.len());
    let trimmed = &data[start..];

    if HTML_SIGNATURES.iter().any(|sig| matches_html(trimmed, sig)) {
        return TEXT_HTML;
    }
    if trimmed.starts_with(b"<?xml") {
        return TEXT_XML;
    }
    for &(magic, media_type) in MAGIC_SIGNATURES {
        if data.starts_with(magic) {
            return media_type;
        }
    }
    if looks_like_text(data) {
        return TEXT_PLAIN;
    }
    OCTET_STREAM
}

/// True if the media type names an HTML document.
pub fn is_html(content_type: &str) -> bool {
    content_type.starts_with("text/html")
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | 0x0c | b'\r' | b' ')
}

fn matches_html(data: &[u8], signature: &[u8]) -> bool {
    if data.len() <= signature.len() {
        return false;
    }
    let head = &data[..signature.len()];
    if !head.eq_ignore_ascii_case(signature) {
        return false;
    }
    matches!(data[signature.len()], b' ' | b'>')
}

/// UTF-8 text without binary control bytes.
fn looks_like_text(data: &[u8]) -> bool {
    let binary = data
        .iter()
        .any(|&b| matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f));
    if binary {
        return false;
    }
    match std::str::from_utf8(data) {
        Ok(_) => true,
        // A multi-byte character cut off by the sniff window is still text.
        Err(e) => e.error_len().is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_documents() {
        assert_eq!(detect_content_type(b"<!doctype html><body></body>"), TEXT_HTML);
        assert_eq!(detect_content_type(b"\n  <HTML lang=\"en\">"), TEXT_HTML);
        assert_eq!(detect_content_type(b"<p>hello</p>"), TEXT_HTML);
        assert_eq!(detect_content_type(b"<!-- comment -->"), TEXT_HTML);
    }

    #[test]
    fn tag_must_be_terminated() {
        assert_eq!(detect_content_type(b"<pre>x</pre>"), TEXT_PLAIN);
        assert_eq!(detect_content_type(b"<html"), TEXT_PLAIN);
    }

    #[test]
    fn json_that_mentions_html_is_not_html() {
        let body = br#"{"content":"<!doctype html><body></body>"}"#;
        assert_eq!(detect_content_type(body), TEXT_PLAIN);
        assert!(!is_html(detect_content_type(body)));
    }

    #[test]
    fn binary_signatures() {
        assert_eq!(detect_content_type(b"%PDF-1.7"), "application/pdf");
        assert_eq!(detect_content_type(b"\x89PNG\r\n\x1a\n\0\0"), "image/png");
        assert_eq!(detect_content_type(&[0u8, 1, 2, 3]), OCTET_STREAM);
    }

    #[test]
    fn xml_and_empty() {
        assert_eq!(detect_content_type(b"<?xml version=\"1.0\"?>"), TEXT_XML);
        assert_eq!(detect_content_type(b""), TEXT_PLAIN);
    }

    #[test]
    fn html_media_type_prefix() {
        assert!(is_html("text/html"));
        assert!(is_html("text/html; charset=utf-8"));
        assert!(!is_html("application/xhtml+xml"));
        assert!(!is_html("text/plain"));
    }
}
