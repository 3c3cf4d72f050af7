//! Character encoding detection and conversion for input documents.

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([A-Za-z0-9_\-:.]+)"#).unwrap()
});

/// Decode an HTML document to UTF-8.
///
/// Order: byte-order mark, `<meta charset>` declaration, strict UTF-8,
/// then Windows-1252 as the fallback for legacy pages.
pub fn decode_html(bytes: &[u8]) -> (String, &'static str) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (result, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (result.into_owned(), encoding.name());
    }

    if let Some(label) = detect_meta_charset(bytes) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            let (result, had_errors) = encoding.decode_without_bom_handling(bytes);
            if had_errors {
                log::warn!("Input is not valid {}; some characters were replaced", encoding.name());
            }
            return (result.into_owned(), encoding.name());
        }
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), "UTF-8"),
        Err(_) => {
            let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            (result.into_owned(), "windows-1252")
        }
    }
}

/// Find the charset declared by a `<meta>` tag in the first kilobyte.
pub fn detect_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(1024)];
    let caps = META_CHARSET.captures(head)?;
    Some(String::from_utf8_lossy(&caps[1]).to_string())
}
