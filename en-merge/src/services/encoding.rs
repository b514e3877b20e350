use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Decodes a downloaded word list to text.
///
/// UTF-8 (with or without BOM) is taken as is; anything else goes through
/// `chardetng` and is decoded lossily with the guessed encoding.
pub fn decode_text(bytes: &[u8]) -> (String, &'static Encoding) {
    // BOM UTF-8 (EF BB BF)
    let body = bytes.strip_prefix(&b"\xEF\xBB\xBF"[..]).unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(body) {
        return (text.to_string(), UTF_8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);

    let (text, _, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::warn!(
            encoding = encoding.name(),
            "Undecodable bytes replaced while decoding word list"
        );
    }

    (text.into_owned(), encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_passes_through() {
        let (text, enc) = decode_text("naïve\tnaive\n".as_bytes());
        assert_eq!(text, "naïve\tnaive\n");
        assert_eq!(enc, UTF_8);
    }

    #[test]
    fn bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"a\t1\n");
        let (text, _) = decode_text(&bytes);
        assert_eq!(text, "a\t1\n");
    }

    #[test]
    fn legacy_single_byte_text_is_decoded() {
        let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode("caf\u{e9}\tcafe\nna\u{ef}ve\tnaive\n");
        let (text, enc) = decode_text(&encoded);

        assert_ne!(enc, UTF_8);
        assert!(text.contains("\tcafe\n"));
        assert!(text.contains("\tnaive\n"));
    }
}
