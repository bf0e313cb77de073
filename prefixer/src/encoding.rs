//! Prefix normalization into a target text encoding.
//!
//! Labels follow the WHATWG Encoding Standard as implemented by
//! [`encoding_rs`], so `UTF-8`, `utf8`, `latin1`, `windows-1252` and
//! `UTF-16LE` all resolve. Conversion is byte-level transcoding, never a case
//! transform.

use std::borrow::Cow;

use encoding_rs::{Encoding, REPLACEMENT, UTF_16BE, UTF_16LE};

use crate::error::{PrefixError, Result};

/// Target encoding for prefixed identifiers.
///
/// # Examples
///
/// ```
/// use table_prefix::PrefixEncoding;
///
/// let latin = PrefixEncoding::for_label("ISO-8859-1").unwrap();
/// assert_eq!(latin.name(), "windows-1252");
/// assert_eq!(latin.encode("é").unwrap(), vec![0xE9]);
///
/// assert!(PrefixEncoding::for_label("EBCDIC-UNKNOWN").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixEncoding {
    encoding: &'static Encoding,
}

impl PrefixEncoding {
    /// Resolves an encoding label (case-insensitive, surrounding whitespace
    /// ignored).
    ///
    /// # Errors
    ///
    /// Returns [`PrefixError::UnsupportedEncoding`] for unknown labels and
    /// for labels that map to the `replacement` pseudo-encoding, which
    /// cannot encode anything.
    pub fn for_label(label: &str) -> Result<Self> {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) if encoding != REPLACEMENT => Ok(Self { encoding }),
            _ => Err(PrefixError::UnsupportedEncoding(label.to_string())),
        }
    }

    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Encodes `text` into the exact byte sequence of this encoding.
    ///
    /// # Errors
    ///
    /// Returns [`PrefixError::UnmappableIdentifier`] when `text` contains a
    /// character the encoding cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        self.try_encode(text)
            .ok_or_else(|| PrefixError::UnmappableIdentifier {
                identifier: text.to_string(),
                encoding: self.name().to_string(),
            })
    }

    /// Converts `prefix` into this encoding and back.
    ///
    /// The result is the text the encoded bytes stand for; for any prefix
    /// that passes, it equals the input.
    ///
    /// # Errors
    ///
    /// Returns [`PrefixError::UnmappablePrefix`] when the prefix contains a
    /// character the encoding cannot represent.
    pub fn normalize(&self, prefix: &str) -> Result<String> {
        let unmappable = || PrefixError::UnmappablePrefix {
            prefix: prefix.to_string(),
            encoding: self.name().to_string(),
        };

        let bytes = self.try_encode(prefix).ok_or_else(unmappable)?;
        let (decoded, had_errors) = self.encoding.decode_without_bom_handling(&bytes);
        if had_errors {
            return Err(unmappable());
        }
        Ok(decoded.into_owned())
    }

    fn try_encode(&self, text: &str) -> Option<Vec<u8>> {
        // encoding_rs writes UTF-8 when asked to encode to UTF-16.
        if self.encoding == UTF_16LE {
            return Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
        }
        if self.encoding == UTF_16BE {
            return Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
        }

        let (bytes, _, had_unmappable): (Cow<'_, [u8]>, _, bool) = self.encoding.encode(text);
        if had_unmappable {
            return None;
        }
        Some(bytes.into_owned())
    }
}

impl Default for PrefixEncoding {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_case_insensitive() {
        assert_eq!(PrefixEncoding::for_label("UTF-8").unwrap().name(), "UTF-8");
        assert_eq!(PrefixEncoding::for_label("utf8").unwrap().name(), "UTF-8");
        assert_eq!(PrefixEncoding::for_label(" Latin1 ").unwrap().name(), "windows-1252");
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let err = PrefixEncoding::for_label("klingon").unwrap_err();
        assert!(matches!(err, PrefixError::UnsupportedEncoding(label) if label == "klingon"));
    }

    #[test]
    fn test_replacement_encoding_is_rejected() {
        assert!(PrefixEncoding::for_label("iso-2022-kr").is_err());
    }

    #[test]
    fn test_utf8_bytes_are_exact() {
        let utf8 = PrefixEncoding::default();
        assert_eq!(utf8.encode("🚀_user").unwrap(), "🚀_user".as_bytes());
        assert_eq!(utf8.normalize("préfixe_").unwrap(), "préfixe_");
    }

    #[test]
    fn test_single_byte_encoding() {
        let latin = PrefixEncoding::for_label("windows-1252").unwrap();
        assert_eq!(
            latin.encode("préfixe_user").unwrap(),
            b"pr\xE9fixe_user".to_vec()
        );
        assert_eq!(latin.normalize("préfixe_").unwrap(), "préfixe_");
    }

    #[test]
    fn test_unmappable_prefix_is_fatal() {
        let latin = PrefixEncoding::for_label("windows-1252").unwrap();
        let err = latin.normalize("🚀_").unwrap_err();
        assert!(matches!(err, PrefixError::UnmappablePrefix { .. }));

        let err = latin.encode("🚀_user").unwrap_err();
        assert!(matches!(err, PrefixError::UnmappableIdentifier { .. }));
    }

    #[test]
    fn test_utf16_uses_declared_byte_order() {
        let le = PrefixEncoding::for_label("UTF-16LE").unwrap();
        let be = PrefixEncoding::for_label("UTF-16BE").unwrap();
        assert_eq!(le.encode("é").unwrap(), vec![0xE9, 0x00]);
        assert_eq!(be.encode("é").unwrap(), vec![0x00, 0xE9]);
        assert_eq!(le.normalize("🚀_").unwrap(), "🚀_");
    }
}
