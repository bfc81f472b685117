//! Utility functions for converting between the binary buffers consumed by the platform and the
//! text representations used on the wire.
//!
//! Every binary field that crosses the wire is base64url encoded without padding. Decoding is
//! lenient: padded input is accepted and so are the `+` and `/` characters of the standard
//! alphabet.

use data_encoding::{DecodeKind, Encoding, Specification, BASE64, BASE64URL_NOPAD};

pub use data_encoding::DecodeError;

/// Convert bytes to base64url without padding.
///
/// The output never contains `+`, `/` or `=`.
pub fn base64url(data: &[u8]) -> String {
    BASE64URL_NOPAD.encode(data)
}

/// Try parsing from base64url with or without padding.
///
/// The URL-safe alphabet is mapped back onto the standard one before decoding, so standard
/// base64 input is accepted as well. Padding may be partial but never extends past the next
/// multiple of four characters.
pub fn try_from_base64url(input: &str) -> Result<Vec<u8>, DecodeError> {
    let data = input.trim_end_matches('=');
    let allowed_padding = (4 - data.len() % 4) % 4;
    if input.len() - data.len() > allowed_padding {
        return Err(DecodeError {
            position: data.len() + allowed_padding,
            kind: DecodeKind::Padding,
        });
    }

    let standard: String = data
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    lenient_base64().decode(standard.as_bytes())
}

/// Encode text into its UTF-8 byte representation.
pub fn utf8_encode(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

/// Decode UTF-8 bytes into text. Invalid sequences are replaced with `U+FFFD`.
pub fn utf8_decode(value: &[u8]) -> String {
    String::from_utf8_lossy(value).into_owned()
}

fn lenient_base64() -> Encoding {
    let specs = Specification {
        check_trailing_bits: false,
        padding: None,
        ..BASE64.specification()
    };
    // SAFETY: the specification is derived from a valid built-in one with only the padding
    // and trailing bit checks relaxed, which cannot make it invalid.
    specs.encoding().unwrap()
}
