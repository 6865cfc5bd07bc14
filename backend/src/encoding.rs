//! Charset detection and decoding for raw subprocess output.
//!
//! Output from POSIX locales is UTF-8, legacy Windows consoles with a Chinese
//! code page emit GBK. Anything else is not decoded at all.

use encoding_rs::{Encoding, GB18030, GBK};
use tracing::trace;

/// Text encodings understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Gbk,
    Gb18030,
}

/// Structural GBK check: ASCII bytes stand alone, every other byte must be
/// a lead byte `0x81..=0xFE` followed by a trail byte `0x40..=0xFE` (not `0x7F`).
pub fn is_gbk(data: &[u8]) -> bool {
    let mut i = 0;
    while i < data.len() {
        let lead = data[i];
        if lead <= 0x7F {
            i += 1;
            continue;
        }
        if !(0x81..=0xFE).contains(&lead) {
            return false;
        }
        match data.get(i + 1) {
            Some(&trail) if (0x40..=0xFE).contains(&trail) && trail != 0x7F => i += 2,
            _ => return false,
        }
    }
    true
}

/// Picks the charset for `data`, preferring UTF-8 over GBK.
pub fn detect(data: &[u8]) -> Option<Charset> {
    if std::str::from_utf8(data).is_ok() {
        Some(Charset::Utf8)
    } else if is_gbk(data) {
        Some(Charset::Gbk)
    } else {
        None
    }
}

/// Converts `data` from `charset` to a `String`.
///
/// Conversion errors are not reported; malformed input yields an empty string.
pub fn decode_as(data: &[u8], charset: Charset) -> String {
    match charset {
        Charset::Utf8 => std::str::from_utf8(data)
            .map(str::to_owned)
            .unwrap_or_default(),
        Charset::Gbk => decode_legacy(GBK, data),
        Charset::Gb18030 => decode_legacy(GB18030, data),
    }
}

/// Detects the charset of `data` and decodes it, or returns an empty string
/// when the bytes are neither UTF-8 nor GBK.
pub fn decode(data: &[u8]) -> String {
    match detect(data) {
        Some(charset) => decode_as(data, charset),
        None => {
            trace!("{} bytes in unrecognized encoding left undecoded", data.len());
            String::new()
        }
    }
}

/// Like [`decode`], but bytes in an unrecognized encoding are kept with
/// invalid sequences replaced instead of being dropped.
///
/// Used for tabular tool output, where losing one odd byte must not lose the row.
pub fn decode_lossy(data: &[u8]) -> String {
    match detect(data) {
        Some(charset) => decode_as(data, charset),
        None => String::from_utf8_lossy(data).into_owned(),
    }
}

fn decode_legacy(encoding: &'static Encoding, data: &[u8]) -> String {
    encoding
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|text| text.into_owned())
        .unwrap_or_default()
}
