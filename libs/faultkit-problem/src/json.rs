//! JSON encoding with a configurable Unicode escaping policy
//!
//! Problem responses may travel through proxies and log pipelines that do not
//! cope with arbitrary UTF-8. The policy decides which characters are written
//! raw; everything else is written as a `\uXXXX` escape.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter, Serializer};

/// Named Unicode blocks that may be written unescaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnicodeRange {
    /// U+0000..U+007F
    BasicLatin,
    /// U+0080..U+00FF
    Latin1Supplement,
    /// U+0100..U+017F
    LatinExtendedA,
    /// U+0370..U+03FF
    GreekAndCoptic,
    /// U+0400..U+04FF
    Cyrillic,
    /// U+2000..U+206F
    GeneralPunctuation,
}

impl UnicodeRange {
    const fn bounds(self) -> (u32, u32) {
        match self {
            Self::BasicLatin => (0x0000, 0x007F),
            Self::Latin1Supplement => (0x0080, 0x00FF),
            Self::LatinExtendedA => (0x0100, 0x017F),
            Self::GreekAndCoptic => (0x0370, 0x03FF),
            Self::Cyrillic => (0x0400, 0x04FF),
            Self::GeneralPunctuation => (0x2000, 0x206F),
        }
    }

    #[must_use]
    pub fn contains(self, c: char) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&u32::from(c))
    }
}

/// Which characters are written raw in JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnicodePolicy {
    /// Write every character as raw UTF-8.
    Utf8,
    /// Write only characters from the listed blocks raw; escape the rest.
    Allow(Vec<UnicodeRange>),
}

impl Default for UnicodePolicy {
    fn default() -> Self {
        Self::Allow(vec![UnicodeRange::BasicLatin, UnicodeRange::Cyrillic])
    }
}

struct EscapingFormatter<'a> {
    allowed: &'a [UnicodeRange],
    inner: CompactFormatter,
}

impl EscapingFormatter<'_> {
    fn allows(&self, c: char) -> bool {
        self.allowed.iter().any(|r| r.contains(c))
    }
}

impl Formatter for EscapingFormatter<'_> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if self.allows(c) {
                continue;
            }
            if start < i {
                self.inner
                    .write_string_fragment(writer, &fragment[start..i])?;
            }
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04X}")?;
            }
            start = i + c.len_utf8();
        }
        self.inner.write_string_fragment(writer, &fragment[start..])
    }
}

/// Serialize `value` to JSON bytes under the given policy.
///
/// # Errors
/// Returns an error if `value` fails to serialize.
pub fn to_vec<T>(value: &T, policy: &UnicodePolicy) -> serde_json::Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    match policy {
        UnicodePolicy::Utf8 => serde_json::to_vec(value),
        UnicodePolicy::Allow(ranges) => {
            let mut out = Vec::with_capacity(128);
            let formatter = EscapingFormatter {
                allowed: ranges,
                inner: CompactFormatter,
            };
            let mut ser = Serializer::with_formatter(&mut out, formatter);
            value.serialize(&mut ser)?;
            Ok(out)
        }
    }
}
