//! Rendering received line bytes as text.

use encoding_rs::{GBK, UTF_16LE, UTF_8};

use crate::error::ChannelError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Auto,
    Utf8,
    Utf16,
    Ascii,
    Gbk,
}

impl std::str::FromStr for TextEncoding {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "utf-16" | "utf16" => Ok(Self::Utf16),
            "ascii" => Ok(Self::Ascii),
            "gbk" | "gb2312" => Ok(Self::Gbk),
            other => Err(ChannelError::InvalidArgument(format!("unknown encoding '{other}'"))),
        }
    }
}

impl TextEncoding {
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Auto => detect_and_decode(bytes),
            Self::Utf8 => UTF_8.decode_without_bom_handling(bytes).0.into_owned(),
            Self::Utf16 => UTF_16LE.decode_without_bom_handling(bytes).0.into_owned(),
            Self::Ascii => bytes.iter().map(|&b| if b.is_ascii() { b as char } else { '?' }).collect(),
            Self::Gbk => GBK.decode_without_bom_handling(bytes).0.into_owned(),
        }
    }
}

fn detect_and_decode(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_owned();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true).decode_without_bom_handling(bytes).0.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("gb2312".parse::<TextEncoding>().unwrap(), TextEncoding::Gbk);
        assert!("latin9".parse::<TextEncoding>().is_err());
    }

    #[test]
    fn ascii_masks_high_bytes() {
        assert_eq!(TextEncoding::Ascii.decode(&[b'o', b'k', 0xFF]), "ok?");
    }

    #[test]
    fn auto_passes_utf8_through() {
        assert_eq!(TextEncoding::Auto.decode("héllo".as_bytes()), "héllo");
        assert_eq!(TextEncoding::Auto.decode(b""), "");
    }
}
