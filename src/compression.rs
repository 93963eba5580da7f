use std::io::Write;
use std::str::FromStr;

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

const GZIP_DEFAULT_LEVEL: u8 = 6;
const LZ4_DEFAULT_LEVEL: u8 = 0;
const ZSTD_DEFAULT_LEVEL: u8 = 0;

const GZIP_MAX_LEVEL: u8 = 9;
const LZ4_MAX_LEVEL: u8 = 16;
const ZSTD_MAX_LEVEL: u8 = 19;

lazy_static! {
    static ref COMPRESSION_RE: Regex =
        Regex::new(r"^(?P<algo>[[:alnum:]]+)(?P<lvl>_\d+)?$").unwrap();
}

/// Compression format
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Compression {
    /// The bzip2 format
    Bzip2,
    /// The gzip format with compression level as associated value
    Gzip(u8),
    /// The lz4 format with compression level as associated value
    Lz4(u8),
    /// The zstd format with compression level as associated value
    Zstd(u8),
}

impl FromStr for Compression {
    type Err = ParseCompressionErr;

    /// Parse specifications like `bzip2`, `gzip`, or `zstd_5`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Compression::*;
        use ParseCompressionErr::*;

        let lower_case = s.to_ascii_lowercase();
        let Some(captures) = COMPRESSION_RE.captures(&lower_case) else {
            return Err(UnknownAlgorithm(s.to_owned()));
        };
        let algo = &captures["algo"];
        let lvl = captures.name("lvl").map(|l| l.as_str());
        let parse_lvl = |default: u8, max: u8| match lvl {
            None => Ok(default),
            Some(lvl_str) => match lvl_str[1..].parse::<u8>() {
                Ok(lvl) if lvl <= max => Ok(lvl),
                _ => Err(UnsupportedLevel(lvl_str.to_owned(), algo.into())),
            },
        };
        match algo {
            "bzip2" | "bz2" => match lvl {
                None => Ok(Bzip2),
                Some(lvl_str) => {
                    Err(UnsupportedLevel(lvl_str.to_owned(), algo.into()))
                }
            },
            "gzip" | "gz" => {
                parse_lvl(GZIP_DEFAULT_LEVEL, GZIP_MAX_LEVEL).map(Gzip)
            }
            "lz4" => parse_lvl(LZ4_DEFAULT_LEVEL, LZ4_MAX_LEVEL).map(Lz4),
            "zstd" | "zstandard" => {
                parse_lvl(ZSTD_DEFAULT_LEVEL, ZSTD_MAX_LEVEL).map(Zstd)
            }
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Error parsing a compression specification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseCompressionErr {
    #[error("Unknown compression algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Level {0} not supported for {1} compression")]
    UnsupportedLevel(String, String),
}

/// Convert into a writer that compresses to the given format
pub fn compress_writer<'a, W: 'a + Write>(
    writer: W,
    compression: Option<Compression>,
) -> Result<Box<dyn Write + 'a>, std::io::Error> {
    match compression {
        Some(Compression::Bzip2) => {
            let encoder = BzEncoder::new(writer, bzip2::Compression::best());
            Ok(Box::new(encoder))
        }
        Some(Compression::Gzip(lvl)) => {
            let encoder =
                GzEncoder::new(writer, flate2::Compression::new(lvl.into()));
            Ok(Box::new(encoder))
        }
        Some(Compression::Lz4(lvl)) => {
            let encoder = lz4::EncoderBuilder::new()
                .auto_flush(true)
                .level(lvl.into())
                .build(writer)?;
            Ok(Box::new(encoder))
        }
        Some(Compression::Zstd(lvl)) => {
            let encoder = zstd::Encoder::new(writer, lvl.into())?;
            Ok(Box::new(encoder.auto_finish()))
        }
        None => Ok(Box::new(writer)),
    }
}
