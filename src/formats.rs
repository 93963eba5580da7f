use strum::{Display, EnumString};

use crate::util::trim_ascii_start;

/// Supported event file formats
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    EnumString,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "lowercase")]
pub enum FileFormat {
    /// HepMC2 format, also known as `IO_GenEvent`
    #[default]
    HepMC2,
    #[cfg(feature = "lhef")]
    /// Les Houches Event Format
    Lhef,
}

const LHEF_STARTS: [&[u8]; 3] = [b"<LesHouchesEvents", b"<?xml", b"<event"];

/// Guess the format from the start of the (decompressed) file content
///
/// Anything that looks like XML is treated as a Les Houches Event File,
/// everything else as HepMC2.
pub fn detect_format(start: &[u8]) -> DetectedFormat {
    let start = trim_ascii_start(start);
    if LHEF_STARTS.iter().any(|tag| start.starts_with(tag)) {
        #[cfg(feature = "lhef")]
        return DetectedFormat::Supported(FileFormat::Lhef);
        #[cfg(not(feature = "lhef"))]
        return DetectedFormat::Unsupported("Les Houches Event File");
    }
    DetectedFormat::Supported(FileFormat::HepMC2)
}

/// Result of format detection
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DetectedFormat {
    Supported(FileFormat),
    /// Recognised format without support in this build
    Unsupported(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect() {
        use DetectedFormat::Supported;

        assert_eq!(
            detect_format(b"HepMC::Version 2.06.09\n"),
            Supported(FileFormat::HepMC2)
        );
        assert_eq!(detect_format(b""), Supported(FileFormat::HepMC2));
        #[cfg(feature = "lhef")]
        {
            assert_eq!(
                detect_format(b"\n  <LesHouchesEvents version=\"3.0\">"),
                Supported(FileFormat::Lhef)
            );
            assert_eq!(
                detect_format(b"<?xml version=\"1.0\"?>"),
                Supported(FileFormat::Lhef)
            );
        }
    }

    #[test]
    fn names() {
        assert_eq!(FileFormat::HepMC2.to_string(), "hepmc2");
        assert_eq!("HepMC2".parse::<FileFormat>().unwrap(), FileFormat::HepMC2);
        #[cfg(feature = "lhef")]
        assert_eq!("lhef".parse::<FileFormat>().unwrap(), FileFormat::Lhef);
    }
}
