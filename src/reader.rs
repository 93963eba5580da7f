use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use audec::auto_decompress;
use log::{debug, info};
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{
    formats::{detect_format, DetectedFormat, FileFormat},
    hepmc2::HepMC2Parser,
    parser::ParsedEvents,
    traits::ParseEvents,
};

#[cfg(feature = "lhef")]
use crate::lhef::LHEFParser;

/// Reader for (potentially compressed) event files
///
/// Without an explicit format, the format is determined from the start
/// of the decompressed file content.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct EventFileReader {
    #[builder(default)]
    format: Option<FileFormat>,
    /// Stop after this many complete events
    #[builder(default)]
    max_events: Option<usize>,
}

impl EventFileReader {
    /// Read all events from the file at `path`
    pub fn read(&self, path: impl AsRef<Path>) -> Result<ParsedEvents, ReadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ReadError::Open {
            path: path.to_owned(),
            source,
        })?;
        let mut reader = auto_decompress(BufReader::new(file));
        let format = match self.format {
            Some(format) => format,
            None => {
                let start = reader.fill_buf().map_err(|source| {
                    ReadError::Read {
                        path: path.to_owned(),
                        source,
                    }
                })?;
                match detect_format(start) {
                    DetectedFormat::Supported(format) => format,
                    DetectedFormat::Unsupported(format) => {
                        return Err(ReadError::Unsupported {
                            path: path.to_owned(),
                            format,
                        })
                    }
                }
            }
        };
        info!("Reading {path:?} as {format}");
        let parsed = self.parse(format, reader).map_err(|source| {
            ReadError::Read {
                path: path.to_owned(),
                source,
            }
        })?;
        debug!("Parse statistics: {:?}", parsed.stats);
        Ok(parsed)
    }

    /// Read all events in the given format from a buffered reader
    pub fn parse<B: BufRead>(
        &self,
        format: FileFormat,
        reader: B,
    ) -> Result<ParsedEvents, std::io::Error> {
        match format {
            FileFormat::HepMC2 => {
                HepMC2Parser::with_max_events(self.max_events)
                    .parse_events(reader)
            }
            #[cfg(feature = "lhef")]
            FileFormat::Lhef => {
                LHEFParser::with_max_events(self.max_events)
                    .parse_events(reader)
            }
        }
    }
}

/// Error reading an event file
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to open {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read from {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?} looks like a {format}, which is not supported by this build")]
    Unsupported { path: PathBuf, format: &'static str },
}
