use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use evkin::compression::Compression;

use crate::opt_common::*;

pub(crate) const INPUT: SampleLocation = SampleLocation {
    dir: "hepmc",
    extension: "hepmc",
};

pub(crate) const OUTPUT: SampleLocation = SampleLocation {
    dir: "tables",
    extension: "yaml",
};

/// Convert generator event files into particle tables
#[derive(Debug, Parser)]
#[clap(author, version)]
pub(crate) struct Opt {
    /// Output file.
    #[clap(long, short, value_parser)]
    pub(crate) outfile: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) sample: SampleOpt,

    /// Input event file. Compressed files are supported.
    #[clap(name = "INFILE", value_parser)]
    pub(crate) infile: Option<PathBuf>,

    /// Input file format.
    #[clap(value_enum, long, default_value = "auto")]
    pub(crate) format: InputFormat,

    /// Maximum number of events to read.
    #[clap(long)]
    pub(crate) max_events: Option<usize>,

    /// Name of the particle table in the output file.
    #[clap(long, default_value = "events")]
    pub(crate) tree_name: String,

    #[clap(long, value_parser = Compression::from_str,
           help = "Compress output file.
Possible settings are 'bzip2', 'gzip', 'zstd', 'lz4'.
Compression levels can be set with algorithm_level e.g. 'zstd_5'.
Maximum levels are 'gzip_9', 'zstd_19', 'lz4_16'.")]
    pub(crate) compression: Option<Compression>,

    #[clap(flatten)]
    pub(crate) log: LogOpt,
}

impl Opt {
    pub(crate) fn io_files(&self) -> Result<(PathBuf, PathBuf), ValidationError> {
        self.sample.io_files(
            self.infile.as_deref(),
            self.outfile.as_deref(),
            INPUT,
            OUTPUT,
        )
    }
}
