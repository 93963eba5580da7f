use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use evkin::{compression::Compression, kinematics::DEFAULT_INVISIBLE_MASS};

use crate::opt_common::*;

pub(crate) const INPUT: SampleLocation = SampleLocation {
    dir: "tables",
    extension: "yaml",
};

pub(crate) const OUTPUT: SampleLocation = SampleLocation {
    dir: "derived",
    extension: "yaml",
};

/// Compute dilepton observables from particle tables
#[derive(Debug, Parser)]
#[clap(author, version)]
pub(crate) struct Opt {
    /// Output file.
    #[clap(long, short, value_parser)]
    pub(crate) outfile: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) sample: SampleOpt,

    /// Input file with a particle table.
    #[clap(name = "INFILE", value_parser)]
    pub(crate) infile: Option<PathBuf>,

    /// Name of the particle table in the input file.
    #[clap(long, default_value = "events")]
    pub(crate) tree_name: String,

    /// Mass hypothesis in GeV for each invisible particle in MT2.
    #[clap(long, default_value_t = DEFAULT_INVISIBLE_MASS)]
    pub(crate) invisible_mass: f64,

    /// Minimum missing transverse momentum in GeV.
    #[clap(long, default_value_t = 1.)]
    pub(crate) min_met: f64,

    /// Minimum lepton transverse momentum in GeV.
    #[clap(long, default_value_t = 25.)]
    pub(crate) min_lepton_pt: f64,

    #[clap(long, value_parser = Compression::from_str,
           help = "Compress output file.
Possible settings are 'bzip2', 'gzip', 'zstd', 'lz4'.
Compression levels can be set with algorithm_level e.g. 'zstd_5'.
Maximum levels are 'gzip_9', 'zstd_19', 'lz4_16'.")]
    pub(crate) compression: Option<Compression>,

    #[clap(
        long,
        default_value_t,
        help = "Number of threads.

If set to 0, a default number of threads is chosen.
The default can be set with the `RAYON_NUM_THREADS` environment
variable."
    )]
    pub(crate) threads: usize,

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
