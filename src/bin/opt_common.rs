use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use evkin::formats::FileFormat;
use thiserror::Error;

/// Directory with the input and output files of named samples
pub(crate) const DATA_DIR: &str = "data";

#[derive(Debug, Clone, Parser)]
pub(crate) struct LogOpt {
    /// Verbosity level
    #[clap(
        short,
        long,
        default_value = "Info",
        help = "Verbosity level.
Possible values with increasing amount of output are
'off', 'error', 'warn', 'info', 'debug', 'trace'.\n"
    )]
    pub(crate) loglevel: String,

    /// Enable debugging output. Overrides the verbosity level.
    #[clap(long)]
    pub(crate) debug: bool,
}

impl LogOpt {
    pub(crate) fn level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.loglevel
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct SampleOpt {
    /// Sample type.
    ///
    /// Selects default input and output files for the sample in the
    /// `data` directory.
    #[clap(short = 't', long = "type")]
    pub(crate) sample: Option<String>,
}

/// Location of a sample file relative to [DATA_DIR]
#[derive(Debug, Copy, Clone)]
pub(crate) struct SampleLocation {
    pub(crate) dir: &'static str,
    pub(crate) extension: &'static str,
}

impl SampleLocation {
    fn path(&self, sample: &str) -> PathBuf {
        let mut path = PathBuf::from_iter([DATA_DIR, self.dir, sample]);
        path.set_extension(self.extension);
        path
    }
}

impl SampleOpt {
    /// Determine input and output files
    ///
    /// Explicitly given files take precedence over the sample defaults.
    pub(crate) fn io_files(
        &self,
        infile: Option<&Path>,
        outfile: Option<&Path>,
        input: SampleLocation,
        output: SampleLocation,
    ) -> Result<(PathBuf, PathBuf), ValidationError> {
        let sample = self.sample.as_deref();
        let infile = match (infile, sample) {
            (Some(file), _) => file.to_owned(),
            (None, Some(sample)) => input.path(sample),
            (None, None) => return Err(ValidationError::MissingInput),
        };
        let outfile = match (outfile, sample) {
            (Some(file), _) => file.to_owned(),
            (None, Some(sample)) => output.path(sample),
            (None, None) => return Err(ValidationError::MissingOutput),
        };
        Ok((infile, outfile))
    }
}

#[derive(Debug, Clone, Error)]
pub(crate) enum ValidationError {
    #[error("Either an input file or a sample type (--type) is required")]
    MissingInput,
    #[error("Either an output file (--outfile) or a sample type (--type) is required")]
    MissingOutput,
}

#[derive(Debug, Default, Copy, Clone, ValueEnum)]
#[clap(rename_all = "lower")]
pub(crate) enum InputFormat {
    /// Determine format from the file content
    #[default]
    Auto,
    HepMC2,
    #[cfg(feature = "lhef")]
    Lhef,
}

impl InputFormat {
    pub(crate) fn file_format(self) -> Option<FileFormat> {
        match self {
            InputFormat::Auto => None,
            InputFormat::HepMC2 => Some(FileFormat::HepMC2),
            #[cfg(feature = "lhef")]
            InputFormat::Lhef => Some(FileFormat::Lhef),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: SampleLocation = SampleLocation {
        dir: "hepmc",
        extension: "hepmc",
    };
    const OUTPUT: SampleLocation = SampleLocation {
        dir: "tables",
        extension: "yaml",
    };

    #[test]
    fn sample_files() {
        let opt = SampleOpt {
            sample: Some("ww".to_owned()),
        };
        let (infile, outfile) = opt.io_files(None, None, INPUT, OUTPUT).unwrap();
        assert_eq!(infile, Path::new("data/hepmc/ww.hepmc"));
        assert_eq!(outfile, Path::new("data/tables/ww.yaml"));

        let (infile, outfile) = opt
            .io_files(Some(Path::new("in.hepmc")), None, INPUT, OUTPUT)
            .unwrap();
        assert_eq!(infile, Path::new("in.hepmc"));
        assert_eq!(outfile, Path::new("data/tables/ww.yaml"));

        let opt = SampleOpt { sample: None };
        assert!(matches!(
            opt.io_files(None, Some(Path::new("out.yaml")), INPUT, OUTPUT),
            Err(ValidationError::MissingInput)
        ));
        assert!(matches!(
            opt.io_files(Some(Path::new("in.hepmc")), None, INPUT, OUTPUT),
            Err(ValidationError::MissingOutput)
        ));
    }
}
