//! `evkin` computes kinematic observables for dilepton events with
//! missing transverse momentum, such as W boson pair production.
//!
//! Events are read from HepMC2 or Les Houches Event files into a
//! columnar store with one row per event and one entry per particle.
//! For each event, the two leading charged leptons and the missing
//! transverse momentum are reconstructed and combined into derived
//! observables, most prominently the stransverse mass MT2.
//!
//! # How to use
//!
//! ```no_run
//! use evkin::prelude::*;
//!
//! let parsed = EventFileReader::default().read("events.hepmc.gz")?;
//! let output = Analysis::default().run(&parsed.events);
//! write_table("derived.yaml", "derived", output.derived.to_table(), None)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Most relevant modules
//!
//! - [prelude] exports a list of the most relevant classes and objects
//! - [reader] for reading event files
//! - [store] for the columnar event store
//! - [table] for persisting tables to disk
//! - [selection] for reconstructing leptons and missing momentum
//! - [kinematics] and [mt2] for derived observables
//! - [analysis] for the full event selection

/// Event selection and derived observables
pub mod analysis;
/// Output compression
pub mod compression;
/// Particle buffer for a single event
pub mod event;
/// Event file formats
pub mod formats;
/// Four-vector class
pub mod four_vector;
/// HepMC2 parser
pub mod hepmc2;
/// Kinematic observables of lepton pairs
pub mod kinematics;
/// Les Houches Event File parser
#[cfg(feature = "lhef")]
pub mod lhef;
pub mod mt2;
/// Common parsing state for event files
pub mod parser;
/// Single particle class
pub mod particle;
/// Most important exports
pub mod prelude;
/// Progress bar
pub mod progress_bar;
/// Event file reader
pub mod reader;
/// Physics object selection
pub mod selection;
/// Columnar event storage
pub mod store;
/// Named columns and their file format
pub mod table;
/// Common traits
pub mod traits;

mod parsing;
mod util;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_REV: Option<&str> = option_env!("VERGEN_GIT_SHA");
pub const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");

pub const FEATURES: [&str; NFEATURES] = [
    #[cfg(feature = "lhef")]
    "lhef",
];

const NFEATURES: usize = {
    #[allow(unused_mut)]
    let mut nfeatures = 0;
    #[cfg(feature = "lhef")]
    { nfeatures += 1; }
    nfeatures
};
