pub use crate::{
    analysis::{Analysis, AnalysisOutput, Cutflow, DerivedColumns},
    compression::Compression,
    event::EventBuffer,
    formats::FileFormat,
    four_vector::FourVector,
    kinematics::{Mt2Calculator, MissingMomentum},
    particle::Particle,
    reader::EventFileReader,
    selection::{ObjectSelector, SelectionCuts, SelectionCutsBuilder},
    store::EventStore,
    table::{read_table, write_table, Table, TableFile},
    traits::{ParseEvents, Progress},
};
