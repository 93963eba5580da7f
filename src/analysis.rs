use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{
    kinematics::{
        delta_phi_pair, invariant_mass, transverse_mass_pair, Mt2Calculator,
        MissingMomentum,
    },
    particle::Particle,
    progress_bar::{Progress, ProgressBar},
    selection::{ObjectSelector, SelectedObjects},
    store::EventStore,
    table::{Column, Table},
};

/// Number of identified leptons required for an event to be selected
pub const MIN_LEPTONS: usize = 2;

/// Names of the derived columns, in output order
pub const DERIVED_COLUMNS: [&str; 8] = [
    "MT2_WW", "MT_WW", "mll", "dphi_lep", "l1_pt", "l2_pt", "MET", "MET_phi",
];

/// Kinematic observables of a selected event
#[derive(Deserialize, Serialize, PartialEq, Debug, Clone, Copy)]
pub struct DerivedEventRecord {
    pub mt2_ww: f64,
    pub mt_ww: f64,
    pub mll: f64,
    pub dphi_lep: f64,
    pub l1_pt: f64,
    pub l2_pt: f64,
    pub met: f64,
    pub met_phi: f64,
}

impl DerivedEventRecord {
    fn values(&self) -> [f64; 8] {
        [
            self.mt2_ww,
            self.mt_ww,
            self.mll,
            self.dphi_lep,
            self.l1_pt,
            self.l2_pt,
            self.met,
            self.met_phi,
        ]
    }
}

/// Per-event selection outcome
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum EventOutcome {
    /// Fewer leptons than required
    TooFewLeptons,
    /// Not enough missing transverse momentum
    LowMet,
    Selected(DerivedEventRecord),
}

/// Number of events surviving each selection step
#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct Cutflow {
    pub total: usize,
    pub enough_leptons: usize,
    pub selected: usize,
}

/// Column-oriented derived observables of all selected events
#[derive(PartialEq, Debug, Clone, Default)]
pub struct DerivedColumns {
    columns: [Vec<f64>; 8],
}

impl DerivedColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &DerivedEventRecord) {
        for (col, val) in self.columns.iter_mut().zip(record.values()) {
            col.push(val);
        }
    }

    /// Number of selected events
    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values of the column with the given name
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        DERIVED_COLUMNS
            .iter()
            .position(|c| *c == name)
            .map(|pos| self.columns[pos].as_slice())
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        for (name, col) in DERIVED_COLUMNS.iter().zip(&self.columns) {
            table.insert(*name, Column::Float(col.clone()));
        }
        table
    }
}

impl<'a> FromIterator<&'a DerivedEventRecord> for DerivedColumns {
    fn from_iter<I: IntoIterator<Item = &'a DerivedEventRecord>>(
        iter: I,
    ) -> Self {
        let mut res = Self::new();
        for record in iter {
            res.push(record);
        }
        res
    }
}

/// Result of analysing a set of events
#[derive(PartialEq, Debug, Clone, Default)]
pub struct AnalysisOutput {
    pub derived: DerivedColumns,
    pub cutflow: Cutflow,
}

/// Event selection and computation of derived observables
#[derive(Deserialize, Serialize, PartialEq, Debug, Clone, Copy, TypedBuilder)]
pub struct Analysis {
    #[builder(default)]
    selector: ObjectSelector,
    #[builder(default)]
    mt2: Mt2Calculator,
    /// Minimum missing transverse momentum in GeV
    #[builder(default = 1.)]
    min_met: f64,
}

impl Default for Analysis {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Analysis {
    /// Select one event and compute its observables
    pub fn analyse_event<I>(&self, particles: I) -> EventOutcome
    where
        I: IntoIterator<Item = Particle>,
    {
        let objects = self.selector.select(particles);
        self.evaluate(&objects)
    }

    /// Apply the event selection to reconstructed objects
    pub fn evaluate(&self, objects: &SelectedObjects) -> EventOutcome {
        let leptons = &objects.leptons;
        if leptons.len() < MIN_LEPTONS {
            return EventOutcome::TooFewLeptons;
        }
        if objects.met.pt() <= self.min_met {
            return EventOutcome::LowMet;
        }
        let record = self.observables(&leptons[0], &leptons[1], &objects.met);
        EventOutcome::Selected(record)
    }

    /// Derived observables of the two leading leptons and the missing
    /// transverse momentum
    pub fn observables(
        &self,
        l1: &Particle,
        l2: &Particle,
        met: &MissingMomentum,
    ) -> DerivedEventRecord {
        let (p1, p2) = (l1.momentum(), l2.momentum());
        DerivedEventRecord {
            mt2_ww: self.mt2.mt2(p1, p2, met).raw(),
            mt_ww: transverse_mass_pair(p1, p2, met).raw(),
            mll: invariant_mass(p1, p2).raw(),
            dphi_lep: delta_phi_pair(p1, p2).raw(),
            l1_pt: l1.pt().raw(),
            l2_pt: l2.pt().raw(),
            met: met.pt().raw(),
            met_phi: met.phi().raw(),
        }
    }

    /// Analyse all events in parallel
    ///
    /// Selected events keep their relative input order.
    pub fn run(&self, events: &EventStore) -> AnalysisOutput {
        if events.is_empty() {
            log::warn!("No events to analyse");
        }
        let progress = ProgressBar::new(events.len() as u64, "Analysing events:");
        let outcomes: Vec<_> = events
            .par_events()
            .map(|event| {
                let outcome = self.analyse_event(event.particles());
                progress.inc(1);
                outcome
            })
            .collect();
        progress.finish();

        let mut cutflow = Cutflow {
            total: outcomes.len(),
            ..Default::default()
        };
        let mut derived = DerivedColumns::new();
        for outcome in &outcomes {
            match outcome {
                EventOutcome::TooFewLeptons => {}
                EventOutcome::LowMet => cutflow.enough_leptons += 1,
                EventOutcome::Selected(record) => {
                    cutflow.enough_leptons += 1;
                    cutflow.selected += 1;
                    derived.push(record);
                }
            }
        }
        info!(
            "{} events, {} with at least {} leptons, {} selected",
            cutflow.total,
            cutflow.enough_leptons,
            MIN_LEPTONS,
            cutflow.selected
        );
        AnalysisOutput { derived, cutflow }
    }
}
