use std::ops::Range;

use itertools::izip;
use particle_id::ParticleID;
use rayon::prelude::*;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

use crate::{
    event::EventBuffer,
    four_vector::{is_valid_component, FourVector},
    particle::Particle,
    table::{Column, Jagged, Table},
};

/// Per-particle attribute
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString,
)]
pub enum Field {
    #[strum(serialize = "px")]
    Px,
    #[strum(serialize = "py")]
    Py,
    #[strum(serialize = "pz")]
    Pz,
    #[strum(serialize = "E")]
    E,
    #[strum(serialize = "pdg_id")]
    PdgId,
    #[strum(serialize = "status")]
    Status,
}

/// The values of one attribute for all particles of an event
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Values<'a> {
    Float(&'a [f64]),
    Int(&'a [i32]),
}

/// In-memory store of events with variable particle multiplicity
///
/// All attributes share a single offset table, so the particles of
/// event `i` are found at positions `offsets[i]..offsets[i + 1]` of
/// every attribute column.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStore {
    offsets: Vec<usize>,
    px: Vec<f64>,
    py: Vec<f64>,
    pz: Vec<f64>,
    e: Vec<f64>,
    pdg_id: Vec<i32>,
    status: Vec<i32>,
}

impl Default for EventStore {
    fn default() -> Self {
        Self {
            offsets: vec![0],
            px: Vec::new(),
            py: Vec::new(),
            pz: Vec::new(),
            e: Vec::new(),
            pdg_id: Vec::new(),
            status: Vec::new(),
        }
    }
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the particles of a finished event into the store
    pub fn push_event(&mut self, mut event: EventBuffer) {
        self.px.append(&mut event.px);
        self.py.append(&mut event.py);
        self.pz.append(&mut event.pz);
        self.e.append(&mut event.e);
        self.pdg_id.append(&mut event.pdg_id);
        self.status.append(&mut event.status);
        self.offsets.push(self.px.len());
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of particles over all events
    pub fn n_particles_total(&self) -> usize {
        self.px.len()
    }

    /// Number of particles in the event with the given index
    pub fn n_particles(&self, idx: usize) -> Result<usize, StoreError> {
        self.range(idx).map(|r| r.len())
    }

    /// Aligned view of all particle attributes in one event
    pub fn event(&self, idx: usize) -> Result<EventView<'_>, StoreError> {
        self.range(idx).map(|r| self.view(r))
    }

    /// The particles of one event
    pub fn particles(&self, idx: usize) -> Result<Vec<Particle>, StoreError> {
        self.event(idx).map(|ev| ev.particles().collect())
    }

    /// Single attribute of all particles in one event
    pub fn values(
        &self,
        idx: usize,
        field: Field,
    ) -> Result<Values<'_>, StoreError> {
        self.event(idx).map(|ev| ev.values(field))
    }

    pub fn events(&self) -> impl ExactSizeIterator<Item = EventView<'_>> {
        self.offsets.windows(2).map(|w| self.view(w[0]..w[1]))
    }

    /// Parallel iterator over the events, in order
    pub fn par_events(
        &self,
    ) -> impl IndexedParallelIterator<Item = EventView<'_>> {
        self.offsets
            .par_windows(2)
            .map(move |w| self.view(w[0]..w[1]))
    }

    fn range(&self, idx: usize) -> Result<Range<usize>, StoreError> {
        if idx < self.len() {
            Ok(self.offsets[idx]..self.offsets[idx + 1])
        } else {
            Err(StoreError::IndexOutOfRange {
                idx,
                len: self.len(),
            })
        }
    }

    fn view(&self, r: Range<usize>) -> EventView<'_> {
        EventView {
            px: &self.px[r.clone()],
            py: &self.py[r.clone()],
            pz: &self.pz[r.clone()],
            e: &self.e[r.clone()],
            pdg_id: &self.pdg_id[r.clone()],
            status: &self.status[r],
        }
    }

    /// Convert into a table with one jagged column per attribute
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        for field in Field::iter() {
            let col = match field {
                Field::Px => self.float_column(&self.px),
                Field::Py => self.float_column(&self.py),
                Field::Pz => self.float_column(&self.pz),
                Field::E => self.float_column(&self.e),
                Field::PdgId => self.int_column(&self.pdg_id),
                Field::Status => self.int_column(&self.status),
            };
            table.insert(field.to_string(), col);
        }
        table
    }

    fn float_column(&self, values: &[f64]) -> Column {
        let col = Jagged::from_parts(values.to_vec(), self.offsets.clone());
        Column::JaggedFloat(col.unwrap_or_default())
    }

    fn int_column(&self, values: &[i32]) -> Column {
        let col = Jagged::from_parts(values.to_vec(), self.offsets.clone());
        Column::JaggedInt(col.unwrap_or_default())
    }
}

impl TryFrom<Table> for EventStore {
    type Error = StoreError;

    /// Take the particle attributes out of a table
    ///
    /// All attribute columns have to be present with the right type and
    /// agree on the number of particles in each event.
    fn try_from(mut table: Table) -> Result<Self, Self::Error> {
        let mut take = |field: Field| {
            table
                .remove(&field.to_string())
                .ok_or(StoreError::MissingField(field))
        };
        let px = take(Field::Px)?;
        let py = take(Field::Py)?;
        let pz = take(Field::Pz)?;
        let e = take(Field::E)?;
        let pdg_id = take(Field::PdgId)?;
        let status = take(Field::Status)?;

        let (px, offsets) = float_parts(Field::Px, px)?;
        let mut store = EventStore {
            offsets,
            px,
            ..Default::default()
        };
        store.py = store.aligned_float(Field::Py, py)?;
        store.pz = store.aligned_float(Field::Pz, pz)?;
        store.e = store.aligned_float(Field::E, e)?;
        store.pdg_id = store.aligned_int(Field::PdgId, pdg_id)?;
        store.status = store.aligned_int(Field::Status, status)?;
        Ok(store)
    }
}

impl EventStore {
    fn aligned_float(
        &self,
        field: Field,
        col: Column,
    ) -> Result<Vec<f64>, StoreError> {
        let (values, offsets) = float_parts(field, col)?;
        self.check_alignment(field, &offsets)?;
        Ok(values)
    }

    fn aligned_int(
        &self,
        field: Field,
        col: Column,
    ) -> Result<Vec<i32>, StoreError> {
        let (values, offsets) = match col {
            Column::JaggedInt(c) => c.into_parts(),
            col => {
                return Err(StoreError::WrongType {
                    field,
                    found: col.kind(),
                })
            }
        };
        self.check_alignment(field, &offsets)?;
        Ok(values)
    }

    fn check_alignment(
        &self,
        field: Field,
        offsets: &[usize],
    ) -> Result<(), StoreError> {
        if offsets == self.offsets {
            Ok(())
        } else {
            Err(StoreError::Misaligned {
                field,
                reference: Field::Px,
            })
        }
    }
}

fn float_parts(
    field: Field,
    col: Column,
) -> Result<(Vec<f64>, Vec<usize>), StoreError> {
    let (values, offsets) = match col {
        Column::JaggedFloat(c) => c.into_parts(),
        col => {
            return Err(StoreError::WrongType {
                field,
                found: col.kind(),
            })
        }
    };
    if let Some(&value) = values.iter().find(|&&v| !is_valid_component(v)) {
        return Err(StoreError::InvalidValue { field, value });
    }
    Ok((values, offsets))
}

/// Borrowed view of the particles of one event
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EventView<'a> {
    pub px: &'a [f64],
    pub py: &'a [f64],
    pub pz: &'a [f64],
    pub e: &'a [f64],
    pub pdg_id: &'a [i32],
    pub status: &'a [i32],
}

impl<'a> EventView<'a> {
    /// Number of particles
    pub fn len(&self) -> usize {
        self.px.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self, field: Field) -> Values<'a> {
        match field {
            Field::Px => Values::Float(self.px),
            Field::Py => Values::Float(self.py),
            Field::Pz => Values::Float(self.pz),
            Field::E => Values::Float(self.e),
            Field::PdgId => Values::Int(self.pdg_id),
            Field::Status => Values::Int(self.status),
        }
    }

    pub fn particles(&self) -> impl Iterator<Item = Particle> + 'a {
        izip!(self.px, self.py, self.pz, self.e, self.pdg_id, self.status)
            .map(|(&px, &py, &pz, &e, &id, &status)| {
                Particle::new(
                    ParticleID::new(id),
                    status,
                    FourVector::from_components(e, px, py, pz),
                )
            })
    }
}

/// Error accessing the event store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Event index {idx} out of range for {len} events")]
    IndexOutOfRange { idx: usize, len: usize },
    #[error("Missing field `{0}`")]
    MissingField(Field),
    #[error("Field `{field}` has type {found}, expected a jagged column")]
    WrongType { field: Field, found: &'static str },
    #[error("Particle multiplicities of field `{field}` and field `{reference}` disagree")]
    Misaligned { field: Field, reference: Field },
    #[error("Field `{field}` contains invalid momentum component {value}")]
    InvalidValue { field: Field, value: f64 },
}
