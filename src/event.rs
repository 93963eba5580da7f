use crate::four_vector::FourVector;
use crate::particle::Particle;

use particle_id::ParticleID;

/// Buffer for the particles of the event currently being read
///
/// The attributes are kept as parallel columns so that a finished
/// buffer can be moved into an [EventStore](crate::store::EventStore)
/// without reshuffling.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct EventBuffer {
    pub(crate) px: Vec<f64>,
    pub(crate) py: Vec<f64>,
    pub(crate) pz: Vec<f64>,
    pub(crate) e: Vec<f64>,
    pub(crate) pdg_id: Vec<i32>,
    pub(crate) status: Vec<i32>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            px: Vec::with_capacity(cap),
            py: Vec::with_capacity(cap),
            pz: Vec::with_capacity(cap),
            e: Vec::with_capacity(cap),
            pdg_id: Vec::with_capacity(cap),
            status: Vec::with_capacity(cap),
        }
    }

    /// Append a particle given its raw record fields
    pub fn add(
        &mut self,
        pdg_id: i32,
        status: i32,
        [px, py, pz, e]: [f64; 4],
    ) -> &mut Self {
        self.px.push(px);
        self.py.push(py);
        self.pz.push(pz);
        self.e.push(e);
        self.pdg_id.push(pdg_id);
        self.status.push(status);
        self
    }

    pub fn add_particle(&mut self, p: &Particle) -> &mut Self {
        self.add(
            p.pdg_id().id(),
            p.status(),
            [p.px().raw(), p.py().raw(), p.pz().raw(), p.e().raw()],
        )
    }

    /// Number of particles in the buffer
    pub fn len(&self) -> usize {
        self.px.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The buffered particles
    pub fn particles(&self) -> impl Iterator<Item = Particle> + '_ {
        (0..self.len()).map(|i| {
            Particle::new(
                ParticleID::new(self.pdg_id[i]),
                self.status[i],
                FourVector::from_components(
                    self.e[i], self.px[i], self.py[i], self.pz[i],
                ),
            )
        })
    }
}

impl FromIterator<Particle> for EventBuffer {
    fn from_iter<T: IntoIterator<Item = Particle>>(iter: T) -> Self {
        let mut buf = Self::new();
        for p in iter {
            buf.add_particle(&p);
        }
        buf
    }
}
