use noisy_float::prelude::*;
use particle_id::{
    sm_elementary_particles::{electron, muon},
    ParticleID,
};
use serde::{Deserialize, Serialize};

use crate::four_vector::FourVector;

/// Status code of final-state particles
pub const STATUS_FINAL: i32 = 1;

/// Charged leptons considered for lepton identification
pub const CHARGED_LEPTONS: [ParticleID; 2] = [electron, muon];

/// Neutrinos, which never count as visible
pub const NEUTRINOS: [ParticleID; 3] = [
    ParticleID::new(12),
    ParticleID::new(14),
    ParticleID::new(16),
];

/// A single generator-level particle
#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct Particle {
    pdg_id: ParticleID,
    status: i32,
    p: FourVector,
}

impl Particle {
    pub fn new(pdg_id: ParticleID, status: i32, p: FourVector) -> Self {
        Self { pdg_id, status, p }
    }

    pub fn pdg_id(&self) -> ParticleID {
        self.pdg_id
    }

    pub fn status(&self) -> i32 {
        self.status
    }

    /// The four-momentum
    pub fn momentum(&self) -> &FourVector {
        &self.p
    }

    pub fn px(&self) -> N64 {
        self.p.px()
    }

    pub fn py(&self) -> N64 {
        self.p.py()
    }

    pub fn pz(&self) -> N64 {
        self.p.pz()
    }

    pub fn e(&self) -> N64 {
        self.p.e()
    }

    pub fn pt(&self) -> N64 {
        self.p.pt()
    }

    pub fn eta(&self) -> f64 {
        self.p.eta()
    }

    pub fn phi(&self) -> N64 {
        self.p.phi()
    }

    /// Invariant mass, clipped to zero for off-shell rounding
    pub fn m(&self) -> N64 {
        self.p.m()
    }

    pub fn is_final_state(&self) -> bool {
        self.status == STATUS_FINAL
    }

    /// Whether this is an electron, muon, or their antiparticle
    pub fn is_charged_lepton(&self) -> bool {
        CHARGED_LEPTONS.contains(&self.pdg_id.abs())
    }

    pub fn is_neutrino(&self) -> bool {
        NEUTRINOS.contains(&self.pdg_id.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let p = FourVector::from_components(10., 0., 0., 10.);
        let positron = Particle::new(ParticleID::new(-11), 1, p);
        assert!(positron.is_charged_lepton());
        assert!(!positron.is_neutrino());
        assert!(positron.is_final_state());

        let anti_nu_tau = Particle::new(ParticleID::new(-16), 1, p);
        assert!(anti_nu_tau.is_neutrino());
        assert!(!anti_nu_tau.is_charged_lepton());

        let tau = Particle::new(ParticleID::new(15), 2, p);
        assert!(!tau.is_charged_lepton());
        assert!(!tau.is_final_state());
    }
}
