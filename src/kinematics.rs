use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    four_vector::{delta_phi, FourVector},
    mt2::{mt2, TransverseSystem},
    particle::Particle,
};

/// Default mass hypothesis for each invisible particle in GeV
pub const DEFAULT_INVISIBLE_MASS: f64 = 0.1;

/// Missing transverse momentum
#[derive(
    Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default,
)]
pub struct MissingMomentum {
    px: N64,
    py: N64,
}

impl MissingMomentum {
    pub fn new(px: N64, py: N64) -> Self {
        Self { px, py }
    }

    /// Negative vector sum of the transverse momenta of the given particles
    pub fn from_visible<'a, I>(visible: I) -> Self
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        let (px, py) = visible
            .into_iter()
            .fold((n64(0.), n64(0.)), |(px, py), p| (px - p.px(), py - p.py()));
        Self { px, py }
    }

    pub fn px(&self) -> N64 {
        self.px
    }

    pub fn py(&self) -> N64 {
        self.py
    }

    /// Magnitude
    pub fn pt(&self) -> N64 {
        (self.px * self.px + self.py * self.py).sqrt()
    }

    pub fn phi(&self) -> N64 {
        self.py.atan2(self.px)
    }
}

/// Invariant mass of a pair, clipped to zero
pub fn invariant_mass(p1: &FourVector, p2: &FourVector) -> N64 {
    (*p1 + *p2).m()
}

/// Azimuthal separation in [0, π]
pub fn delta_phi_pair(p1: &FourVector, p2: &FourVector) -> N64 {
    delta_phi(p1.phi(), p2.phi())
}

/// Transverse mass of the system of two visible particles and the
/// missing transverse momentum
///
/// MT² = (E_T,V + |MET|)² - |p_T,V + MET|² with the transverse energy
/// E_T,V = sqrt(m_V² + p_T,V²) of the visible system V.
pub fn transverse_mass_pair(
    p1: &FourVector,
    p2: &FourVector,
    met: &MissingMomentum,
) -> N64 {
    let vis = *p1 + *p2;
    let et_sum = vis.et() + met.pt();
    let px = vis.px() + met.px();
    let py = vis.py() + met.py();
    let mt_sq = et_sum * et_sum - px * px - py * py;
    std::cmp::max(mt_sq, n64(0.)).sqrt()
}

/// Calculator for the stransverse mass of two visible particles
#[derive(Deserialize, Serialize, PartialEq, Debug, Clone, Copy)]
pub struct Mt2Calculator {
    invisible_mass: [f64; 2],
}

impl Default for Mt2Calculator {
    fn default() -> Self {
        Self::new(DEFAULT_INVISIBLE_MASS)
    }
}

impl Mt2Calculator {
    /// Use the same mass hypothesis for both invisible particles
    pub fn new(invisible_mass: f64) -> Self {
        Self::with_masses([invisible_mass; 2])
    }

    pub fn with_masses(invisible_mass: [f64; 2]) -> Self {
        Self { invisible_mass }
    }

    pub fn invisible_mass(&self) -> [f64; 2] {
        self.invisible_mass
    }

    pub fn mt2(
        &self,
        p1: &FourVector,
        p2: &FourVector,
        met: &MissingMomentum,
    ) -> N64 {
        let res = mt2(
            &transverse(p1),
            &transverse(p2),
            [met.px().raw(), met.py().raw()],
            self.invisible_mass,
        );
        n64(res)
    }
}

fn transverse(p: &FourVector) -> TransverseSystem {
    TransverseSystem::new(p.m().raw(), p.px().raw(), p.py().raw())
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use particle_id::ParticleID;

    #[test]
    fn met_additivity() {
        let p1 = Particle::new(
            ParticleID::new(11),
            1,
            FourVector::from_components(50., 12.5, -3.25, 20.),
        );
        let p2 = Particle::new(
            ParticleID::new(22),
            1,
            FourVector::from_components(30., -7., 8., 1.),
        );
        let met = MissingMomentum::from_visible([&p1, &p2]);
        assert_eq!(met.px(), -(12.5 - 7.));
        assert_eq!(met.py(), -(-3.25 + 8.));

        let met = MissingMomentum::from_visible(Vec::<Particle>::new().iter());
        assert_eq!(met, MissingMomentum::default());
        assert_eq!(met.pt(), 0.);
    }

    #[test]
    fn back_to_back_leptons() {
        let l1 = FourVector::from_components(60., 60., 0., 0.);
        let l2 = FourVector::from_components(40., -40., 0., 0.);
        let met = MissingMomentum::new(n64(0.), n64(50.));

        assert_eq!(delta_phi_pair(&l1, &l2), PI);
        assert!((invariant_mass(&l1, &l2) - 9600f64.sqrt()).abs() < 1e-9);
        assert!((transverse_mass_pair(&l1, &l2, &met) - 140.).abs() < 1e-9);
        let mt2 = Mt2Calculator::default().mt2(&l1, &l2, &met);
        assert!((mt2 - 0.1).abs() < 1e-9);
        assert_eq!(met.phi(), PI / 2.);
    }
}
