use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{kinematics::MissingMomentum, particle::Particle};

/// Acceptance and lepton identification thresholds
///
/// Momenta are in GeV.
#[derive(Builder, Deserialize, Serialize, PartialEq, Debug, Clone, Copy)]
pub struct SelectionCuts {
    /// Minimum transverse momentum of any accepted particle
    #[builder(default = "1.")]
    pub min_pt: f64,
    /// Maximum absolute pseudorapidity of any accepted particle
    #[builder(default = "2.5")]
    pub max_abs_eta: f64,
    /// Minimum transverse momentum of identified leptons
    #[builder(default = "25.")]
    pub min_lepton_pt: f64,
}

impl Default for SelectionCuts {
    fn default() -> Self {
        Self {
            min_pt: 1.,
            max_abs_eta: 2.5,
            min_lepton_pt: 25.,
        }
    }
}

/// Physics objects reconstructed from one event
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SelectedObjects {
    /// Identified leptons in order of decreasing transverse momentum
    pub leptons: Vec<Particle>,
    pub met: MissingMomentum,
}

/// Reconstructs leptons and missing transverse momentum
#[derive(Deserialize, Serialize, PartialEq, Debug, Clone, Copy, Default)]
pub struct ObjectSelector {
    cuts: SelectionCuts,
}

impl ObjectSelector {
    pub fn new(cuts: SelectionCuts) -> Self {
        Self { cuts }
    }

    pub fn cuts(&self) -> &SelectionCuts {
        &self.cuts
    }

    /// Whether the particle is a final-state particle inside the
    /// detector acceptance
    pub fn is_accepted(&self, p: &Particle) -> bool {
        p.is_final_state()
            && p.pt() > self.cuts.min_pt
            && p.eta().abs() < self.cuts.max_abs_eta
    }

    /// Accepted particles, in input order
    pub fn accepted<'a, I>(&self, particles: I) -> Vec<Particle>
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        particles
            .into_iter()
            .filter(|p| self.is_accepted(p))
            .copied()
            .collect()
    }

    /// Identified leptons among accepted particles, sorted by
    /// decreasing transverse momentum
    pub fn leptons(&self, accepted: &[Particle]) -> Vec<Particle> {
        let mut leptons: Vec<_> = accepted
            .iter()
            .filter(|p| p.is_charged_lepton() && p.pt() > self.cuts.min_lepton_pt)
            .copied()
            .collect();
        leptons.sort_by(|a, b| b.pt().cmp(&a.pt()));
        leptons
    }

    /// Missing transverse momentum from all accepted visible particles
    pub fn missing_momentum(&self, accepted: &[Particle]) -> MissingMomentum {
        MissingMomentum::from_visible(accepted.iter().filter(|p| !p.is_neutrino()))
    }

    /// Reconstruct the objects of one event
    pub fn select<I>(&self, particles: I) -> SelectedObjects
    where
        I: IntoIterator<Item = Particle>,
    {
        let accepted: Vec<_> =
            particles.into_iter().filter(|p| self.is_accepted(p)).collect();
        SelectedObjects {
            leptons: self.leptons(&accepted),
            met: self.missing_momentum(&accepted),
        }
    }
}

#[cfg(test)]
mod tests {
    use noisy_float::prelude::*;
    use particle_id::ParticleID;

    use super::*;
    use crate::four_vector::FourVector;

    fn particle(id: i32, status: i32, pt: f64, eta: f64, phi: f64) -> Particle {
        Particle::new(
            ParticleID::new(id),
            status,
            FourVector::from_pt_eta_phi_m(n64(pt), n64(eta), n64(phi), n64(0.)),
        )
    }

    #[test]
    fn acceptance() {
        let selector = ObjectSelector::default();
        assert!(selector.is_accepted(&particle(22, 1, 1.5, 0., 0.)));
        assert!(!selector.is_accepted(&particle(22, 1, 0.5, 0., 0.)));
        assert!(!selector.is_accepted(&particle(22, 1, 1.5, 2.6, 0.)));
        assert!(!selector.is_accepted(&particle(22, 2, 1.5, 0., 0.)));
        // beam-axis particles have infinite pseudorapidity
        let beam = Particle::new(
            ParticleID::new(2212),
            1,
            FourVector::from_components(10., 0., 0., 10.),
        );
        assert!(!selector.is_accepted(&beam));
    }

    #[test]
    fn acceptance_idempotent() {
        let selector = ObjectSelector::default();
        let particles = [
            particle(11, 1, 30., 0.1, 0.),
            particle(13, 1, 0.9, 0.1, 0.),
            particle(211, 1, 3., -2.4, 1.),
            particle(211, 1, 3., 2.7, 1.),
            particle(23, 2, 30., 0., 0.),
        ];
        let once = selector.accepted(&particles);
        assert_eq!(once.len(), 2);
        let twice = selector.accepted(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn leptons_sorted() {
        let selector = ObjectSelector::default();
        let objects = selector.select([
            particle(-11, 1, 30., 0., 0.),
            particle(13, 1, 80., 1., 2.),
            particle(15, 1, 90., 0., 0.),
            particle(-13, 1, 20., 0., 0.),
            particle(11, 1, 45., -1., 1.),
        ]);
        let ids: Vec<_> = objects.leptons.iter().map(|l| l.pdg_id().id()).collect();
        assert_eq!(ids, [13, 11, -11]);
        for pair in objects.leptons.windows(2) {
            assert!(pair[0].pt() >= pair[1].pt());
        }
    }

    #[test]
    fn neutrinos_invisible() {
        let selector = ObjectSelector::default();
        let objects = selector.select([
            particle(11, 1, 30., 0., 0.),
            particle(12, 1, 30., 0., std::f64::consts::PI),
            particle(22, 1, 10., 0., std::f64::consts::FRAC_PI_2),
        ]);
        let met = objects.met;
        assert!((met.px() + 30.).abs() < 1e-9);
        assert!((met.py() + 10.).abs() < 1e-9);

        let objects = selector.select(Vec::new());
        assert!(objects.leptons.is_empty());
        assert_eq!(objects.met.pt(), 0.);
    }

    #[test]
    fn builder() {
        let cuts = SelectionCutsBuilder::default()
            .min_lepton_pt(20.)
            .build()
            .unwrap();
        assert_eq!(cuts.min_lepton_pt, 20.);
        assert_eq!(cuts.min_pt, SelectionCuts::default().min_pt);
        assert_eq!(cuts.max_abs_eta, SelectionCuts::default().max_abs_eta);
    }
}
