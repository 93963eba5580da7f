use std::f64::consts::PI;

use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

/// Largest supported magnitude of a single component
///
/// Squares of sums over many such components stay far below
/// `f64::MAX`.
pub const MAX_COMPONENT: f64 = 1e100;

/// Whether `x` can be used as a four-vector component
pub fn is_valid_component(x: f64) -> bool {
    x.is_finite() && x.abs() <= MAX_COMPONENT
}

/// A basic four-vector
///
/// The zero component is the energy/time component. The remainder are
/// the spatial components
#[derive(
    Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default,
)]
pub struct FourVector {
    p: [N64; 4],
}

impl FourVector {
    /// Construct a new four-vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a four-vector from energy and momentum components
    pub fn from_components(e: f64, px: f64, py: f64, pz: f64) -> Self {
        [n64(e), n64(px), n64(py), n64(pz)].into()
    }

    /// Construct a four-vector from transverse momentum, pseudorapidity,
    /// azimuthal angle, and mass
    pub fn from_pt_eta_phi_m(pt: N64, eta: N64, phi: N64, m: N64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = (m * m + px * px + py * py + pz * pz).sqrt();
        [e, px, py, pz].into()
    }

    pub fn e(&self) -> N64 {
        self.p[0]
    }

    pub fn px(&self) -> N64 {
        self.p[1]
    }

    pub fn py(&self) -> N64 {
        self.p[2]
    }

    pub fn pz(&self) -> N64 {
        self.p[3]
    }

    /// The spatial norm \sqrt{\sum v_i^2} with i = 1,2,3
    pub fn spatial_norm(&self) -> N64 {
        self.spatial_norm_sq().sqrt()
    }

    /// The square \sum v_i^2 with i = 1,2,3 of the spatial norm
    pub fn spatial_norm_sq(&self) -> N64 {
        self.p.iter().skip(1).map(|e| *e * *e).sum()
    }

    /// The scalar transverse momentum
    pub fn pt(&self) -> N64 {
        self.pt_sq().sqrt()
    }

    /// The square of the scalar transverse momentum
    pub fn pt_sq(&self) -> N64 {
        self.p[1] * self.p[1] + self.p[2] * self.p[2]
    }

    /// The azimuthal angle in (-π, π]
    pub fn phi(&self) -> N64 {
        self.py().atan2(self.px())
    }

    /// The pseudorapidity
    ///
    /// Vectors along the beam axis have infinite pseudorapidity with
    /// the sign of the longitudinal momentum, the null vector has zero.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt > 0. {
            (self.pz() / pt).asinh().raw()
        } else if self.pz() > 0. {
            f64::INFINITY
        } else if self.pz() < 0. {
            f64::NEG_INFINITY
        } else {
            0.
        }
    }

    /// The invariant mass \sqrt{v_0^2 - \sum v_i^2} with i = 1,2,3
    ///
    /// Negative mass squares from rounding are clipped to zero.
    pub fn m(&self) -> N64 {
        std::cmp::max(self.m_sq(), n64(0.)).sqrt()
    }

    /// The invariant mass square v_0^2 - \sum v_i^2 with i = 1,2,3
    pub fn m_sq(&self) -> N64 {
        self.p[0] * self.p[0] - self.spatial_norm_sq()
    }

    /// The transverse energy \sqrt{m^2 + p_T^2}
    pub fn et(&self) -> N64 {
        (self.m().powi(2) + self.pt_sq()).sqrt()
    }
}

/// Absolute azimuthal separation of two angles, wrapped into [0, π]
pub fn delta_phi(phi1: N64, phi2: N64) -> N64 {
    let two_pi = n64(2. * PI);
    let mut dphi = (phi1 - phi2).abs() % two_pi;
    if dphi > PI {
        dphi = two_pi - dphi;
    }
    dphi
}

impl std::convert::From<[N64; 4]> for FourVector {
    fn from(p: [N64; 4]) -> FourVector {
        FourVector { p }
    }
}

impl std::ops::Index<usize> for FourVector {
    type Output = N64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.p[i]
    }
}

impl std::ops::AddAssign for FourVector {
    fn add_assign(&mut self, rhs: FourVector) {
        for (p, q) in self.p.iter_mut().zip(rhs.p) {
            *p += q
        }
    }
}

impl std::ops::SubAssign for FourVector {
    fn sub_assign(&mut self, rhs: FourVector) {
        for (p, q) in self.p.iter_mut().zip(rhs.p) {
            *p -= q
        }
    }
}

impl std::ops::Add for FourVector {
    type Output = Self;

    fn add(mut self, rhs: FourVector) -> Self::Output {
        self += rhs;
        self
    }
}

impl std::ops::Sub for FourVector {
    type Output = Self;

    fn sub(mut self, rhs: FourVector) -> Self::Output {
        self -= rhs;
        self
    }
}

impl std::iter::Sum for FourVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(FourVector::new(), |acc, p| acc + p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn massless_along_x() {
        let p = FourVector::from_components(60., 60., 0., 0.);
        assert_eq!(p.pt(), 60.);
        assert_eq!(p.phi(), 0.);
        assert_eq!(p.eta(), 0.);
        assert_eq!(p.m(), 0.);
    }

    #[test]
    fn eta_on_beam_axis() {
        assert_eq!(
            FourVector::from_components(5., 0., 0., 5.).eta(),
            f64::INFINITY
        );
        assert_eq!(
            FourVector::from_components(5., 0., 0., -5.).eta(),
            f64::NEG_INFINITY
        );
        assert_eq!(FourVector::new().eta(), 0.);
    }

    #[test]
    fn spacelike_mass_is_clipped() {
        let p = FourVector::from_components(1., 2., 0., 0.);
        assert!(p.m_sq() < 0.);
        assert_eq!(p.m(), 0.);
    }

    #[test]
    fn pt_eta_phi_m() {
        let p = FourVector::from_pt_eta_phi_m(n64(40.), n64(0.5), n64(1.), n64(3.));
        assert!((p.pt() - 40.).abs() < 1e-12);
        assert!((p.eta() - 0.5).abs() < 1e-12);
        assert!((p.phi() - 1.).abs() < 1e-12);
        assert!((p.m() - 3.).abs() < 1e-9);
    }

    #[test]
    fn wrapped_delta_phi() {
        assert_eq!(delta_phi(n64(0.), n64(PI)), PI);
        let dphi = delta_phi(n64(3.), n64(-3.));
        assert!((dphi - (2. * PI - 6.)).abs() < 1e-12);
        let dphi = delta_phi(n64(0.1), n64(6.2));
        assert!(dphi >= 0. && dphi <= PI);
    }
}
