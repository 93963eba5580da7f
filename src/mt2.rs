//! Stransverse mass
//!
//! For two visible systems with transverse momenta `p1`, `p2` and
//! masses `m1`, `m2` and a missing transverse momentum `M`, the
//! stransverse mass is
//!
//! MT2 = min_{q1 + q2 = M} max(MT(p1, q1), MT(p2, q2))
//!
//! where MT is the transverse mass with an invisible test mass. We
//! solve the Lagrangian dual
//!
//! max_{λ ∈ [0, 1]} min_q λ MT(p1, q)² + (1 - λ) MT(p2, M - q)²
//!
//! which has no duality gap because both squared transverse masses are
//! convex in `q`. The outer maximisation is a bisection on the sign of
//! MT(p1)² - MT(p2)² at the inner minimum, the inner minimisation a
//! damped Newton method.

/// Visible system in the transverse plane
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransverseSystem {
    pub m: f64,
    pub px: f64,
    pub py: f64,
}

impl TransverseSystem {
    pub fn new(m: f64, px: f64, py: f64) -> Self {
        Self { m, px, py }
    }
}

/// Invisible test masses are raised to this fraction of the event scale
const MIN_INVISIBLE_MASS: f64 = 1e-12;
const MAX_BISECTIONS: usize = 64;
const LAMBDA_TOLERANCE: f64 = 1e-15;
const MAX_NEWTON_ITER: usize = 500;
const MAX_RIDGE_INCREASE: usize = 200;
const ARMIJO: f64 = 0.25;
const MIN_STEP: f64 = 1e-3;

/// Transverse mass of a visible system combined with an invisible
/// particle of mass `m_inv` and transverse momentum `(qx, qy)`
pub fn transverse_mass(
    vis: &TransverseSystem,
    [qx, qy]: [f64; 2],
    m_inv: f64,
) -> f64 {
    Side::new(vis.m, vis.px, vis.py, m_inv).mt_sq(qx, qy).max(0.).sqrt()
}

/// Stransverse mass for the given visible systems, missing transverse
/// momentum, and invisible test masses
///
/// The result is at least `max(m1 + m_inv[0], m2 + m_inv[1])`. A
/// vanishing invisible mass is regularised to a tiny fraction of the
/// event scale inside the minimisation, candidate splits are always
/// evaluated with the exact masses.
pub fn mt2(
    vis1: &TransverseSystem,
    vis2: &TransverseSystem,
    [mx, my]: [f64; 2],
    [c1, c2]: [f64; 2],
) -> f64 {
    let scale = ((vis1.m.powi(2)
        + vis2.m.powi(2)
        + c1.powi(2)
        + c2.powi(2)
        + vis1.px.powi(2)
        + vis1.py.powi(2)
        + vis2.px.powi(2)
        + vis2.py.powi(2)
        + mx.powi(2)
        + my.powi(2))
        / 8.)
        .sqrt();
    if scale == 0. {
        return 0.;
    }
    let [m1, p1x, p1y, m2, p2x, p2y, mx, my, c1, c2] =
        [vis1.m, vis1.px, vis1.py, vis2.m, vis2.px, vis2.py, mx, my, c1, c2]
            .map(|x| x / scale);
    let s1 = Side::new(m1, p1x, p1y, c1.max(MIN_INVISIBLE_MASS));
    let s2 = Side::new(m2, p2x, p2y, c2.max(MIN_INVISIBLE_MASS));
    let lb1 = m1 + c1;
    let lb2 = m2 + c2;

    // unbalanced configurations: the unconstrained minimum of one side
    // is compatible with the other side
    if m1 > 0. && lb1 >= lb2 {
        let (qx, qy) = (c1 / m1 * p1x, c1 / m1 * p1y);
        if s2.mt_sq(mx - qx, my - qy) <= lb1 * lb1 {
            return lb1 * scale;
        }
    }
    if m2 > 0. && lb2 >= lb1 {
        let (qx, qy) = (c2 / m2 * p2x, c2 / m2 * p2y);
        if s1.mt_sq(mx - qx, my - qy) <= lb2 * lb2 {
            return lb2 * scale;
        }
    }

    // primal values use the exact invisible masses
    let exact1 = Side::new(m1, p1x, p1y, c1);
    let exact2 = Side::new(m2, p2x, p2y, c2);
    let primal = |[qx, qy]: [f64; 2]| {
        f64::max(exact1.mt_sq(qx, qy), exact2.mt_sq(mx - qx, my - qy))
    };

    let lb = lb1.max(lb2);
    // one side takes all of the missing momentum
    let mut upper = f64::min(primal([0., 0.]), primal([mx, my]));
    if upper <= lb * lb {
        return lb * scale;
    }

    let problem = Dual {
        s1: &s1,
        s2: &s2,
        mx,
        my,
        tol: (1e-13 * lb * lb).max(1e-26),
    };
    let mut best = lb * lb;
    let mut q = [mx / 2., my / 2.];
    let (mut lo, mut hi) = (0., 1.);
    for _ in 0..MAX_BISECTIONS {
        if hi - lo <= LAMBDA_TOLERANCE {
            break;
        }
        let lambda = 0.5 * (lo + hi);
        let min = problem.minimise(lambda, q);
        q = min.q;
        best = f64::max(best, min.phi);
        upper = f64::min(upper, primal(q));
        if upper - best <= problem.tol {
            break;
        }
        if min.mt1_sq > min.mt2_sq {
            lo = lambda;
        } else {
            hi = lambda;
        }
    }
    f64::min(best, upper).sqrt() * scale
}

/// One visible system with its invisible partner
///
/// The squared transverse mass as a function of the invisible
/// transverse momentum `q` is `m² + mχ² + 2(E_v E_q - p·q)` with
/// `E_v = sqrt(m² + p²)` and `E_q = sqrt(mχ² + q²)`.
struct Side {
    m_sq: f64,
    px: f64,
    py: f64,
    pt: f64,
    ev: f64,
    mchi_sq: f64,
}

impl Side {
    fn new(m: f64, px: f64, py: f64, mchi: f64) -> Self {
        let pt = px.hypot(py);
        Self {
            m_sq: m * m,
            px,
            py,
            pt,
            ev: (m * m + pt * pt).sqrt(),
            mchi_sq: mchi * mchi,
        }
    }

    fn eq(&self, qx: f64, qy: f64) -> f64 {
        (self.mchi_sq + qx * qx + qy * qy).sqrt()
    }

    fn mt_sq(&self, qx: f64, qy: f64) -> f64 {
        self.m_sq + self.mchi_sq + 2. * self.ebar(qx, qy)
    }

    // E_v E_q - p·q, without cancellations for parallel momenta
    fn ebar(&self, qx: f64, qy: f64) -> f64 {
        let eq = self.eq(qx, qy);
        let pq = self.px * qx + self.py * qy;
        if pq > 0. {
            let cross = self.px * qy - self.py * qx;
            let num = self.ev * self.ev * self.mchi_sq
                + self.m_sq * (qx * qx + qy * qy)
                + cross * cross;
            num / (self.ev * eq + pq)
        } else {
            self.ev * eq - pq
        }
    }

    // 2 (E_v q - E_q p) / E_q
    fn grad(&self, qx: f64, qy: f64) -> [f64; 2] {
        let eq = self.eq(qx, qy);
        if self.pt == 0. {
            return [2. * self.ev * qx / eq, 2. * self.ev * qy / eq];
        }
        let (ux, uy) = (self.px / self.pt, self.py / self.pt);
        let par = qx * ux + qy * uy;
        let perp = -qx * uy + qy * ux;
        let a = if par > 0. {
            (self.m_sq * par * par
                - self.mchi_sq * self.pt * self.pt
                - perp * perp * self.pt * self.pt)
                / (self.ev * par + eq * self.pt)
        } else {
            self.ev * par - eq * self.pt
        };
        let b = self.ev * perp;
        let gx = a * ux - b * uy;
        let gy = a * uy + b * ux;
        [2. * gx / eq, 2. * gy / eq]
    }

    // upper triangle (xx, xy, yy) of the Hessian
    fn hess(&self, qx: f64, qy: f64) -> [f64; 3] {
        let eq_sq = self.mchi_sq + qx * qx + qy * qy;
        let c = 2. * self.ev / (eq_sq * eq_sq.sqrt());
        [
            c * (self.mchi_sq + qy * qy),
            -c * qx * qy,
            c * (self.mchi_sq + qx * qx),
        ]
    }
}

/// Inner problem of the Lagrangian dual
struct Dual<'a> {
    s1: &'a Side,
    s2: &'a Side,
    mx: f64,
    my: f64,
    tol: f64,
}

struct InnerMin {
    phi: f64,
    q: [f64; 2],
    mt1_sq: f64,
    mt2_sq: f64,
}

impl<'a> Dual<'a> {
    fn phi(&self, lambda: f64, qx: f64, qy: f64) -> f64 {
        lambda * self.s1.mt_sq(qx, qy)
            + (1. - lambda) * self.s2.mt_sq(self.mx - qx, self.my - qy)
    }

    fn result(&self, phi: f64, qx: f64, qy: f64) -> InnerMin {
        InnerMin {
            phi,
            q: [qx, qy],
            mt1_sq: self.s1.mt_sq(qx, qy),
            mt2_sq: self.s2.mt_sq(self.mx - qx, self.my - qy),
        }
    }

    /// Minimise λ MT1² + (1 - λ) MT2² starting from `q`
    ///
    /// Newton steps with backtracking. Where the Hessian is nearly
    /// singular, e.g. for massless invisibles, a ridge is added until a
    /// step decreases the objective.
    fn minimise(&self, lambda: f64, [mut qx, mut qy]: [f64; 2]) -> InnerMin {
        let mu = 1. - lambda;
        let mut f = self.phi(lambda, qx, qy);
        let mut ridge = 0.;
        for _ in 0..MAX_NEWTON_ITER {
            let g1 = self.s1.grad(qx, qy);
            let g2 = self.s2.grad(self.mx - qx, self.my - qy);
            let gx = lambda * g1[0] - mu * g2[0];
            let gy = lambda * g1[1] - mu * g2[1];
            let h1 = self.s1.hess(qx, qy);
            let h2 = self.s2.hess(self.mx - qx, self.my - qy);
            let a = lambda * h1[0] + mu * h2[0];
            let b = lambda * h1[1] + mu * h2[1];
            let c = lambda * h1[2] + mu * h2[2];
            let hscale = a + c;

            let mut nincrease = 0;
            let (alpha, dx, dy, f_new) = loop {
                if nincrease > MAX_RIDGE_INCREASE {
                    return self.result(f, qx, qy);
                }
                let (ar, cr) = (a + ridge, c + ridge);
                let det = ar * cr - b * b;
                if !(det > 0.) {
                    ridge = f64::max(ridge * 10., 1e-12 * hscale)
                        .max(f64::MIN_POSITIVE);
                    nincrease += 1;
                    continue;
                }
                let dx = -(cr * gx - b * gy) / det;
                let dy = -(-b * gx + ar * gy) / det;
                let decrement = -(gx * dx + gy * dy);
                if ridge == 0. && decrement / 2. <= self.tol {
                    return self.result(f, qx, qy);
                }
                let mut alpha = 1.;
                let mut accepted = None;
                while alpha > MIN_STEP {
                    let f_new =
                        self.phi(lambda, qx + alpha * dx, qy + alpha * dy);
                    if f_new <= f - ARMIJO * alpha * decrement {
                        accepted = Some(f_new);
                        break;
                    }
                    alpha *= 0.5;
                }
                if let Some(f_new) = accepted {
                    break (alpha, dx, dy, f_new);
                }
                if decrement / 2. <= self.tol {
                    return self.result(f, qx, qy);
                }
                ridge = f64::max(ridge * 10., 1e-12 * hscale);
                nincrease += 1;
            };
            qx += alpha * dx;
            qy += alpha * dy;
            f = f_new;
            ridge = if ridge > 1e-10 * hscale { ridge / 100. } else { 0. };
        }
        self.result(f, qx, qy)
    }
}
