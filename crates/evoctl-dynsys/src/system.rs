//! The `DynamicalSystem` seam and the built-in environments.
//!
//! Single-unit systems (harmonic, anharmonic, Lorenz) expose their raw state
//! to the actuator. Network systems stack N units block-wise (all first
//! components, then all second components, ..) and add a coupling term
//! `(A * v)_i` to the driven equation of every unit, where `A` comes from
//! [`crate::coupling`] and `v` is the driven block. The actuator output is a
//! scalar broadcast across units.

use nalgebra::DMatrix;
use thiserror::Error;

/// Error constructing an environment.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("tau must be non-zero")]
    ZeroTau,
}

/// An autonomous or driven ODE right-hand side.
pub trait DynamicalSystem {
    /// Dimension of the state space.
    fn dim(&self) -> usize;

    /// Evaluates the vector field into `dydt`.
    fn apply(&self, t: f64, y: &[f64], dydt: &mut [f64]);
}

/// Harmonic oscillator with the actuator on the velocity equation.
///
/// `y0' = y1`, `y1' = -omega^2 y0 + u(y)`.
pub struct HarmonicOscillator<A> {
    pub omega: f64,
    pub actuator: A,
}

impl<A> HarmonicOscillator<A> {
    pub fn new(actuator: A) -> Self {
        Self {
            omega: 1.0,
            actuator,
        }
    }
}

impl<A: Fn(&[f64]) -> f64> DynamicalSystem for HarmonicOscillator<A> {
    fn dim(&self) -> usize {
        2
    }

    fn apply(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = y[1];
        dydt[1] = -self.omega.powi(2) * y[0] + (self.actuator)(y);
    }
}

/// Anharmonic (damped Duffing-like) oscillator.
///
/// `y0' = y1`, `y1' = -omega^2 y0 - k y0^2 - c y1 + u(y)`.
pub struct AnharmonicOscillator<A> {
    pub omega: f64,
    pub c: f64,
    pub k: f64,
    pub actuator: A,
}

impl<A> AnharmonicOscillator<A> {
    pub fn new(actuator: A) -> Self {
        Self {
            omega: 1.0,
            c: 1.0,
            k: 1.0,
            actuator,
        }
    }
}

impl<A: Fn(&[f64]) -> f64> DynamicalSystem for AnharmonicOscillator<A> {
    fn dim(&self) -> usize {
        2
    }

    fn apply(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = y[1];
        dydt[1] = -self.omega.powi(2) * y[0] - self.k * y[0].powi(2) - self.c * y[1]
            + (self.actuator)(y);
    }
}

/// Which Lorenz equation the actuator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LorenzDrive {
    /// `y1'` (the convection equation)
    Second,
    /// `y2'` (the vertical-temperature equation)
    Third,
}

/// Lorenz attractor with the actuator on a selectable equation.
pub struct Lorenz<A> {
    pub s: f64,
    pub r: f64,
    pub b: f64,
    pub drive: LorenzDrive,
    pub actuator: A,
}

impl<A> Lorenz<A> {
    pub fn new(drive: LorenzDrive, actuator: A) -> Self {
        Self {
            s: 10.0,
            r: 28.0,
            b: 8.0 / 3.0,
            drive,
            actuator,
        }
    }
}

impl<A: Fn(&[f64]) -> f64> DynamicalSystem for Lorenz<A> {
    fn dim(&self) -> usize {
        3
    }

    fn apply(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        let u = (self.actuator)(y);
        dydt[0] = self.s * (y[1] - y[0]);
        dydt[1] = self.r * y[0] - y[1] - y[0] * y[2];
        dydt[2] = y[0] * y[1] - self.b * y[2];
        match self.drive {
            LorenzDrive::Second => dydt[1] += u,
            LorenzDrive::Third => dydt[2] += u,
        }
    }
}

fn coupling_row(coupling: &DMatrix<f64>, i: usize, block: &[f64]) -> f64 {
    (0..block.len()).map(|j| coupling[(i, j)] * block[j]).sum()
}

/// Network of Van der Pol oscillators coupled through their velocities.
///
/// State layout `[x_0..x_{N-1}, v_0..v_{N-1}]` with
/// `v_i' = -omega^2 x_i + a v_i (1 - b x_i^2) + (A v)_i + u(y)`.
pub struct VanDerPolNetwork<A> {
    pub omega: f64,
    pub a: f64,
    pub b: f64,
    pub coupling: DMatrix<f64>,
    pub actuator: A,
}

impl<A> VanDerPolNetwork<A> {
    pub fn new(coupling: DMatrix<f64>, actuator: A) -> Self {
        assert_eq!(coupling.nrows(), coupling.ncols());
        Self {
            omega: 1.0,
            a: 0.1,
            b: 0.01,
            coupling,
            actuator,
        }
    }

    #[must_use]
    pub fn units(&self) -> usize {
        self.coupling.nrows()
    }
}

impl<A: Fn(&[f64]) -> f64> DynamicalSystem for VanDerPolNetwork<A> {
    fn dim(&self) -> usize {
        2 * self.units()
    }

    fn apply(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        let n = self.units();
        let (x, v) = y.split_at(n);
        let u = (self.actuator)(y);
        for i in 0..n {
            dydt[i] = v[i];
            dydt[n + i] = -self.omega.powi(2) * x[i] + self.a * v[i] * (1.0 - self.b * x[i].powi(2))
                + coupling_row(&self.coupling, i, v)
                + u;
        }
    }
}

/// Network of FitzHugh-Nagumo neurons coupled through the recovery variable.
///
/// State layout `[v_0..v_{N-1}, w_0..w_{N-1}]` with
/// `v_i' = v_i - v_i^3/3 - w_i` and
/// `w_i' = (v_i + a - b w_i)/tau + (A w)_i + u(y)`.
pub struct FitzHughNagumoNetwork<A> {
    pub a: f64,
    pub b: f64,
    pub tau: f64,
    pub coupling: DMatrix<f64>,
    pub actuator: A,
}

impl<A> FitzHughNagumoNetwork<A> {
    pub fn new(coupling: DMatrix<f64>, actuator: A) -> Self {
        assert_eq!(coupling.nrows(), coupling.ncols());
        Self {
            a: 0.7,
            b: 0.8,
            tau: 12.5,
            coupling,
            actuator,
        }
    }

    /// Overrides the time-scale separation; `tau` must be non-zero.
    pub fn with_tau(mut self, tau: f64) -> Result<Self, SystemError> {
        if tau == 0.0 {
            return Err(SystemError::ZeroTau);
        }
        self.tau = tau;
        Ok(self)
    }

    #[must_use]
    pub fn units(&self) -> usize {
        self.coupling.nrows()
    }
}

impl<A: Fn(&[f64]) -> f64> DynamicalSystem for FitzHughNagumoNetwork<A> {
    fn dim(&self) -> usize {
        2 * self.units()
    }

    fn apply(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        let n = self.units();
        let (v, w) = y.split_at(n);
        let u = (self.actuator)(y);
        for i in 0..n {
            dydt[i] = v[i] - v[i].powi(3) / 3.0 - w[i];
            dydt[n + i] = (v[i] + self.a - self.b * w[i]) / self.tau
                + coupling_row(&self.coupling, i, w)
                + u;
        }
    }
}

/// Network of Hindmarsh-Rose neurons coupled through the spiking variable.
///
/// State layout `[x.., y.., z..]` (membrane, spiking, adaptation) with the
/// actuator and coupling on the spiking equation.
pub struct HindmarshRoseNetwork<A> {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub r: f64,
    pub s: f64,
    pub xr: f64,
    pub coupling: DMatrix<f64>,
    pub actuator: A,
}

impl<A> HindmarshRoseNetwork<A> {
    pub fn new(coupling: DMatrix<f64>, actuator: A) -> Self {
        assert_eq!(coupling.nrows(), coupling.ncols());
        Self {
            a: 1.0,
            b: 3.0,
            c: 1.0,
            d: 5.0,
            r: 1e-3,
            s: 4.0,
            xr: -8.0 / 5.0,
            coupling,
            actuator,
        }
    }

    #[must_use]
    pub fn units(&self) -> usize {
        self.coupling.nrows()
    }
}

impl<A: Fn(&[f64]) -> f64> DynamicalSystem for HindmarshRoseNetwork<A> {
    fn dim(&self) -> usize {
        3 * self.units()
    }

    fn apply(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        let n = self.units();
        let (x, rest) = y.split_at(n);
        let (yy, z) = rest.split_at(n);
        let u = (self.actuator)(y);
        for i in 0..n {
            dydt[i] = yy[i] - self.a * x[i].powi(3) + self.b * x[i].powi(2) - z[i];
            dydt[n + i] = self.c - self.d * x[i].powi(2) - yy[i]
                + coupling_row(&self.coupling, i, yy)
                + u;
            dydt[2 * n + i] = self.r * (self.s * (x[i] - self.xr) - z[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    use super::*;

    fn zero(_y: &[f64]) -> f64 {
        0.0
    }

    #[test]
    fn harmonic_rhs() {
        let sys = HarmonicOscillator::new(zero);
        let mut dydt = [0.0; 2];
        sys.apply(0.0, &[1.0, 2.0], &mut dydt);
        assert_eq!(dydt, [2.0, -1.0]);
    }

    #[test]
    fn harmonic_actuator_enters_velocity_equation() {
        let sys = HarmonicOscillator::new(|y: &[f64]| 3.0 * y[0]);
        let mut dydt = [0.0; 2];
        sys.apply(0.0, &[1.0, 0.0], &mut dydt);
        assert_eq!(dydt, [0.0, 2.0]);
    }

    #[test]
    fn anharmonic_rhs() {
        let sys = AnharmonicOscillator::new(zero);
        let mut dydt = [0.0; 2];
        sys.apply(0.0, &[2.0, 1.0], &mut dydt);
        // -omega^2*2 - k*4 - c*1 = -9
        assert_eq!(dydt, [1.0, -9.0]);
    }

    #[test]
    fn lorenz_drive_selects_equation() {
        let mut second = Lorenz::new(LorenzDrive::Second, |_: &[f64]| 1.0);
        let y = [1.0, 1.0, 1.0];
        let mut dydt2 = [0.0; 3];
        second.apply(0.0, &y, &mut dydt2);
        second.drive = LorenzDrive::Third;
        let mut dydt3 = [0.0; 3];
        second.apply(0.0, &y, &mut dydt3);
        assert_relative_eq!(dydt2[1] - dydt3[1], 1.0);
        assert_relative_eq!(dydt3[2] - dydt2[2], 1.0);
    }

    #[test]
    fn van_der_pol_network_couples_velocities() {
        let coupling = dmatrix![-1.0, 1.0; 1.0, -1.0];
        let sys = VanDerPolNetwork::new(coupling, zero);
        assert_eq!(sys.dim(), 4);
        let y = [0.0, 0.0, 1.0, -1.0];
        let mut dydt = [0.0; 4];
        sys.apply(0.0, &y, &mut dydt);
        assert_eq!(dydt[0], 1.0);
        assert_eq!(dydt[1], -1.0);
        // v0' = a*v0 + (A v)_0 = 0.1 - 2.0
        assert_relative_eq!(dydt[2], 0.1 - 2.0);
        assert_relative_eq!(dydt[3], -0.1 + 2.0);
    }

    #[test]
    fn fitzhugh_rejects_zero_tau() {
        let coupling = DMatrix::zeros(1, 1);
        let sys = FitzHughNagumoNetwork::new(coupling, zero);
        assert!(matches!(sys.with_tau(0.0), Err(SystemError::ZeroTau)));
    }

    #[test]
    fn hindmarsh_rose_rhs_single_unit() {
        let sys = HindmarshRoseNetwork::new(DMatrix::zeros(1, 1), zero);
        let mut dydt = [0.0; 3];
        sys.apply(0.0, &[1.0, 2.0, 3.0], &mut dydt);
        // y - a x^3 + b x^2 - z = 2 - 1 + 3 - 3 = 1
        assert_relative_eq!(dydt[0], 1.0);
        // c - d x^2 - y = 1 - 5 - 2 = -6
        assert_relative_eq!(dydt[1], -6.0);
        // r (s (x - xr) - z) = 1e-3 * (4 * 2.6 - 3)
        assert_relative_eq!(dydt[2], 1e-3 * (4.0 * (1.0 + 8.0 / 5.0) - 3.0));
    }
}
