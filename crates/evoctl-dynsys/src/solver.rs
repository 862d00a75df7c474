//! ODE steppers and the sampling front-end.
//!
//! [`Rk4`] is the classic fixed-step fourth-order scheme; [`Dopri5`] is the
//! adaptive Dormand-Prince 5(4) pair with the usual embedded error estimate
//! and step-size controller. [`integrate`] drives a stepper across a grid of
//! sample times and collects the trajectory, turning blow-ups into errors
//! instead of silently propagating non-finite state.

use serde::Serialize;
use thiserror::Error;

use crate::system::DynamicalSystem;

/// Integration failure; the trajectory up to the failure point is discarded.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("state became non-finite at t = {t}")]
    NonFinite { t: f64 },
    #[error("step size underflow at t = {t}")]
    StepSizeUnderflow { t: f64 },
    #[error("integration exceeded {max_steps} steps")]
    MaxSteps { max_steps: usize },
}

/// A solution sampled on the caller's time grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub times: Vec<f64>,
    /// One state vector per sample time.
    pub states: Vec<Vec<f64>>,
}

impl Trajectory {
    /// Iterates over a single state component across all samples.
    pub fn component(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.states.iter().map(move |y| y[index])
    }
}

/// A scheme that can advance a system by one step.
pub trait Stepper {
    fn step(&mut self, system: &dyn DynamicalSystem, t: &mut f64, y: &mut [f64], dt: f64);
}

/// Classic fixed-step Runge-Kutta 4.
pub struct Rk4 {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    tmp: Vec<f64>,
}

impl Rk4 {
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            k1: vec![0.0; dim],
            k2: vec![0.0; dim],
            k3: vec![0.0; dim],
            k4: vec![0.0; dim],
            tmp: vec![0.0; dim],
        }
    }
}

impl Stepper for Rk4 {
    fn step(&mut self, system: &dyn DynamicalSystem, t: &mut f64, y: &mut [f64], dt: f64) {
        let t0 = *t;
        system.apply(t0, y, &mut self.k1);

        for i in 0..y.len() {
            self.tmp[i] = y[i] + 0.5 * dt * self.k1[i];
        }
        system.apply(t0 + 0.5 * dt, &self.tmp, &mut self.k2);

        for i in 0..y.len() {
            self.tmp[i] = y[i] + 0.5 * dt * self.k2[i];
        }
        system.apply(t0 + 0.5 * dt, &self.tmp, &mut self.k3);

        for i in 0..y.len() {
            self.tmp[i] = y[i] + dt * self.k3[i];
        }
        system.apply(t0 + dt, &self.tmp, &mut self.k4);

        for i in 0..y.len() {
            y[i] += dt / 6.0 * (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]);
        }
        *t = t0 + dt;
    }
}

/// Tolerances and guards for adaptive integration.
#[derive(Debug, Clone, Copy)]
pub struct IntegratorOptions {
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: usize,
}

impl Default for IntegratorOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            max_steps: 100_000,
        }
    }
}

// Dormand-Prince 5(4) tableau.
const C: [f64; 6] = [1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A2: [f64; 1] = [1.0 / 5.0];
const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
const A4: [f64; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
const A5: [f64; 4] = [
    19372.0 / 6561.0,
    -25360.0 / 2187.0,
    64448.0 / 6561.0,
    -212.0 / 729.0,
];
const A6: [f64; 5] = [
    9017.0 / 3168.0,
    -355.0 / 33.0,
    46732.0 / 5247.0,
    49.0 / 176.0,
    -5103.0 / 18656.0,
];
const A7: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];
// Difference between the 5th- and 4th-order weights.
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339_200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const SAFETY: f64 = 0.9;
const MIN_SCALE: f64 = 0.2;
const MAX_SCALE: f64 = 5.0;

/// Adaptive Dormand-Prince 5(4) integrator.
pub struct Dopri5 {
    k: [Vec<f64>; 7],
    tmp: Vec<f64>,
    options: IntegratorOptions,
}

impl Dopri5 {
    #[must_use]
    pub fn new(dim: usize, options: IntegratorOptions) -> Self {
        Self {
            k: std::array::from_fn(|_| vec![0.0; dim]),
            tmp: vec![0.0; dim],
            options,
        }
    }

    /// Advances `y` from `t` to `t_end`, adapting the step size.
    pub fn advance(
        &mut self,
        system: &dyn DynamicalSystem,
        t: &mut f64,
        y: &mut [f64],
        t_end: f64,
        steps_used: &mut usize,
    ) -> Result<(), IntegrationError> {
        let IntegratorOptions {
            rtol,
            atol,
            max_steps,
        } = self.options;
        let mut h = ((t_end - *t) / 10.0).max(1e-10);

        while *t < t_end {
            if *steps_used >= max_steps {
                return Err(IntegrationError::MaxSteps { max_steps });
            }
            *steps_used += 1;
            h = h.min(t_end - *t);
            if h < f64::EPSILON * t_end.abs().max(1.0) {
                return Err(IntegrationError::StepSizeUnderflow { t: *t });
            }

            let err = self.try_step(system, *t, y, h, rtol, atol);
            if !err.is_finite() {
                return Err(IntegrationError::NonFinite { t: *t });
            }
            if err <= 1.0 {
                // accept: tmp holds the 5th-order solution
                y.copy_from_slice(&self.tmp);
                *t += h;
                h *= (SAFETY * err.powf(-0.2)).clamp(MIN_SCALE, MAX_SCALE);
            } else {
                h *= (SAFETY * err.powf(-0.2)).clamp(MIN_SCALE, 1.0);
            }
        }
        Ok(())
    }

    /// Attempts one step of size `h`; returns the scaled error norm and
    /// leaves the candidate solution in `self.tmp`.
    fn try_step(
        &mut self,
        system: &dyn DynamicalSystem,
        t: f64,
        y: &[f64],
        h: f64,
        rtol: f64,
        atol: f64,
    ) -> f64 {
        let n = y.len();
        system.apply(t, y, &mut self.k[0]);

        let stages: [&[f64]; 6] = [&A2, &A3, &A4, &A5, &A6, &A7];
        for (stage, coeffs) in stages.iter().enumerate() {
            let (done, rest) = self.k.split_at_mut(stage + 1);
            for i in 0..n {
                let incr: f64 = coeffs
                    .iter()
                    .enumerate()
                    .map(|(j, &a)| a * done[j][i])
                    .sum();
                self.tmp[i] = y[i] + h * incr;
            }
            system.apply(t + C[stage] * h, &self.tmp, &mut rest[0]);
        }

        // after the last stage, tmp holds y + h * sum(A7 k): the 5th-order solution

        let mut err_sq = 0.0;
        for i in 0..n {
            let e: f64 = E.iter().enumerate().map(|(j, &c)| c * self.k[j][i]).sum();
            let scale = atol + rtol * y[i].abs().max(self.tmp[i].abs());
            let ratio = h * e / scale;
            err_sq += ratio * ratio;
        }
        #[expect(clippy::cast_precision_loss)]
        let norm = (err_sq / n as f64).sqrt();
        norm
    }
}

/// Integrates the initial value problem and samples it at `times`.
///
/// The first entry of `times` is the initial time; the returned trajectory
/// contains one state per sample, starting with `y0` itself. Sample times
/// must be strictly increasing.
pub fn integrate(
    system: &dyn DynamicalSystem,
    y0: &[f64],
    times: &[f64],
    options: IntegratorOptions,
) -> Result<Trajectory, IntegrationError> {
    assert_eq!(y0.len(), system.dim());
    assert!(
        times.windows(2).all(|w| w[0] < w[1]),
        "sample times must be strictly increasing"
    );

    let mut solver = Dopri5::new(y0.len(), options);
    let mut y = y0.to_vec();
    let mut t = times[0];
    let mut steps_used = 0;
    let mut states = Vec::with_capacity(times.len());
    states.push(y.clone());

    for &t_end in &times[1..] {
        solver.advance(system, &mut t, &mut y, t_end, &mut steps_used)?;
        if y.iter().any(|v| !v.is_finite()) {
            return Err(IntegrationError::NonFinite { t });
        }
        states.push(y.clone());
    }

    Ok(Trajectory {
        times: times.to_vec(),
        states,
    })
}
