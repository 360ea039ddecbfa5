//! Adaptive Dormand–Prince 5(4) integration with terminal event location.
//!
//! Steps are accepted when the embedded fourth-order error estimate, scaled by
//! `atol + rtol·|y|`, has an RMS norm of at most one. After every accepted step
//! the event function is checked for a sign change in the requested direction;
//! a crossing is refined with Brent's method, each probe being a fresh
//! Dormand–Prince step from the start of the bracketing step, and integration
//! stops there.

use tracing::{debug, trace};

use crate::error::SimulationError;

/// Right-hand side of `y' = f(t, y)`.
pub trait OdeSystem<const N: usize> {
    fn rhs(&self, t: f64, y: &[f64; N]) -> [f64; N];
}

/// Scalar function whose zero crossings are events.
pub trait EventFunction<const N: usize> {
    fn eval(&self, t: f64, y: &[f64; N]) -> f64;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventDirection {
    /// Negative to positive.
    Rising,
    /// Positive to negative.
    Falling,
    #[default]
    Either,
}

impl EventDirection {
    fn crosses(self, before: f64, after: f64) -> bool {
        let rising = (before <= 0.0 && after > 0.0) || (before < 0.0 && after >= 0.0);
        let falling = (before >= 0.0 && after < 0.0) || (before > 0.0 && after <= 0.0);
        match self {
            Self::Rising => rising,
            Self::Falling => falling,
            Self::Either => rising || falling,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub atol: f64,
    pub rtol: f64,
}

impl Tolerances {
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self { atol, rtol }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evaluations: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Termination {
    /// The event fired at this time; the last output point sits on it.
    Event(f64),
    /// `t_end` was reached without an event.
    Horizon,
}

#[derive(Clone, Debug)]
pub struct Solution<const N: usize> {
    /// Accepted step points in increasing time, starting with the initial
    /// condition.
    pub points: Vec<(f64, [f64; N])>,
    pub termination: Termination,
    pub stats: SolverStats,
}

// Dormand–Prince 5(4) tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;
const A71: f64 = 35.0 / 384.0;
const A73: f64 = 500.0 / 1113.0;
const A74: f64 = 125.0 / 192.0;
const A75: f64 = -2187.0 / 6784.0;
const A76: f64 = 11.0 / 84.0;

// Fifth-order weights minus embedded fourth-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;
const ROOT_MAX_ITERATIONS: usize = 100;
const DEPARTURE_MAX_HALVINGS: usize = 60;

/// Adaptive explicit Runge–Kutta integrator.
#[derive(Clone, Copy, Debug)]
pub struct DormandPrince {
    pub tolerances: Tolerances,
    /// Cap on attempted (accepted + rejected) steps.
    pub max_steps: usize,
    /// Absolute time tolerance of the event root search.
    pub event_tolerance: f64,
}

impl DormandPrince {
    pub fn new(tolerances: Tolerances, max_steps: usize) -> Self {
        Self {
            tolerances,
            max_steps,
            event_tolerance: tolerances.atol,
        }
    }

    /// Integrates from `(t0, y0)` towards `t_end`, stopping at the first
    /// crossing of `event` in `direction`.
    pub fn integrate_to_event<S, E, const N: usize>(
        &self,
        system: &S,
        event: &E,
        direction: EventDirection,
        t0: f64,
        y0: [f64; N],
        t_end: f64,
    ) -> Result<Solution<N>, SimulationError>
    where
        S: OdeSystem<N>,
        E: EventFunction<N>,
    {
        let mut stats = SolverStats::default();
        let mut t = t0;
        let mut y = y0;
        let mut f = system.rhs(t, &y);
        stats.rhs_evaluations += 1;

        if !all_finite(&y) || !all_finite(&f) {
            return Err(SimulationError::NonFiniteState { t });
        }

        let mut h = self.initial_step(system, t, &y, &f, t_end, &mut stats);
        let mut points = vec![(t, y)];
        let mut g_prev = event.eval(t, &y);
        let mut previous_rejected = false;

        while t < t_end {
            if stats.accepted_steps + stats.rejected_steps >= self.max_steps {
                return Err(SimulationError::MaxStepsExceeded {
                    limit: self.max_steps,
                });
            }

            let h_min = 16.0 * f64::EPSILON * t.abs().max(f64::MIN_POSITIVE);
            if h < h_min {
                return Err(SimulationError::StepSizeUnderflow { t, h });
            }

            let step = h.min(t_end - t);
            let (y_new, f_new, error) = self.attempt(system, t, &y, &f, step, &mut stats);

            if !all_finite(&y_new) || !all_finite(&f_new) {
                return Err(SimulationError::NonFiniteState { t });
            }

            if !error.is_finite() || error > 1.0 {
                stats.rejected_steps += 1;
                let factor = if error.is_finite() {
                    (SAFETY * error.powf(ERROR_EXPONENT)).max(MIN_FACTOR)
                } else {
                    MIN_FACTOR
                };
                trace!(t, step, error, "step rejected");
                h = step * factor;
                previous_rejected = true;
                continue;
            }

            stats.accepted_steps += 1;
            // Land exactly on the horizon instead of accumulating round-off.
            let t_new = if step == t_end - t { t_end } else { t + step };
            let g_new = event.eval(t_new, &y_new);

            if direction.crosses(g_prev, g_new) {
                // Re-step from the start of the bracket so every probe carries
                // the full fifth-order accuracy of the integration.
                let (t_start, y_start, f_start) = (t, y, f);
                let mut state_at = |s: f64| {
                    if s <= t_start {
                        y_start
                    } else {
                        self.attempt(system, t_start, &y_start, &f_start, s - t_start, &mut stats)
                            .0
                    }
                };
                let mut g_at = |s: f64| event.eval(s, &state_at(s));

                // A step that starts on the surface only brackets a crossing once
                // the solution has left it inside the step.
                let bracket_start = if g_prev == 0.0 {
                    departure_point(&mut g_at, t_start, t_new, g_new)
                } else {
                    Some(t_start)
                };
                let root = match bracket_start {
                    Some(a) => Some(
                        brent_root(&mut g_at, a, t_new, self.event_tolerance, ROOT_MAX_ITERATIONS)
                            .clamp(a, t_new),
                    ),
                    None if t_start > t0 => Some(t_start),
                    None => None,
                };

                if let Some(root) = root {
                    if root > t_start {
                        let y_root = state_at(root);
                        points.push((root, y_root));
                    }
                    debug!(
                        t_event = root,
                        accepted = stats.accepted_steps,
                        rejected = stats.rejected_steps,
                        "event located"
                    );
                    return Ok(Solution {
                        points,
                        termination: Termination::Event(root),
                        stats,
                    });
                }
            }

            points.push((t_new, y_new));
            t = t_new;
            y = y_new;
            f = f_new;
            g_prev = g_new;

            let mut factor = if error == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * error.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
            };
            if previous_rejected {
                factor = factor.min(1.0);
            }
            previous_rejected = false;
            h = step * factor;
        }

        Ok(Solution {
            points,
            termination: Termination::Horizon,
            stats,
        })
    }

    /// One Dormand–Prince step. Returns the fifth-order solution, its
    /// derivative (the first stage of the next step) and the scaled error norm.
    fn attempt<S: OdeSystem<N>, const N: usize>(
        &self,
        system: &S,
        t: f64,
        y: &[f64; N],
        k1: &[f64; N],
        h: f64,
        stats: &mut SolverStats,
    ) -> ([f64; N], [f64; N], f64) {
        let stage = |coeffs: &[(f64, &[f64; N])]| -> [f64; N] {
            let mut out = *y;
            for (i, value) in out.iter_mut().enumerate() {
                let increment: f64 = coeffs.iter().map(|(a, k)| a * k[i]).sum();
                *value += h * increment;
            }
            out
        };

        let k2 = system.rhs(t + C2 * h, &stage(&[(A21, k1)]));
        let k3 = system.rhs(t + C3 * h, &stage(&[(A31, k1), (A32, &k2)]));
        let k4 = system.rhs(t + C4 * h, &stage(&[(A41, k1), (A42, &k2), (A43, &k3)]));
        let k5 = system.rhs(
            t + C5 * h,
            &stage(&[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        );
        let k6 = system.rhs(
            t + h,
            &stage(&[(A61, k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)]),
        );
        let y_new = stage(&[(A71, k1), (A73, &k3), (A74, &k4), (A75, &k5), (A76, &k6)]);
        let k7 = system.rhs(t + h, &y_new);
        stats.rhs_evaluations += 6;

        let mut sum = 0.0;
        for i in 0..N {
            let err = h
                * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
            let scale = self.tolerances.atol + self.tolerances.rtol * y[i].abs().max(y_new[i].abs());
            sum += (err / scale).powi(2);
        }
        let error = (sum / N as f64).sqrt();

        (y_new, k7, error)
    }

    /// Starting step from the magnitudes of the state, its derivative and an
    /// explicit Euler probe of the second derivative.
    fn initial_step<S: OdeSystem<N>, const N: usize>(
        &self,
        system: &S,
        t0: f64,
        y0: &[f64; N],
        f0: &[f64; N],
        t_end: f64,
        stats: &mut SolverStats,
    ) -> f64 {
        let span = t_end - t0;
        let scale: Vec<f64> = y0
            .iter()
            .map(|v| self.tolerances.atol + self.tolerances.rtol * v.abs())
            .collect();

        let d0 = rms(y0.iter().zip(&scale).map(|(v, s)| v / s));
        let d1 = rms(f0.iter().zip(&scale).map(|(v, s)| v / s));
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        let h0 = h0.min(span);

        let mut probe = *y0;
        for (p, d) in probe.iter_mut().zip(f0) {
            *p += h0 * d;
        }
        let f1 = system.rhs(t0 + h0, &probe);
        stats.rhs_evaluations += 1;

        let d2 = rms(f1
            .iter()
            .zip(f0)
            .zip(&scale)
            .map(|((a, b), s)| (a - b) / s))
            / h0;

        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / 5.0)
        };

        (100.0 * h0).min(h1).min(span)
    }
}

/// Brent's method on a bracketing interval `[a, b]`.
///
/// `f(a)` and `f(b)` must not share a strict sign. Returns the current best
/// estimate if the iteration cap is hit, which still lies inside the bracket.
pub fn brent_root<F>(mut f: F, a: f64, b: f64, tolerance: f64, max_iterations: usize) -> f64
where
    F: FnMut(f64) -> f64,
{
    let mut a = a;
    let mut b = b;
    let mut fa = f(a);
    let mut fb = f(b);
    if fa == 0.0 {
        return a;
    }
    if fb == 0.0 {
        return b;
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..max_iterations {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * tolerance;
        let m = 0.5 * (c - b);
        if m.abs() <= tol || fb == 0.0 {
            return b;
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * m * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * m * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let interpolation_limit = (3.0 * m * q - (tol * q).abs()).min((e * q).abs());
            if 2.0 * p < interpolation_limit {
                e = d;
                d = p / q;
            } else {
                d = m;
                e = d;
            }
        } else {
            d = m;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(m) };
        fb = f(b);
    }

    b
}

/// First point of the sequence `a + (b - a) / 2^k` where `f` has the sign
/// opposite to `f_b`.
fn departure_point<F>(f: &mut F, a: f64, b: f64, f_b: f64) -> Option<f64>
where
    F: FnMut(f64) -> f64,
{
    let mut gap = b - a;
    for _ in 0..DEPARTURE_MAX_HALVINGS {
        gap *= 0.5;
        let s = a + gap;
        if s <= a {
            break;
        }
        if f(s) * f_b < 0.0 {
            return Some(s);
        }
    }
    None
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn rms<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v * v, count + 1));
    if count == 0 {
        0.0
    } else {
        (sum / count as f64).sqrt()
    }
}
