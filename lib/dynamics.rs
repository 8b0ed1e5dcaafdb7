//! Closed-form unitary model for the light-shift interaction and the full
//! gate sequence.
//!
//! The interaction unitary is solved analytically,
//! ```text
//! U(t, φ) = Disp(β(t, φ)·Sz_eff) · exp(i·Φ(t)·Sz_eff²)
//! ```
//! with `Disp` the operator-valued displacement of the motional mode; there
//! is no numerical time-stepping anywhere in the model.

use std::f64::consts::PI;
use ndarray::{ self as nd, linalg::kron };
use num_complex::Complex64 as C64;
use crate::{
    hilbert::IonState,
    noise,
    operators::{
        displacement,
        exp_i,
        qubit_id,
        rot_generator,
        sigma_z,
    },
};

/// Control parameters for the gate model.
///
/// Held separately from the working state so that the parameters that
/// produced a result never alias the state they acted on.
#[derive(Clone, Debug, PartialEq)]
pub struct GateParams {
    /// Gate duration (default π).
    pub tg: f64,
    /// Lamb-Dicke parameter (default 0.01).
    pub eta: f64,
    /// Number of phase-space loops per gate (default 2; see
    /// [`Self::reset`]).
    pub n_loops: usize,
    /// Illumination-asymmetry factor between the two ions (default 0).
    pub alpha: f64,
    /// Fraction of optical power on spectator transitions. Inert in the
    /// core dynamics; carried for downstream analysis tools.
    pub spectator_fraction: f64,
    /// Dense time grid of 101 points on [0, tg]. Informational; the
    /// closed-form model never samples it.
    pub time: nd::Array1<f64>,
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            tg: PI,
            eta: 0.01,
            n_loops: 2,
            alpha: 0.0,
            spectator_fraction: 0.1,
            time: nd::Array1::linspace(0.0, PI, 101),
        }
    }
}

impl GateParams {
    /// Restore all parameters to their post-reset defaults.
    ///
    /// `n_loops` resets to 1 even though a freshly constructed `GateParams`
    /// carries 2; the asymmetry matches the behavior of the original
    /// experiment-analysis code and is pinned by tests.
    pub fn reset(&mut self) {
        *self = Self { n_loops: 1, ..Self::default() };
    }
}

/// Noise-channel strengths interleaved with the gate sequence.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NoiseParams {
    /// State-preparation/measurement bit-flip probability (default 0).
    pub spam: f64,
    /// Depolarization strength per gate repetition (default 0).
    pub depol: f64,
}

/// Unitary builder for the light-shift interaction between two ion qubits
/// and a shared motional mode.
///
/// Detuning errors are multiplicative factors on the secular and Rabi
/// frequencies; 1.0 means on resonance. At nominal detunings the
/// displacement closes a phase-space loop over one gate duration,
/// accumulating geometric phase π/(2·n_loops) per interaction.
#[derive(Clone, Debug)]
pub struct UBuilderLightShift<'a> {
    pub params: &'a GateParams,
    pub(crate) dim: usize,
    pub(crate) epsilon: f64,
    pub(crate) omega: f64,
}

impl<'a> UBuilderLightShift<'a> {
    const EPSILON_CUTOFF: f64 = 1e-9;

    /// Create a new builder for a `dim`-level oscillator truncation with
    /// secular detuning-error factor `sb` and Rabi detuning-error factor
    /// `rabi`.
    pub fn new(params: &'a GateParams, dim: usize, sb: f64, rabi: f64)
        -> Self
    {
        let epsilon: f64 = 2.0 * PI / params.tg * sb;
        let omega: f64
            = PI / params.tg / params.eta
            / (params.n_loops as f64).sqrt()
            * rabi;
        Self { params, dim, epsilon, omega }
    }

    /// Return the secular-frequency detuning `ε`.
    pub fn epsilon(&self) -> f64 { self.epsilon }

    /// Return the effective coupling strength `Ω`.
    pub fn omega(&self) -> f64 { self.omega }

    fn near_resonant(&self) -> bool {
        (self.epsilon * self.params.tg).abs() < Self::EPSILON_CUTOFF
    }

    /// Effective two-qubit spin operator weighting the displacement by each
    /// ion's illumination,
    /// `Sz_eff = 0.5·((α+1)·Z⊗I + (α−1)·I⊗Z)`.
    pub fn sz_eff(&self) -> nd::Array2<C64> {
        let al = self.params.alpha;
        let z1 = kron(&sigma_z(), &qubit_id());
        let z2 = kron(&qubit_id(), &sigma_z());
        z1.mapv(|z| 0.5 * (al + 1.0) * z)
            + z2.mapv(|z| 0.5 * (al - 1.0) * z)
    }

    /// Displacement amplitude of the motional mode at time `t` with motional
    /// phase `phi`.
    ///
    /// Near zero secular detuning the closed form is ill-conditioned and is
    /// replaced by its analytic limit.
    pub fn disp_amp(&self, t: f64, phi: f64) -> C64 {
        let e = self.epsilon;
        let c = self.params.eta * self.omega;
        if self.near_resonant() {
            log::warn!(
                "disp_amp: secular detuning near zero; using limiting form");
            return 0.5 * c * t * C64::from_polar(1.0, phi);
        }
        (c / e) * (e * t / 2.0).sin()
            * C64::from_polar(1.0, phi - e * t / 2.0)
    }

    /// Geometric phase accumulated by time `t`.
    ///
    /// Near zero secular detuning the closed form is ill-conditioned and is
    /// replaced by its analytic limit.
    pub fn geom_phase(&self, t: f64) -> f64 {
        let e = self.epsilon;
        let c = self.params.eta * self.omega;
        if self.near_resonant() {
            log::warn!(
                "geom_phase: secular detuning near zero; using limiting \
                form");
            return c.powi(2) * e * t.powi(3) / 6.0;
        }
        (c / e).powi(2) * (e * t - (e * t).sin())
    }

    /// Compute the closed-form interaction unitary `U(t, φ)` over the full
    /// composite space.
    pub fn gen_at(&self, t: f64, phi: f64) -> nd::Array2<C64> {
        let sz = self.sz_eff();
        let beta = self.disp_amp(t, phi);
        let amp = sz.mapv(|z| beta * z);
        let disp = displacement(&amp, self.dim);
        let phase = exp_i(&sz.dot(&sz), self.geom_phase(t));
        disp.dot(&kron(&phase, &nd::Array2::eye(self.dim)))
    }

    /// A +π/2 rotation of both qubits about the axis at angle `phi` in the
    /// X–Y plane.
    pub fn r2(&self, phi: f64) -> nd::Array2<C64> {
        self.rotation(PI / 2.0, phi)
    }

    /// A −π/2 rotation of both qubits about the axis at angle `phi` in the
    /// X–Y plane; inverse of [`Self::r2`] at the same phase.
    pub fn nr2(&self, phi: f64) -> nd::Array2<C64> {
        self.rotation(-PI / 2.0, phi)
    }

    fn rotation(&self, theta: f64, phi: f64) -> nd::Array2<C64> {
        let r = exp_i(&rot_generator(phi), -theta / 2.0);
        kron(&kron(&r, &r), &nd::Array2::eye(self.dim))
    }

    /// Apply the full gate sequence for `g_number` repetitions, interleaved
    /// with noise channels.
    ///
    /// The sequence is: SPAM; +π/2 rotation; for each repetition `g`,
    /// interaction `U(tg, πg)`, π rotation as two +π/2 rotations,
    /// interaction `U(tg, π(g+1))`, another two +π/2 rotations, then
    /// depolarization; a closing +π/2 rotation for odd `g_number` (−π/2 for
    /// even); SPAM again.
    pub fn apply(
        &self,
        state: &mut IonState,
        g_number: usize,
        noise: NoiseParams,
    ) {
        let tg = self.params.tg;
        noise::spam(state, noise.spam);
        let r2 = self.r2(0.0);
        state.apply_unitary(&r2);
        for g in 0..g_number {
            let u = self.gen_at(tg, PI * g as f64);
            state.apply_unitary(&u);
            state.apply_unitary(&r2);
            state.apply_unitary(&r2);
            let u = self.gen_at(tg, PI * (g as f64 + 1.0));
            state.apply_unitary(&u);
            state.apply_unitary(&r2);
            state.apply_unitary(&r2);
            noise::depolarize(state, noise.depol);
        }
        if g_number % 2 == 1 {
            state.apply_unitary(&r2);
        } else {
            state.apply_unitary(&self.nr2(0.0));
        }
        noise::spam(state, noise.spam);
    }
}
