//! The composite two-ion ⊗ motional quantum state and its basis-ordering
//! contract.
//!
//! The density matrix has dimension `4 * dim` with basis ordering
//! qubit 1 ⊗ qubit 2 ⊗ oscillator; qubit basis order is {g, e} per ion and
//! oscillator basis order is {0, ..., dim-1} (Fock states). Diagonal index
//! ranges `[0, dim)`, `[dim, 3*dim)`, and `[3*dim, 4*dim)` therefore hold
//! the gg, ge/eg, and ee populations respectively.

use itertools::Itertools;
use ndarray as nd;
use num_complex::Complex64 as C64;
use thiserror::Error;
use crate::operators::dagger;

#[derive(Debug, Error)]
pub enum StateError {
    /// Malformed construction input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type StateResult<T> = Result<T, StateError>;

/// Compute the outer product of two state vectors.
pub fn outer_prod(a: &nd::Array1<C64>, b: &nd::Array1<C64>)
    -> nd::Array2<C64>
{
    let na = a.len();
    let nb = b.len();
    nd::Array2::from_shape_vec(
        (na, nb),
        a.iter().cartesian_product(b)
            .map(|(ai, bj)| *ai * bj.conj())
            .collect(),
    )
    .unwrap()
}

/// Compute the Kronecker product of two state vectors.
pub fn vec_kron(a: &nd::Array1<C64>, b: &nd::Array1<C64>)
    -> nd::Array1<C64>
{
    a.iter().cartesian_product(b)
        .map(|(ai, bj)| *ai * *bj)
        .collect()
}

/// Different descriptions for an initial state, convertible to the standard
/// density-matrix representation.
#[derive(Clone, Debug)]
pub enum StateInit {
    /// Four complex amplitudes over the two-qubit computational basis
    /// {gg, ge, eg, ee}, optionally followed by a Fock occupation index as a
    /// fifth element (zero when absent). Renormalized.
    Amps(Vec<C64>),
    /// A pre-constructed state vector over the full composite space.
    /// Renormalized and promoted to a density matrix.
    Vector(nd::Array1<C64>),
    /// A pre-constructed density matrix over the full composite space.
    /// Renormalized to unit trace.
    Matrix(nd::Array2<C64>),
}

impl From<nd::Array1<C64>> for StateInit {
    fn from(a: nd::Array1<C64>) -> Self { Self::Vector(a) }
}

impl From<nd::Array2<C64>> for StateInit {
    fn from(a: nd::Array2<C64>) -> Self { Self::Matrix(a) }
}

impl StateInit {
    /// Convert to a density matrix, returning it together with the
    /// oscillator truncation dimension.
    ///
    /// For raw [`Vector`][Self::Vector] and [`Matrix`][Self::Matrix] inputs
    /// the truncation dimension is inferred from the row count, overriding
    /// `dim`.
    fn into_density(self, dim: usize)
        -> StateResult<(nd::Array2<C64>, usize)>
    {
        match self {
            Self::Amps(amps) => {
                if amps.len() != 4 && amps.len() != 5 {
                    return Err(StateError::InvalidInput(format!(
                        "expected 4 or 5 amplitudes, got {}", amps.len())));
                }
                let fock: usize
                    = if amps.len() == 5 {
                        amps[4].re.round() as usize
                    } else {
                        0
                    };
                if fock >= dim {
                    return Err(StateError::InvalidInput(format!(
                        "Fock index {} exceeds truncation {}", fock, dim)));
                }
                let mut qubits: nd::Array1<C64>
                    = amps.iter().take(4).copied().collect();
                let norm: f64
                    = qubits.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
                if norm == 0.0 {
                    return Err(StateError::InvalidInput(
                        "amplitudes sum to zero".into()));
                }
                qubits.mapv_inplace(|a| a / norm);
                let osc: nd::Array1<C64>
                    = (0..dim)
                    .map(|n| {
                        if n == fock { C64::from(1.0) } else { C64::from(0.0) }
                    })
                    .collect();
                let psi = vec_kron(&qubits, &osc);
                Ok((outer_prod(&psi, &psi), dim))
            },
            Self::Vector(mut psi) => {
                let rows = psi.len();
                if rows == 0 || rows % 4 != 0 {
                    return Err(StateError::InvalidInput(format!(
                        "vector length {} is not a positive multiple of 4",
                        rows)));
                }
                let norm: f64
                    = psi.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
                if norm == 0.0 {
                    return Err(StateError::InvalidInput(
                        "vector has zero norm".into()));
                }
                psi.mapv_inplace(|a| a / norm);
                Ok((outer_prod(&psi, &psi), rows / 4))
            },
            Self::Matrix(mut rho) => {
                let rows = rho.nrows();
                if !rho.is_square() || rows == 0 || rows % 4 != 0 {
                    return Err(StateError::InvalidInput(format!(
                        "matrix shape {:?} is not square with row count a \
                        positive multiple of 4", rho.shape())));
                }
                let tr: C64 = rho.diag().iter().sum();
                if tr == C64::from(0.0) {
                    return Err(StateError::InvalidInput(
                        "matrix has zero trace".into()));
                }
                rho.mapv_inplace(|p| p / tr);
                Ok((rho, rows / 4))
            },
        }
    }
}

/// The composite quantum state of two ion qubits and one truncated
/// oscillator mode.
///
/// An immutable snapshot of the construction-time density matrix is retained
/// alongside the working copy; [`Self::reset_state`] restores the working
/// copy from the snapshot with no structural aliasing.
#[derive(Clone, Debug)]
pub struct IonState {
    dim: usize,
    initial: nd::Array2<C64>,
    current: nd::Array2<C64>,
}

impl IonState {
    /// Create a new state from an input description and oscillator
    /// truncation dimension.
    ///
    /// Raw vector/matrix inputs override `dim` with the dimension inferred
    /// from their row count.
    pub fn new<I>(init: I, dim: usize) -> StateResult<Self>
    where I: Into<StateInit>
    {
        let (rho, dim) = init.into().into_density(dim)?;
        Ok(Self { dim, initial: rho.clone(), current: rho })
    }

    /// Create a new state from an input description with the default
    /// truncation dimension of 20.
    pub fn new_default_dim<I>(init: I) -> StateResult<Self>
    where I: Into<StateInit>
    {
        Self::new(init, 20)
    }

    /// Return the oscillator truncation dimension.
    pub fn dim(&self) -> usize { self.dim }

    /// Return the dimension of the full composite space, `4 * dim`.
    pub fn size(&self) -> usize { 4 * self.dim }

    /// Return a reference to the working density matrix.
    pub fn current(&self) -> &nd::Array2<C64> { &self.current }

    /// Return a reference to the construction-time snapshot.
    pub fn initial(&self) -> &nd::Array2<C64> { &self.initial }

    pub(crate) fn current_mut(&mut self) -> &mut nd::Array2<C64> {
        &mut self.current
    }

    /// Restore the working density matrix from the construction-time
    /// snapshot.
    pub fn reset_state(&mut self) {
        self.current = self.initial.clone();
    }

    /// Return the trace of the working density matrix.
    pub fn trace(&self) -> C64 { self.current.diag().iter().sum() }

    /// Conjugate the working density matrix by a unitary, `ρ ← U ρ U†`.
    pub fn apply_unitary(&mut self, U: &nd::Array2<C64>) {
        self.current = U.dot(&self.current).dot(&dagger(U));
    }

    /// Read out the aggregate qubit populations as `[gg, ee, ge/eg]`.
    pub fn populations(&self) -> [f64; 3] {
        let d = self.dim;
        let diag = self.current.diag();
        let gg: f64 = diag.iter().take(d).map(|p| p.re).sum();
        let mid: f64 = diag.iter().skip(d).take(2 * d).map(|p| p.re).sum();
        let ee: f64 = diag.iter().skip(3 * d).map(|p| p.re).sum();
        [gg, ee, mid]
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use ndarray as nd;
    use super::*;
    use crate::operators::{ ion_kron, sigma_x };

    fn amps(a: &[f64]) -> StateInit {
        StateInit::Amps(a.iter().map(|x| C64::from(*x)).collect())
    }

    #[test]
    fn construction_gives_valid_density() {
        let state = IonState::new(amps(&[1.0, 1.0, 0.5, -0.5]), 6).unwrap();
        let rho = state.current();
        assert_abs_diff_eq!(state.trace().re, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.trace().im, 0.0, epsilon = 1e-9);
        // Hermitian
        let dev: f64
            = rho.iter().zip(dagger(rho).iter())
            .map(|(l, r)| (l - r).norm())
            .fold(0.0, f64::max);
        assert!(dev < 1e-9);
        // pure by construction, hence ρ² = ρ and positive-semidefinite
        let rho2 = rho.dot(rho);
        let dev2: f64
            = rho.iter().zip(rho2.iter())
            .map(|(l, r)| (l - r).norm())
            .fold(0.0, f64::max);
        assert!(dev2 < 1e-9);
    }

    #[test]
    fn construction_rejects_bad_lengths() {
        assert!(IonState::new(amps(&[1.0, 0.0, 0.0]), 4).is_err());
        assert!(IonState::new(amps(&[1.0; 6]), 4).is_err());
        assert!(IonState::new(amps(&[1.0, 0.0, 0.0, 0.0]), 4).is_ok());
        assert!(IonState::new(amps(&[1.0, 0.0, 0.0, 0.0, 2.0]), 4).is_ok());
    }

    #[test]
    fn raw_matrix_infers_dim() {
        let rho: nd::Array2<C64> = nd::Array2::eye(12);
        let state = IonState::new(rho, 20).unwrap();
        assert_eq!(state.dim(), 3);
        assert_abs_diff_eq!(state.trace().re, 1.0, epsilon = 1e-12);

        let bad: nd::Array2<C64> = nd::Array2::eye(10);
        assert!(IonState::new(bad, 20).is_err());
    }

    #[test]
    fn fock_index_places_population() {
        let state
            = IonState::new(amps(&[1.0, 0.0, 0.0, 0.0, 2.0]), 5).unwrap();
        assert_eq!(state.current()[[2, 2]], C64::from(1.0));
        assert_eq!(state.populations(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn populations_channel_ordering() {
        // |ge⟩ lands in the combined middle channel
        let state = IonState::new(amps(&[0.0, 1.0, 0.0, 0.0]), 3).unwrap();
        let p = state.populations();
        assert_abs_diff_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn reset_restores_construction_populations() {
        let mut state = IonState::new(amps(&[1.0, 0.0, 0.0, 1.0]), 4).unwrap();
        let before = state.populations();
        let x1 = ion_kron(0, &sigma_x(), state.dim());
        state.apply_unitary(&x1);
        assert_ne!(state.populations(), before);
        state.reset_state();
        assert_eq!(state.populations(), before);
        assert_eq!(state.current(), state.initial());
    }
}
