//! Completely positive noise maps applied in place to the working density
//! matrix.
//!
//! Factors outside [0, 1] are not validated; both maps are trace-preserving
//! on that range.

use num_complex::Complex64 as C64;
use crate::{
    hilbert::IonState,
    operators::{ ion_kron, sigma_x },
};

/// State-preparation/measurement error: a probabilistic bit-flip channel
/// applied independently per ion, `ρ ← (1−f)ρ + f·Xᵢ ρ Xᵢ` for ion 1 then
/// ion 2.
///
/// A factor of 0 leaves the state bit-for-bit unchanged.
pub fn spam(state: &mut IonState, factor: f64) {
    if factor == 0.0 { return; }
    let dim = state.dim();
    for idx in 0..2 {
        let x = ion_kron(idx, &sigma_x(), dim);
        let flipped = x.dot(state.current()).dot(&x);
        let rho = state.current_mut();
        *rho = rho.mapv(|p| (1.0 - factor) * p)
            + flipped.mapv(|p| factor * p);
    }
}

/// Depolarization toward the maximally mixed state over the full composite
/// space, `ρ ← (1−f)ρ + f/(4·dim)·I`.
///
/// A factor of 0 leaves the state bit-for-bit unchanged.
pub fn depolarize(state: &mut IonState, factor: f64) {
    if factor == 0.0 { return; }
    let uniform = C64::from(factor / state.size() as f64);
    let rho = state.current_mut();
    rho.mapv_inplace(|p| (1.0 - factor) * p);
    rho.diag_mut().iter_mut().for_each(|p| { *p += uniform; });
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64 as C64;
    use super::*;
    use crate::hilbert::{ IonState, StateInit };

    fn bell_pair(dim: usize) -> IonState {
        let amps: Vec<C64>
            = [1.0, 0.0, 0.0, 1.0].iter().map(|x| C64::from(*x)).collect();
        IonState::new(StateInit::Amps(amps), dim).unwrap()
    }

    #[test]
    fn zero_factor_is_identity() {
        let mut state = bell_pair(4);
        let before = state.current().clone();
        spam(&mut state, 0.0);
        assert_eq!(*state.current(), before);
        depolarize(&mut state, 0.0);
        assert_eq!(*state.current(), before);
    }

    #[test]
    fn channels_preserve_trace() {
        let mut state = bell_pair(5);
        spam(&mut state, 0.3);
        assert_abs_diff_eq!(state.trace().re, 1.0, epsilon = 1e-12);
        depolarize(&mut state, 0.7);
        assert_abs_diff_eq!(state.trace().re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn full_spam_flips_both_ions() {
        let amps: Vec<C64>
            = [1.0, 0.0, 0.0, 0.0].iter().map(|x| C64::from(*x)).collect();
        let mut state
            = IonState::new(StateInit::Amps(amps), 3).unwrap();
        spam(&mut state, 1.0);
        let p = state.populations();
        assert_abs_diff_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn full_depolarization_is_maximally_mixed() {
        let mut state = bell_pair(3);
        depolarize(&mut state, 1.0);
        let n = state.size();
        for p in state.current().diag().iter() {
            assert_abs_diff_eq!(p.re, 1.0 / n as f64, epsilon = 1e-12);
        }
    }
}
