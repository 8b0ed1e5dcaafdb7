//! Finite-dimensional linear-operator primitives over the composite
//! {qubit ⊗ qubit ⊗ oscillator} Hilbert space.
//!
//! Everything here is a pure function of its inputs; dimension ordering is
//! fixed with the first ion leftmost and the motional mode rightmost.

use ndarray::{ self as nd, s, linalg::kron };
use ndarray_linalg::{ EighInto, InverseInto, UPLO };
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };

/// Pauli *x* operator for a single qubit in the {g, e} basis.
pub fn sigma_x() -> nd::Array2<C64> {
    nd::array![
        [C64::zero(), C64::one() ],
        [C64::one(),  C64::zero()],
    ]
}

/// Pauli *y* operator for a single qubit in the {g, e} basis.
pub fn sigma_y() -> nd::Array2<C64> {
    nd::array![
        [C64::zero(), -C64::i()  ],
        [C64::i(),     C64::zero()],
    ]
}

/// Pauli *z* operator for a single qubit in the {g, e} basis.
pub fn sigma_z() -> nd::Array2<C64> {
    nd::array![
        [C64::one(),   C64::zero()],
        [C64::zero(), -C64::one() ],
    ]
}

/// Identity on a single qubit.
pub fn qubit_id() -> nd::Array2<C64> { nd::Array2::eye(2) }

/// Annihilation operator *a* over a `dim`-level truncated oscillator.
pub fn ladder(dim: usize) -> nd::Array2<C64> {
    let mut a: nd::Array2<C64> = nd::Array2::zeros((dim, dim));
    a.slice_mut(s![..dim - 1, 1..dim])
        .diag_mut()
        .indexed_iter_mut()
        .for_each(|(n, elem)| {
            *elem = C64::from((n as f64 + 1.0).sqrt());
        });
    a
}

/// Conjugate transpose.
pub fn dagger(op: &nd::Array2<C64>) -> nd::Array2<C64> {
    op.t().mapv(|a| a.conj())
}

/// Dimensionless position quadrature `(a + a†) / √2` over a `dim`-level
/// truncated oscillator.
pub fn quad_x(dim: usize) -> nd::Array2<C64> {
    let a = ladder(dim);
    let ad = dagger(&a);
    (a + ad).mapv(|x| x / 2.0_f64.sqrt())
}

/// Dimensionless momentum quadrature `i (a† − a) / √2` over a `dim`-level
/// truncated oscillator.
pub fn quad_p(dim: usize) -> nd::Array2<C64> {
    let a = ladder(dim);
    let ad = dagger(&a);
    (ad - a).mapv(|p| C64::i() * p / 2.0_f64.sqrt())
}

/// Generator of a single-qubit rotation about the axis at angle `phi` in the
/// X–Y plane of the Bloch sphere, `cos(φ) σx + sin(φ) σy`.
pub fn rot_generator(phi: f64) -> nd::Array2<C64> {
    let x = sigma_x();
    let y = sigma_y();
    x.mapv(|a| phi.cos() * a) + y.mapv(|a| phi.sin() * a)
}

/// Kronecker product of three operators, preserving the fixed
/// {ion 1, ion 2, oscillator} ordering.
pub fn kron3(
    a: &nd::Array2<C64>,
    b: &nd::Array2<C64>,
    c: &nd::Array2<C64>,
) -> nd::Array2<C64>
{
    kron(&kron(a, b), c)
}

/// Embed a single-qubit operator acting on ion `idx` (0 or 1) in the full
/// composite space, with identities everywhere else.
///
/// *Panics* if `idx > 1`.
pub fn ion_kron(idx: usize, op: &nd::Array2<C64>, dim: usize)
    -> nd::Array2<C64>
{
    let id = qubit_id();
    let eye = nd::Array2::eye(dim);
    match idx {
        0 => kron3(op, &id, &eye),
        1 => kron3(&id, op, &eye),
        _ => panic!("ion_kron: ion index out of range"),
    }
}

/// Compute `exp(iθH)` for Hermitian `H` by eigendecomposition.
///
/// Exact up to the accuracy of the underlying diagonalization; inputs are
/// assumed to have well-conditioned spectra.
pub fn exp_i(H: &nd::Array2<C64>, theta: f64) -> nd::Array2<C64> {
    let (evals, evects): (nd::Array1<f64>, nd::Array2<C64>)
        = H.clone().eigh_into(UPLO::Lower)
        .expect("exp_i: error diagonalizing");
    let L = nd::Array2::from_diag(
        &evals.mapv(|lk| C64::from_polar(1.0, theta * lk)));
    let V = evects.clone();
    let U = evects.inv_into()
        .expect("exp_i: error inverting");
    V.dot(&L).dot(&U)
}

/// Operator-valued displacement `exp(A ⊗ a† − A† ⊗ a)` of the oscillator
/// mode, with amplitude operator `A` acting on the two-qubit space.
///
/// The generator is anti-Hermitian for any `A`, so the result is always
/// unitary.
pub fn displacement(A: &nd::Array2<C64>, dim: usize) -> nd::Array2<C64> {
    let a = ladder(dim);
    let ad = dagger(&a);
    let G = kron(A, &ad) - kron(&dagger(A), &a);
    exp_i(&G.mapv(|g| -C64::i() * g), 1.0)
}
