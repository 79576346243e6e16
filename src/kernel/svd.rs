//! Singular value decomposition by Golub-Kahan-Reinsch.
//!
//! Computes `A = U · diag(q) · Vᵗ` for a real `m × n` matrix with `m >= n`
//! in two phases:
//!
//! 1. **Bidiagonalization**: alternating left/right Householder reflections
//!    reduce `A` to upper bidiagonal form (diagonal in `q`, superdiagonal in
//!    `e`). The reflections are then accumulated into `U` and `V` on demand.
//! 2. **Diagonalization**: implicit-shift QR sweeps chase the superdiagonal
//!    to zero, one singular value at a time from the bottom up.
//!
//! # Algorithm: Golub & Reinsch, 1970
//!
//! "Singular Value Decomposition and Least Squares Solutions",
//! Numerische Mathematik 14, 403-420.
//!
//! # Example
//!
//! ```rust
//! use cartograph::kernel::{svd, Matrix, SvdOptions};
//!
//! let a = Matrix::from_rows(&[[4.0, 11.0, 14.0], [5.0, 6.0, 7.0], [8.0, 9.0, 10.0]]).unwrap();
//! let result = svd(&a, &SvdOptions::default()).unwrap();
//! assert!(result.status.is_converged());
//! assert!(result.q[0] >= result.q[1] && result.q[1] >= result.q[2]);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::matrix::Matrix;
use crate::error::{CartographError, Result};

/// Solver configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvdOptions {
    /// Accumulate the left singular vectors.
    pub with_u: bool,
    /// Accumulate the right singular vectors.
    pub with_v: bool,
    /// Relative convergence threshold, scaled by the largest bidiagonal row norm.
    pub eps: f64,
    /// Householder skip threshold. `None` means `f64::MIN_POSITIVE / eps`.
    pub tol: Option<f64>,
    /// QR sweeps allowed per singular value.
    pub qr_iters: usize,
    /// Sort singular values non-increasing and permute U/V to match.
    pub sort_descending: bool,
}

impl Default for SvdOptions {
    fn default() -> Self {
        Self {
            with_u: true,
            with_v: true,
            eps: f64::EPSILON,
            tol: None,
            qr_iters: 10,
            sort_descending: true,
        }
    }
}

impl SvdOptions {
    pub fn with_u(mut self, with_u: bool) -> Self {
        self.with_u = with_u;
        self
    }

    pub fn with_v(mut self, with_v: bool) -> Self {
        self.with_v = with_v;
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = Some(tol);
        self
    }

    pub fn with_qr_iters(mut self, qr_iters: usize) -> Self {
        self.qr_iters = qr_iters;
        self
    }

    pub fn with_sort_descending(mut self, sort: bool) -> Self {
        self.sort_descending = sort;
        self
    }

    /// Effective Householder threshold.
    pub fn effective_tol(&self) -> f64 {
        self.tol.unwrap_or(f64::MIN_POSITIVE / self.eps)
    }

    /// `eps` must be finite and positive, `tol` finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(CartographError::Precondition(format!(
                "eps must be finite and positive, got {}",
                self.eps
            )));
        }
        let tol = self.effective_tol();
        if !(tol.is_finite() && tol >= 0.0) {
            return Err(CartographError::Precondition(format!(
                "tol must be finite and non-negative, got {}",
                tol
            )));
        }
        Ok(())
    }
}

/// How the diagonalization phase ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Convergence {
    /// Every singular value split off within the iteration cap.
    Converged { iterations: usize },
    /// `unconverged` singular values exhausted `qr_iters` sweeps; the result
    /// is the best approximation reached.
    MaxIterationsReached { iterations: usize, unconverged: usize },
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    /// Total QR sweeps performed.
    pub fn iterations(&self) -> usize {
        match *self {
            Convergence::Converged { iterations } => iterations,
            Convergence::MaxIterationsReached { iterations, .. } => iterations,
        }
    }
}

/// Output of [`svd`].
#[derive(Clone, Debug)]
pub struct SvdResult {
    /// Singular values (length n).
    pub q: Vec<f64>,
    /// Left singular vectors, m × n with orthonormal columns.
    pub u: Option<Matrix>,
    /// Right singular vectors, n × n orthogonal.
    pub v: Option<Matrix>,
    pub status: Convergence,
}

impl SvdResult {
    /// Reorder singular values non-increasing, permuting the columns of U and
    /// V identically. Ties keep their relative order.
    pub fn sort_descending(&mut self) {
        let n = self.q.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| self.q[b].total_cmp(&self.q[a]));

        // Apply the permutation by cycle-following swaps: position i takes
        // the value currently at `order[i]`.
        let mut pos: Vec<usize> = (0..n).collect(); // pos[orig] = current slot
        let mut at: Vec<usize> = (0..n).collect(); // at[slot] = orig index held
        for (i, &src) in order.iter().enumerate() {
            let j = pos[src];
            if i == j {
                continue;
            }
            self.q.swap(i, j);
            if let Some(u) = self.u.as_mut() {
                u.swap_columns(i, j);
            }
            if let Some(v) = self.v.as_mut() {
                v.swap_columns(i, j);
            }
            let displaced = at[i];
            at.swap(i, j);
            pos[src] = i;
            pos[displaced] = j;
        }
    }

    /// Rebuild `U · diag(q) · Vᵗ`. `None` unless both U and V were computed.
    pub fn reconstruct(&self) -> Option<Matrix> {
        let u = self.u.as_ref()?;
        let v = self.v.as_ref()?;
        let (m, n) = u.size();
        let mut out = Matrix::zeros(m, v.rows());
        for i in 0..m {
            for j in 0..v.rows() {
                out[(i, j)] = (0..n).map(|k| u[(i, k)] * self.q[k] * v[(j, k)]).sum();
            }
        }
        Some(out)
    }
}

/// Decompose `a` (m × n, m >= n).
///
/// Fails with [`CartographError::Precondition`] when `a` has fewer rows than
/// columns. Hitting the iteration cap is not an error: inspect
/// [`SvdResult::status`].
pub fn svd(a: &Matrix, options: &SvdOptions) -> Result<SvdResult> {
    let (m, n) = a.size();
    if m < n {
        return Err(CartographError::Precondition(format!(
            "SVD requires rows >= columns, got {}x{}",
            m, n
        )));
    }
    options.validate()?;

    let mut work = GolubKahan::new(a, options);
    let x = work.bidiagonalize(options.effective_tol());
    if options.with_v {
        work.accumulate_right();
    }
    if options.with_u {
        work.accumulate_left();
    }
    let status = work.diagonalize(options.eps * x, options.qr_iters);

    match status {
        Convergence::Converged { iterations } => {
            debug!(rows = m, cols = n, iterations, "svd converged");
        }
        Convergence::MaxIterationsReached {
            iterations,
            unconverged,
        } => {
            warn!(
                rows = m,
                cols = n,
                iterations,
                unconverged,
                qr_iters = options.qr_iters,
                "svd hit iteration cap"
            );
        }
    }

    let mut result = SvdResult {
        q: work.q,
        u: options.with_u.then_some(work.u),
        v: options.with_v.then_some(work.v),
        status,
    };
    if options.sort_descending {
        result.sort_descending();
    }
    Ok(result)
}

/// Outcome of the splitting test for the trailing block ending at `k`.
enum Split {
    /// `e[l]` is negligible: the block `l..=k` is decoupled.
    Decoupled(usize),
    /// `q[l - 1]` is negligible: cancel `e[l]` before testing again.
    Cancel(usize),
}

/// Working state shared by both phases.
struct GolubKahan {
    m: usize,
    n: usize,
    with_u: bool,
    with_v: bool,
    /// Diagonal of the bidiagonal form, then the singular values.
    q: Vec<f64>,
    /// Superdiagonal; `e[i]` couples `q[i - 1]` and `q[i]`, `e[0] == 0`.
    e: Vec<f64>,
    /// Starts as a copy of A; holds the Householder vectors, then U.
    u: Matrix,
    v: Matrix,
}

impl GolubKahan {
    fn new(a: &Matrix, options: &SvdOptions) -> Self {
        let (m, n) = a.size();
        Self {
            m,
            n,
            with_u: options.with_u,
            with_v: options.with_v,
            q: vec![0.0; n],
            e: vec![0.0; n],
            u: a.clone(),
            v: if options.with_v {
                Matrix::zeros(n, n)
            } else {
                Matrix::zeros(0, 0)
            },
        }
    }

    /// Householder reduction to bidiagonal form. Returns the largest
    /// `|q[i]| + |e[i]|`, used to scale the convergence threshold.
    fn bidiagonalize(&mut self, tol: f64) -> f64 {
        let (m, n) = (self.m, self.n);
        let u = &mut self.u;
        let mut g = 0.0_f64;
        let mut x = 0.0_f64;

        for i in 0..n {
            self.e[i] = g;
            let l = i + 1;

            // Left reflection: zero column i below the diagonal.
            let s: f64 = (i..m).map(|j| u[(j, i)] * u[(j, i)]).sum();
            if s <= tol {
                g = 0.0;
            } else {
                let f = u[(i, i)];
                g = if f < 0.0 { s.sqrt() } else { -s.sqrt() };
                let h = f * g - s;
                u[(i, i)] = f - g;
                for j in l..n {
                    let s: f64 = (i..m).map(|k| u[(k, i)] * u[(k, j)]).sum();
                    let f = s / h;
                    for k in i..m {
                        let ui = u[(k, i)];
                        u[(k, j)] += f * ui;
                    }
                }
            }
            self.q[i] = g;

            // Right reflection: zero row i right of the superdiagonal.
            let s: f64 = (l..n).map(|j| u[(i, j)] * u[(i, j)]).sum();
            if l == n || s <= tol {
                g = 0.0;
            } else {
                let f = u[(i, l)];
                g = if f < 0.0 { s.sqrt() } else { -s.sqrt() };
                let h = f * g - s;
                u[(i, l)] = f - g;
                for j in l..n {
                    self.e[j] = u[(i, j)] / h;
                }
                for j in l..m {
                    let s: f64 = (l..n).map(|k| u[(j, k)] * u[(i, k)]).sum();
                    for k in l..n {
                        u[(j, k)] += s * self.e[k];
                    }
                }
            }

            let y = self.q[i].abs() + self.e[i].abs();
            if y > x {
                x = y;
            }
        }
        x
    }

    /// Build V from the right reflections stored in the rows of `u`.
    fn accumulate_right(&mut self) {
        let n = self.n;
        let (u, v) = (&self.u, &mut self.v);
        for i in (0..n).rev() {
            let l = i + 1;
            // The right reflection of row i left its scale in e[i + 1].
            let g = if l < n { self.e[l] } else { 0.0 };
            if g != 0.0 {
                let h = u[(i, l)] * g;
                for j in l..n {
                    v[(j, i)] = u[(i, j)] / h;
                }
                for j in l..n {
                    let s: f64 = (l..n).map(|k| u[(i, k)] * v[(k, j)]).sum();
                    for k in l..n {
                        let vi = v[(k, i)];
                        v[(k, j)] += s * vi;
                    }
                }
            }
            for j in l..n {
                v[(i, j)] = 0.0;
                v[(j, i)] = 0.0;
            }
            v[(i, i)] = 1.0;
        }
    }

    /// Overwrite `u` with U built from the left reflections in its columns.
    fn accumulate_left(&mut self) {
        let (m, n) = (self.m, self.n);
        let u = &mut self.u;
        for i in (0..n).rev() {
            let l = i + 1;
            let g = self.q[i];
            for j in l..n {
                u[(i, j)] = 0.0;
            }
            if g != 0.0 {
                let h = u[(i, i)] * g;
                for j in l..n {
                    let s: f64 = (l..m).map(|k| u[(k, i)] * u[(k, j)]).sum();
                    let f = s / h;
                    for k in i..m {
                        let ui = u[(k, i)];
                        u[(k, j)] += f * ui;
                    }
                }
                for j in i..m {
                    u[(j, i)] /= g;
                }
            } else {
                for j in i..m {
                    u[(j, i)] = 0.0;
                }
            }
            u[(i, i)] += 1.0;
        }
    }

    /// Implicit-shift QR on the bidiagonal form, bottom singular value first.
    fn diagonalize(&mut self, eps: f64, qr_iters: usize) -> Convergence {
        let mut iterations = 0;
        let mut unconverged = 0;

        for k in (0..self.n).rev() {
            let mut converged = false;
            for _ in 0..qr_iters {
                let l = match self.split(k, eps) {
                    Split::Decoupled(l) => l,
                    Split::Cancel(l) => {
                        self.cancel(l, k, eps);
                        l
                    }
                };
                if l == k {
                    self.canonicalize(k);
                    converged = true;
                    break;
                }
                self.qr_step(l, k);
                iterations += 1;
            }
            if !converged {
                unconverged += 1;
            }
        }

        if unconverged == 0 {
            Convergence::Converged { iterations }
        } else {
            Convergence::MaxIterationsReached {
                iterations,
                unconverged,
            }
        }
    }

    /// Scan `e[l..=k]` backwards for a negligible coupling.
    fn split(&self, k: usize, eps: f64) -> Split {
        let mut l = k;
        loop {
            if self.e[l].abs() <= eps || l == 0 {
                return Split::Decoupled(l);
            }
            if self.q[l - 1].abs() <= eps {
                return Split::Cancel(l);
            }
            l -= 1;
        }
    }

    /// `q[l - 1]` is negligible: rotate `e[l..=k]` into it from the left.
    fn cancel(&mut self, l: usize, k: usize, eps: f64) {
        let l1 = l - 1;
        let mut c = 0.0;
        let mut s = 1.0;
        for i in l..=k {
            let f = s * self.e[i];
            self.e[i] *= c;
            if f.abs() <= eps {
                break;
            }
            let g = self.q[i];
            let h = f.hypot(g);
            self.q[i] = h;
            c = g / h;
            s = -f / h;
            if self.with_u {
                rotate_columns(&mut self.u, l1, i, c, s);
            }
        }
    }

    /// `q[k]` has split off; make it non-negative.
    fn canonicalize(&mut self, k: usize) {
        if self.q[k] < 0.0 {
            self.q[k] = -self.q[k];
            if self.with_v {
                for j in 0..self.n {
                    self.v[(j, k)] = -self.v[(j, k)];
                }
            }
        }
    }

    /// One shifted QR sweep over the block `l..=k` (requires `l < k`).
    fn qr_step(&mut self, l: usize, k: usize) {
        // Wilkinson-style shift from the trailing 2×2 minor.
        let z = self.q[k];
        let mut x = self.q[l];
        let mut y = self.q[k - 1];
        let mut g = self.e[k - 1];
        let mut h = self.e[k];
        let mut f = ((y - z) * (y + z) + (g - h) * (g + h)) / (2.0 * h * y);
        g = f.hypot(1.0);
        let denom = if f < 0.0 { f - g } else { f + g };
        f = ((x - z) * (x + z) + h * (y / denom - h)) / x;

        let mut c = 1.0;
        let mut s = 1.0;
        for i in l + 1..=k {
            g = self.e[i];
            y = self.q[i];
            h = s * g;
            g *= c;

            // Right rotation on columns i-1, i.
            let z = f.hypot(h);
            self.e[i - 1] = z;
            c = f / z;
            s = h / z;
            f = x * c + g * s;
            g = -x * s + g * c;
            h = y * s;
            y *= c;
            if self.with_v {
                rotate_columns(&mut self.v, i - 1, i, c, s);
            }

            // Left rotation chasing the bulge.
            let z = f.hypot(h);
            self.q[i - 1] = z;
            c = f / z;
            s = h / z;
            f = c * g + s * y;
            x = -s * g + c * y;
            if self.with_u {
                rotate_columns(&mut self.u, i - 1, i, c, s);
            }
        }
        self.e[l] = 0.0;
        self.e[k] = f;
        self.q[k] = x;
    }
}

/// Apply the Givens rotation `(c, s)` to columns `a` and `b`.
fn rotate_columns(m: &mut Matrix, a: usize, b: usize, c: f64, s: f64) {
    for j in 0..m.rows() {
        let y = m[(j, a)];
        let z = m[(j, b)];
        m[(j, a)] = y * c + z * s;
        m[(j, b)] = -y * s + z * c;
    }
}

// =============================================================================
// Tests
// =============================================================================
