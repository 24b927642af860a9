//! Jet - N-dimensional dual number for forward-mode automatic differentiation.
//!
//! A jet carries a primal value `a` and a derivative vector `v` of fixed
//! dimension `N`. Arithmetic applies the sum, product and quotient rules
//! component-wise:
//!
//! ```text
//! (a, u') + (b, w') = (a + b, u' + w')
//! (a, u') * (b, w') = (a * b, a * w' + u' * b)
//! (a, u') / (b, w') = (a / b, (u' - (a / b) * w') / b)
//! ```
//!
//! The component type is any [`Scalar`]. With `f64` the jet evaluates
//! derivatives directly; with [`ExprRef`] every component operation is
//! recorded, which yields a graph computing the value and its gradient.
//!
//! # Example
//!
//! ```
//! use jetgraph::codegen::ExpressionRecorder;
//! use jetgraph::jet::Jet;
//!
//! // Plain evaluation: d/dx x^2 at x = 3
//! let x = Jet::<f64, 1>::new(3.0, 0).unwrap();
//! let y = x * x;
//! assert_eq!(*y.primal(), 9.0);
//! assert_eq!(*y.derivative(0), 6.0);
//!
//! // Recording the same computation
//! let recorder = ExpressionRecorder::start().unwrap();
//! let x = Jet::<_, 1>::new(recorder.constant(3.0), 0).unwrap();
//! let ids = (x * x).ids();
//! let graph = recorder.stop();
//! assert_eq!(ids.primal.index(), 4);
//! assert_eq!(ids.derivatives[0].index(), 7);
//! assert_eq!(graph.size(), 8);
//! ```

use crate::codegen::{ExprRef, ExpressionId};
use crate::error::ExprError;
use crate::scalar::Scalar;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A scalar together with its partial derivatives along `N` directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jet<T, const N: usize> {
    /// The primal (function value).
    a: T,
    /// The derivative components.
    v: [T; N],
}

impl<T: Scalar, const N: usize> Jet<T, N> {
    /// Create the jet of an independent variable.
    ///
    /// The derivative vector is zero except for slot `k`, which is one.
    /// Each slot is first given its own zero and slot `k` is then
    /// overwritten, so a traced jet records the overwrite as an
    /// assignment node.
    ///
    /// # Errors
    /// Returns [`ExprError::SeedIndexOutOfRange`] if `k >= N`. Nothing is
    /// recorded in that case.
    pub fn new(value: T, k: usize) -> Result<Self, ExprError> {
        if k >= N {
            return Err(ExprError::SeedIndexOutOfRange {
                index: k,
                dimension: N,
            });
        }
        let mut jet = Self::constant(value);
        let one = jet.a.one_like();
        jet.v[k].assign(one);
        Ok(jet)
    }

    /// Create a jet with all derivatives zero.
    pub fn constant(value: T) -> Self {
        let v = std::array::from_fn(|_| value.zero_like());
        Self { a: value, v }
    }

    /// Create from primal and derivative components.
    pub fn from_parts(a: T, v: [T; N]) -> Self {
        Self { a, v }
    }

    /// Get the primal.
    pub fn primal(&self) -> &T {
        &self.a
    }

    /// Get the derivative along direction `i`.
    ///
    /// # Panics
    /// Panics if `i >= N`.
    pub fn derivative(&self, i: usize) -> &T {
        &self.v[i]
    }

    /// Get all derivative components.
    pub fn derivatives(&self) -> &[T; N] {
        &self.v
    }

    /// Consume and return primal and derivatives.
    pub fn into_parts(self) -> (T, [T; N]) {
        (self.a, self.v)
    }

    /// Dimension of the derivative vector.
    pub fn dimension(&self) -> usize {
        N
    }
}

// Rules for a scalar `s` on the left of a jet `f`.
impl<T: Scalar, const N: usize> Jet<T, N> {
    fn added_to(self, s: T) -> Self {
        Jet {
            a: s + self.a,
            v: self.v,
        }
    }

    fn subtracted_from(self, s: T) -> Self {
        Jet {
            a: s - self.a,
            v: self.v.map(|u| -u),
        }
    }

    fn scaled_by(self, s: T) -> Self {
        let a = s.clone() * self.a;
        let v = self.v.map(|u| s.clone() * u);
        Jet { a, v }
    }

    fn dividing(self, s: T) -> Self {
        // (s / f)' = -s f' / f^2 = -(s / f) f' / f
        let inverse = self.a.one_like() / self.a;
        let a = s * inverse.clone();
        let v = self.v.map(|u| -(a.clone() * u) * inverse.clone());
        Jet { a, v }
    }
}

/// Graph positions of a traced jet's components.
///
/// Ids stay valid after the session ends, which is how callers find the
/// value and Jacobian row in the finished graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JetIds<const N: usize> {
    pub primal: ExpressionId,
    pub derivatives: [ExpressionId; N],
}

impl<const N: usize> Jet<ExprRef<'_>, N> {
    /// Ids of the nodes holding the primal and each derivative.
    pub fn ids(&self) -> JetIds<N> {
        JetIds {
            primal: self.a.id(),
            derivatives: self.v.map(|d| d.id()),
        }
    }
}

impl<T: Scalar, const N: usize> Add for Jet<T, N> {
    type Output = Jet<T, N>;

    fn add(self, rhs: Jet<T, N>) -> Jet<T, N> {
        let a = self.a + rhs.a;
        let v = std::array::from_fn(|i| self.v[i].clone() + rhs.v[i].clone());
        Jet { a, v }
    }
}

impl<T: Scalar, const N: usize> Sub for Jet<T, N> {
    type Output = Jet<T, N>;

    fn sub(self, rhs: Jet<T, N>) -> Jet<T, N> {
        let a = self.a - rhs.a;
        let v = std::array::from_fn(|i| self.v[i].clone() - rhs.v[i].clone());
        Jet { a, v }
    }
}

impl<T: Scalar, const N: usize> Neg for Jet<T, N> {
    type Output = Jet<T, N>;

    fn neg(self) -> Jet<T, N> {
        Jet {
            a: -self.a,
            v: self.v.map(|u| -u),
        }
    }
}

impl<T: Scalar, const N: usize> Mul for Jet<T, N> {
    type Output = Jet<T, N>;

    // Both cross terms are recorded even when `self` and `rhs` are the same
    // jet; collapsing them is left to common subexpression elimination.
    fn mul(self, rhs: Jet<T, N>) -> Jet<T, N> {
        let a = self.a.clone() * rhs.a.clone();
        let v = std::array::from_fn(|i| {
            let left = self.a.clone() * rhs.v[i].clone();
            let right = self.v[i].clone() * rhs.a.clone();
            left + right
        });
        Jet { a, v }
    }
}

impl<T: Scalar, const N: usize> Div for Jet<T, N> {
    type Output = Jet<T, N>;

    fn div(self, rhs: Jet<T, N>) -> Jet<T, N> {
        // b = u / w
        // b' = u' / w - u w' / w^2 = (u' - b w') / w
        let inverse = rhs.a.one_like() / rhs.a;
        let a = self.a * inverse.clone();
        let v = std::array::from_fn(|i| {
            (self.v[i].clone() - a.clone() * rhs.v[i].clone()) * inverse.clone()
        });
        Jet { a, v }
    }
}

// Scalar operands act as constants: their derivative is zero.

impl<T: Scalar, const N: usize> Add<T> for Jet<T, N> {
    type Output = Jet<T, N>;

    fn add(self, rhs: T) -> Jet<T, N> {
        Jet {
            a: self.a + rhs,
            v: self.v,
        }
    }
}

impl<T: Scalar, const N: usize> Sub<T> for Jet<T, N> {
    type Output = Jet<T, N>;

    fn sub(self, rhs: T) -> Jet<T, N> {
        Jet {
            a: self.a - rhs,
            v: self.v,
        }
    }
}

impl<T: Scalar, const N: usize> Mul<T> for Jet<T, N> {
    type Output = Jet<T, N>;

    fn mul(self, rhs: T) -> Jet<T, N> {
        let a = self.a * rhs.clone();
        let v = self.v.map(|u| u * rhs.clone());
        Jet { a, v }
    }
}

impl<T: Scalar, const N: usize> Div<T> for Jet<T, N> {
    type Output = Jet<T, N>;

    fn div(self, rhs: T) -> Jet<T, N> {
        let inverse = rhs.one_like() / rhs;
        let a = self.a * inverse.clone();
        let v = self.v.map(|u| u * inverse.clone());
        Jet { a, v }
    }
}

macro_rules! impl_scalar_lhs_ops {
    ([$($lt:lifetime)?] $scalar:ty) => {
        impl<$($lt,)? const N: usize> Add<Jet<$scalar, N>> for $scalar {
            type Output = Jet<$scalar, N>;

            fn add(self, rhs: Jet<$scalar, N>) -> Jet<$scalar, N> {
                rhs.added_to(self)
            }
        }

        impl<$($lt,)? const N: usize> Sub<Jet<$scalar, N>> for $scalar {
            type Output = Jet<$scalar, N>;

            fn sub(self, rhs: Jet<$scalar, N>) -> Jet<$scalar, N> {
                rhs.subtracted_from(self)
            }
        }

        impl<$($lt,)? const N: usize> Mul<Jet<$scalar, N>> for $scalar {
            type Output = Jet<$scalar, N>;

            fn mul(self, rhs: Jet<$scalar, N>) -> Jet<$scalar, N> {
                rhs.scaled_by(self)
            }
        }

        impl<$($lt,)? const N: usize> Div<Jet<$scalar, N>> for $scalar {
            type Output = Jet<$scalar, N>;

            fn div(self, rhs: Jet<$scalar, N>) -> Jet<$scalar, N> {
                rhs.dividing(self)
            }
        }
    };
}

impl_scalar_lhs_ops!([] f64);
impl_scalar_lhs_ops!([] f32);
impl_scalar_lhs_ops!(['r] ExprRef<'r>);

// Compound assignment rebinds the jet to the result. Traced components
// therefore name new nodes; no assignment nodes are recorded.
macro_rules! impl_jet_op_assign {
    ($assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl<T: Scalar, const N: usize> $assign_trait for Jet<T, N> {
            fn $assign_method(&mut self, rhs: Jet<T, N>) {
                *self = self.clone() $op rhs;
            }
        }

        impl<T: Scalar, const N: usize> $assign_trait<T> for Jet<T, N> {
            fn $assign_method(&mut self, rhs: T) {
                *self = self.clone() $op rhs;
            }
        }
    };
}

impl_jet_op_assign!(AddAssign, add_assign, +);
impl_jet_op_assign!(SubAssign, sub_assign, -);
impl_jet_op_assign!(MulAssign, mul_assign, *);
impl_jet_op_assign!(DivAssign, div_assign, /);
