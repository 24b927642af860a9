//! Scalar trait for jet component types.

use crate::codegen::ExprRef;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Trait for types a [`Jet`](crate::jet::Jet) can be built from.
///
/// Plain floats evaluate immediately; [`ExprRef`] records a node per
/// operation. The jet arithmetic is written once against this trait and
/// works for both.
pub trait Scalar:
    Clone
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// A literal living in the same context as `self`.
    ///
    /// For traced scalars this records a compile-time constant in the
    /// session `self` belongs to.
    fn constant_like(&self, value: f64) -> Self;

    /// Overwrite the value held by `self`.
    fn assign(&mut self, value: Self) {
        *self = value;
    }

    /// Returns the additive identity (zero).
    fn zero_like(&self) -> Self {
        self.constant_like(0.0)
    }

    /// Returns the multiplicative identity (one).
    fn one_like(&self) -> Self {
        self.constant_like(1.0)
    }
}

impl Scalar for f64 {
    fn constant_like(&self, value: f64) -> Self {
        value
    }
}

impl Scalar for f32 {
    fn constant_like(&self, value: f64) -> Self {
        value as f32
    }
}

impl<'r> Scalar for ExprRef<'r> {
    fn constant_like(&self, value: f64) -> Self {
        self.constant(value)
    }

    // Recorded as an assignment node; the slot id is kept.
    fn assign(&mut self, value: Self) {
        ExprRef::assign(self, value);
    }
}
