//! Differentieerbare scalair op basis van duale getallen (forward-mode).
//!
//! De optimizer rekent met waarden die naast het getal ook een afgeleide
//! meedragen; voor de mapper is dit gewoon "het numerieke payloadtype" van
//! het differentieerbare domein.

use std::ops::{Add, Div, Mul, Neg, Sub};

/// Scalair met waarde en afgeleide.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dual {
    val: f64,
    der: f64,
}

impl Dual {
    #[must_use]
    pub const fn new(val: f64, der: f64) -> Self {
        Self { val, der }
    }

    /// Constante: de afgeleide is nul.
    #[must_use]
    pub const fn constant(val: f64) -> Self {
        Self { val, der: 0.0 }
    }

    /// Optimalisatievariabele: de afgeleide naar zichzelf is één.
    #[must_use]
    pub const fn variable(val: f64) -> Self {
        Self { val, der: 1.0 }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.val
    }

    #[must_use]
    pub const fn derivative(self) -> f64 {
        self.der
    }

    #[must_use]
    pub fn sin(self) -> Self {
        Self {
            val: self.val.sin(),
            der: self.der * self.val.cos(),
        }
    }

    #[must_use]
    pub fn cos(self) -> Self {
        Self {
            val: self.val.cos(),
            der: -self.der * self.val.sin(),
        }
    }

    #[must_use]
    pub fn sqrt(self) -> Self {
        let root = self.val.sqrt();
        Self {
            val: root,
            der: self.der / (2.0 * root),
        }
    }

    /// Euclidische afstand tot de oorsprong van het punt `(self, other)`.
    #[must_use]
    pub fn hypot(self, other: Self) -> Self {
        (self * self + other * other).sqrt()
    }
}

impl From<f64> for Dual {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl Add for Dual {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            val: self.val + rhs.val,
            der: self.der + rhs.der,
        }
    }
}

impl Sub for Dual {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            val: self.val - rhs.val,
            der: self.der - rhs.der,
        }
    }
}

impl Mul for Dual {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            val: self.val * rhs.val,
            der: self.der * rhs.val + self.val * rhs.der,
        }
    }
}

impl Div for Dual {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self {
            val: self.val / rhs.val,
            der: (self.der * rhs.val - self.val * rhs.der) / (rhs.val * rhs.val),
        }
    }
}

impl Neg for Dual {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            val: -self.val,
            der: -self.der,
        }
    }
}
