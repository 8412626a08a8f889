//! Forward-mode dual numbers for derivative evaluation of expression trees.
//!
//! A `Dual` carries a value and the derivative of that value along one
//! seeded direction. Seeding variable `i` with `Dual::variable(x_i)` and all
//! others with `Dual::constant(x_j)` yields the partial derivative in `i`.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dual {
    pub value: f64,
    pub derivative: f64,
}

impl Dual {
    pub const fn new(value: f64, derivative: f64) -> Self {
        Self { value, derivative }
    }

    /// A value that does not depend on the seeded direction.
    pub const fn constant(value: f64) -> Self {
        Self::new(value, 0.0)
    }

    /// The seeded variable itself.
    pub const fn variable(value: f64) -> Self {
        Self::new(value, 1.0)
    }

    pub fn scale(self, k: f64) -> Self {
        Self::new(self.value * k, self.derivative * k)
    }

    /// Absolute value; the derivative at zero is taken as zero.
    pub fn abs(self) -> Self {
        if self.value > 0.0 {
            self
        } else if self.value < 0.0 {
            -self
        } else {
            Self::constant(0.0)
        }
    }

    pub fn sqrt(self) -> Self {
        let root = self.value.sqrt();
        Self::new(root, self.derivative / (2.0 * root))
    }

    /// Quotient with the convention that division by an exact zero yields zero.
    pub fn checked_div(self, rhs: Self) -> Self {
        if rhs.value == 0.0 {
            Self::constant(0.0)
        } else {
            self / rhs
        }
    }
}

impl From<f64> for Dual {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl Add for Dual {
    type Output = Dual;

    fn add(self, rhs: Dual) -> Dual {
        Dual::new(self.value + rhs.value, self.derivative + rhs.derivative)
    }
}

impl AddAssign for Dual {
    fn add_assign(&mut self, rhs: Dual) {
        self.value += rhs.value;
        self.derivative += rhs.derivative;
    }
}

impl Sub for Dual {
    type Output = Dual;

    fn sub(self, rhs: Dual) -> Dual {
        Dual::new(self.value - rhs.value, self.derivative - rhs.derivative)
    }
}

impl Mul for Dual {
    type Output = Dual;

    fn mul(self, rhs: Dual) -> Dual {
        Dual::new(
            self.value * rhs.value,
            self.derivative * rhs.value + self.value * rhs.derivative,
        )
    }
}

impl Mul<f64> for Dual {
    type Output = Dual;

    fn mul(self, rhs: f64) -> Dual {
        self.scale(rhs)
    }
}

impl Div for Dual {
    type Output = Dual;

    fn div(self, rhs: Dual) -> Dual {
        let denom = rhs.value * rhs.value;
        Dual::new(
            self.value / rhs.value,
            (self.derivative * rhs.value - self.value * rhs.derivative) / denom,
        )
    }
}

impl Neg for Dual {
    type Output = Dual;

    fn neg(self) -> Dual {
        Dual::new(-self.value, -self.derivative)
    }
}
