//! # Complex Value Module
//!
//! An immutable complex number used to carry normalised samples into the
//! transform and frequency coefficients back out of it.

use rustfft::num_complex::Complex as FftComplex;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A complex number with `f64` real and imaginary parts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    pub const fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    /// A purely real value.
    pub const fn real(re: f64) -> Self {
        Complex { re, im: 0.0 }
    }

    pub fn re(&self) -> f64 {
        self.re
    }

    pub fn im(&self) -> f64 {
        self.im
    }

    /// Modulus, computed with `hypot` to avoid intermediate overflow.
    pub fn abs(&self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Argument in `[-pi, pi]`.
    pub fn phase(&self) -> f64 {
        self.im.atan2(self.re)
    }

    pub fn conjugate(&self) -> Self {
        Complex::new(self.re, -self.im)
    }

    pub fn scale(&self, alpha: f64) -> Self {
        Complex::new(alpha * self.re, alpha * self.im)
    }

    pub fn reciprocal(&self) -> Self {
        let scale = self.re * self.re + self.im * self.im;
        Complex::new(self.re / scale, -self.im / scale)
    }

    pub fn exp(&self) -> Self {
        let magnitude = self.re.exp();
        Complex::new(magnitude * self.im.cos(), magnitude * self.im.sin())
    }

    pub fn sin(&self) -> Self {
        Complex::new(
            self.re.sin() * self.im.cosh(),
            self.re.cos() * self.im.sinh(),
        )
    }

    pub fn cos(&self) -> Self {
        Complex::new(
            self.re.cos() * self.im.cosh(),
            -self.re.sin() * self.im.sinh(),
        )
    }

    pub fn tan(&self) -> Self {
        self.sin() / self.cos()
    }
}

impl Add for Complex {
    type Output = Complex;

    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;

    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;

    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Complex {
    type Output = Complex;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: Complex) -> Complex {
        self * rhs.reciprocal()
    }
}

impl Neg for Complex {
    type Output = Complex;

    fn neg(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }
}

impl From<FftComplex<f64>> for Complex {
    fn from(c: FftComplex<f64>) -> Self {
        Complex::new(c.re, c.im)
    }
}

impl From<Complex> for FftComplex<f64> {
    fn from(c: Complex) -> Self {
        FftComplex { re: c.re, im: c.im }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im == 0.0 {
            write!(f, "{}", self.re)
        } else if self.re == 0.0 {
            write!(f, "{}i", self.im)
        } else if self.im < 0.0 {
            write!(f, "{} - {}i", self.re, -self.im)
        } else {
            write!(f, "{} + {}i", self.re, self.im)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex, b: Complex) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn arithmetic_matches_hand_computed_values() {
        let a = Complex::new(5.0, 6.0);
        let b = Complex::new(-3.0, 4.0);

        assert_eq!(b + a, Complex::new(2.0, 10.0));
        assert_eq!(a - b, Complex::new(8.0, 2.0));
        assert_eq!(a * b, Complex::new(-39.0, 2.0));
        assert_eq!(a * b, b * a);
        assert!(close(a / b, Complex::new(0.36, -1.52)));
        assert!(close((a / b) * b, a));
        assert_eq!(a.conjugate(), Complex::new(5.0, -6.0));
        assert_eq!(-a, Complex::new(-5.0, -6.0));
    }

    #[test]
    fn magnitude_and_phase() {
        let a = Complex::new(5.0, 6.0);
        assert!((a.abs() - 7.810249675906654).abs() < 1e-12);
        assert!((Complex::new(0.0, 1.0).phase() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(Complex::real(-2.0).phase(), std::f64::consts::PI);
    }

    #[test]
    fn transcendental_functions() {
        let a = Complex::new(5.0, 6.0);
        assert!(close(a.tan(), Complex::new(-6.685231390246571e-6, 1.0000103108981198)));
        let i_pi = Complex::new(0.0, std::f64::consts::PI);
        assert!(close(i_pi.exp(), Complex::real(-1.0)));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Complex::new(5.0, 6.0).to_string(), "5 + 6i");
        assert_eq!(Complex::new(5.0, -6.0).to_string(), "5 - 6i");
        assert_eq!(Complex::real(1.5).to_string(), "1.5");
        assert_eq!(Complex::new(0.0, 2.0).to_string(), "2i");
    }

    #[test]
    fn converts_to_and_from_rustfft() {
        let a = Complex::new(1.25, -0.5);
        let fft: FftComplex<f64> = a.into();
        assert_eq!(fft.re, 1.25);
        assert_eq!(Complex::from(fft), a);
    }
}
