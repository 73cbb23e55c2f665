//! Floating-point element types and precision selection.
//!
//! The engine is bound to the precision of its sample points. Instead of a
//! global precision context, the precision travels as a type parameter
//! (`T: Real`) and can be inspected at run time through [`Precision`].

use std::fmt::Debug;
use std::ops::AddAssign;

use burn::tensor::DType;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Floating-point width used for computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// 32-bit IEEE float.
    Single,
    /// 64-bit IEEE float.
    Double,
}

impl Precision {
    /// The matching burn data type.
    pub fn dtype(&self) -> DType {
        match self {
            Self::Single => DType::F32,
            Self::Double => DType::F64,
        }
    }

    /// Map a burn data type to a precision, if it is a supported float type.
    pub fn from_dtype(dtype: DType) -> Option<Self> {
        match dtype {
            DType::F32 => Some(Self::Single),
            DType::F64 => Some(Self::Double),
            _ => None,
        }
    }

    /// Size of one element in bytes.
    pub fn size_of(&self) -> usize {
        match self {
            Self::Single => 4,
            Self::Double => 8,
        }
    }
}

/// Scalar type the engine computes in.
pub trait Real: Float + AddAssign + Default + Debug + Send + Sync + 'static {
    /// Run-time tag of this type.
    const PRECISION: Precision;

    /// Lossy conversion from `f64`.
    fn from_f64(value: f64) -> Self;

    /// Widening conversion to `f64`.
    fn into_f64(self) -> f64;
}

impl Real for f32 {
    const PRECISION: Precision = Precision::Single;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn into_f64(self) -> f64 {
        self as f64
    }
}

impl Real for f64 {
    const PRECISION: Precision = Precision::Double;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn into_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_tags() {
        assert_eq!(<f32 as Real>::PRECISION, Precision::Single);
        assert_eq!(<f64 as Real>::PRECISION, Precision::Double);
    }

    #[test]
    fn test_dtype_roundtrip() {
        for p in [Precision::Single, Precision::Double] {
            assert_eq!(Precision::from_dtype(p.dtype()), Some(p));
        }
        assert_eq!(Precision::from_dtype(DType::I32), None);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(<f32 as Real>::from_f64(0.5), 0.5f32);
        assert_eq!(Real::into_f64(0.25f32), 0.25f64);
    }
}
