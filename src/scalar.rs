use std::cmp::Ordering;

use crate::dtype::Dtype;
use crate::error::{DynVecError, Result};

/// A single type-erased numeric value carrying its own type tag.
///
/// Fixed-size, passed by value, never heap-allocated. The variant is the
/// runtime tag; promotion and comparison operate on the tag alone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
}

macro_rules! impl_from {
    ($t:ty, $variant:ident) => {
        impl From<$t> for Scalar {
            fn from(v: $t) -> Self {
                Scalar::$variant(v)
            }
        }
    };
}

impl_from!(bool, Bool);
impl_from!(u8, U8);
impl_from!(i8, I8);
impl_from!(u16, U16);
impl_from!(i16, I16);
impl_from!(u32, U32);
impl_from!(i32, I32);
impl_from!(u64, U64);
impl_from!(i64, I64);
impl_from!(f32, F32);
impl_from!(f64, F64);

impl Scalar {
    pub fn dtype(&self) -> Dtype {
        match self {
            Scalar::Bool(_) => Dtype::Bool,
            Scalar::U8(_) => Dtype::U8,
            Scalar::I8(_) => Dtype::I8,
            Scalar::U16(_) => Dtype::U16,
            Scalar::I16(_) => Dtype::I16,
            Scalar::U32(_) => Dtype::U32,
            Scalar::I32(_) => Dtype::I32,
            Scalar::U64(_) => Dtype::U64,
            Scalar::I64(_) => Dtype::I64,
            Scalar::F32(_) => Dtype::F32,
            Scalar::F64(_) => Dtype::F64,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype().is_numeric()
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            Scalar::Bool(v) => !v,
            Scalar::U8(v) => v == 0,
            Scalar::I8(v) => v == 0,
            Scalar::U16(v) => v == 0,
            Scalar::I16(v) => v == 0,
            Scalar::U32(v) => v == 0,
            Scalar::I32(v) => v == 0,
            Scalar::U64(v) => v == 0,
            Scalar::I64(v) => v == 0,
            Scalar::F32(v) => v == 0.0,
            Scalar::F64(v) => v == 0.0,
        }
    }

    /// Extract as i64. Defined for signed integers and for unsigned integers
    /// up to 32 bits (an exact widening); anything else is a `TypeMismatch`.
    pub fn to_i64(&self) -> Result<i64> {
        match *self {
            Scalar::I8(v) => Ok(v as i64),
            Scalar::I16(v) => Ok(v as i64),
            Scalar::I32(v) => Ok(v as i64),
            Scalar::I64(v) => Ok(v),
            Scalar::U8(v) => Ok(v as i64),
            Scalar::U16(v) => Ok(v as i64),
            Scalar::U32(v) => Ok(v as i64),
            _ => Err(DynVecError::TypeMismatch {
                from: self.dtype(),
                to: Dtype::I64,
            }),
        }
    }

    /// Extract as u64. Defined for unsigned integers only; signed or floating
    /// sources are a `TypeMismatch` even when the value happens to fit.
    pub fn to_u64(&self) -> Result<u64> {
        match *self {
            Scalar::U8(v) => Ok(v as u64),
            Scalar::U16(v) => Ok(v as u64),
            Scalar::U32(v) => Ok(v as u64),
            Scalar::U64(v) => Ok(v),
            _ => Err(DynVecError::TypeMismatch {
                from: self.dtype(),
                to: Dtype::U64,
            }),
        }
    }

    /// Extract as f64. Defined for floats and for integers up to 32 bits,
    /// which convert exactly. 64-bit integers are rejected rather than
    /// silently rounded.
    pub fn to_f64(&self) -> Result<f64> {
        match *self {
            Scalar::F32(v) => Ok(v as f64),
            Scalar::F64(v) => Ok(v),
            Scalar::U8(v) => Ok(v as f64),
            Scalar::I8(v) => Ok(v as f64),
            Scalar::U16(v) => Ok(v as f64),
            Scalar::I16(v) => Ok(v as f64),
            Scalar::U32(v) => Ok(v as f64),
            Scalar::I32(v) => Ok(v as f64),
            _ => Err(DynVecError::TypeMismatch {
                from: self.dtype(),
                to: Dtype::F64,
            }),
        }
    }

    /// Three-way comparison of two numeric scalars. The lower-rank operand is
    /// promoted first: integer pairs compare exactly in i128, any floating
    /// operand forces an f64 comparison. NaN has no ordering and is rejected.
    pub fn compare(&self, other: &Scalar) -> Result<Ordering> {
        for s in [self, other] {
            if !s.is_numeric() {
                return Err(DynVecError::UnsupportedDtype(s.dtype()));
            }
        }

        if self.dtype().is_float() || other.dtype().is_float() {
            let a = self.as_f64_lossy();
            let b = other.as_f64_lossy();
            a.partial_cmp(&b).ok_or_else(|| {
                DynVecError::InvalidArgument("NaN operands cannot be ordered".to_string())
            })
        } else {
            Ok(self.as_i128().cmp(&other.as_i128()))
        }
    }

    /// Encode into little-endian bytes. `out` must be exactly
    /// `dtype().size_in_bytes()` long.
    pub fn write_le(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.dtype().size_in_bytes());
        match *self {
            Scalar::Bool(v) => out.copy_from_slice(&[v as u8]),
            Scalar::U8(v) => out.copy_from_slice(&v.to_le_bytes()),
            Scalar::I8(v) => out.copy_from_slice(&v.to_le_bytes()),
            Scalar::U16(v) => out.copy_from_slice(&v.to_le_bytes()),
            Scalar::I16(v) => out.copy_from_slice(&v.to_le_bytes()),
            Scalar::U32(v) => out.copy_from_slice(&v.to_le_bytes()),
            Scalar::I32(v) => out.copy_from_slice(&v.to_le_bytes()),
            Scalar::U64(v) => out.copy_from_slice(&v.to_le_bytes()),
            Scalar::I64(v) => out.copy_from_slice(&v.to_le_bytes()),
            Scalar::F32(v) => out.copy_from_slice(&v.to_le_bytes()),
            Scalar::F64(v) => out.copy_from_slice(&v.to_le_bytes()),
        }
    }

    /// Decode from little-endian bytes. `bytes` must be exactly
    /// `dtype.size_in_bytes()` long.
    pub fn read_le(dtype: Dtype, bytes: &[u8]) -> Scalar {
        fn arr<const N: usize>(bytes: &[u8]) -> [u8; N] {
            bytes
                .try_into()
                .expect("byte slice length does not match dtype size")
        }

        match dtype {
            Dtype::Bool => Scalar::Bool(bytes[0] != 0),
            Dtype::U8 => Scalar::U8(u8::from_le_bytes(arr(bytes))),
            Dtype::I8 => Scalar::I8(i8::from_le_bytes(arr(bytes))),
            Dtype::U16 => Scalar::U16(u16::from_le_bytes(arr(bytes))),
            Dtype::I16 => Scalar::I16(i16::from_le_bytes(arr(bytes))),
            Dtype::U32 => Scalar::U32(u32::from_le_bytes(arr(bytes))),
            Dtype::I32 => Scalar::I32(i32::from_le_bytes(arr(bytes))),
            Dtype::U64 => Scalar::U64(u64::from_le_bytes(arr(bytes))),
            Dtype::I64 => Scalar::I64(i64::from_le_bytes(arr(bytes))),
            Dtype::F32 => Scalar::F32(f32::from_le_bytes(arr(bytes))),
            Dtype::F64 => Scalar::F64(f64::from_le_bytes(arr(bytes))),
        }
    }

    /// Convert to a dtype of equal or higher promotion rank. Narrowing is a
    /// `TypeMismatch`; an integer value that does not fit the (signed) target
    /// domain is a `RangeOverflow`.
    pub fn promote_to(&self, target: Dtype) -> Result<Scalar> {
        let source = self.dtype();
        if source == target {
            return Ok(*self);
        }
        if !source.is_numeric()
            || !target.is_numeric()
            || target.promotion_rank() < source.promotion_rank()
        {
            return Err(DynVecError::TypeMismatch {
                from: source,
                to: target,
            });
        }

        if target.is_float() {
            Scalar::from_f64(target, self.as_f64_lossy())
        } else {
            Scalar::from_i128(target, self.as_i128())
        }
    }

    /// Additive identity in the given dtype.
    pub fn zero(dtype: Dtype) -> Result<Scalar> {
        if dtype.is_float() {
            Scalar::from_f64(dtype, 0.0)
        } else {
            Scalar::from_i128(dtype, 0)
        }
    }

    /// Multiplicative identity in the given dtype.
    pub fn one(dtype: Dtype) -> Result<Scalar> {
        if dtype.is_float() {
            Scalar::from_f64(dtype, 1.0)
        } else {
            Scalar::from_i128(dtype, 1)
        }
    }

    /// Exact integer value of any integer scalar. Callers must have checked
    /// the tag; floats and bool panic.
    pub(crate) fn as_i128(&self) -> i128 {
        match *self {
            Scalar::U8(v) => v as i128,
            Scalar::I8(v) => v as i128,
            Scalar::U16(v) => v as i128,
            Scalar::I16(v) => v as i128,
            Scalar::U32(v) => v as i128,
            Scalar::I32(v) => v as i128,
            Scalar::U64(v) => v as i128,
            Scalar::I64(v) => v as i128,
            _ => panic!("as_i128 on a non-integer scalar"),
        }
    }

    /// Value of any numeric scalar as f64, rounding 64-bit integers.
    pub(crate) fn as_f64_lossy(&self) -> f64 {
        match *self {
            Scalar::U8(v) => v as f64,
            Scalar::I8(v) => v as f64,
            Scalar::U16(v) => v as f64,
            Scalar::I16(v) => v as f64,
            Scalar::U32(v) => v as f64,
            Scalar::I32(v) => v as f64,
            Scalar::U64(v) => v as f64,
            Scalar::I64(v) => v as f64,
            Scalar::F32(v) => v as f64,
            Scalar::F64(v) => v,
            Scalar::Bool(_) => panic!("as_f64_lossy on a bool scalar"),
        }
    }

    /// Construct an integer-dtype scalar from an exact value, checking the
    /// target domain. Float targets round.
    pub(crate) fn from_i128(dtype: Dtype, v: i128) -> Result<Scalar> {
        let overflow = || DynVecError::RangeOverflow {
            dtype,
            detail: format!("value {} does not fit", v),
        };

        match dtype {
            Dtype::U8 => Ok(Scalar::U8(u8::try_from(v).map_err(|_| overflow())?)),
            Dtype::I8 => Ok(Scalar::I8(i8::try_from(v).map_err(|_| overflow())?)),
            Dtype::U16 => Ok(Scalar::U16(u16::try_from(v).map_err(|_| overflow())?)),
            Dtype::I16 => Ok(Scalar::I16(i16::try_from(v).map_err(|_| overflow())?)),
            Dtype::U32 => Ok(Scalar::U32(u32::try_from(v).map_err(|_| overflow())?)),
            Dtype::I32 => Ok(Scalar::I32(i32::try_from(v).map_err(|_| overflow())?)),
            Dtype::U64 => Ok(Scalar::U64(u64::try_from(v).map_err(|_| overflow())?)),
            Dtype::I64 => Ok(Scalar::I64(i64::try_from(v).map_err(|_| overflow())?)),
            Dtype::F32 => Ok(Scalar::F32(v as f32)),
            Dtype::F64 => Ok(Scalar::F64(v as f64)),
            Dtype::Bool => Err(DynVecError::UnsupportedDtype(dtype)),
        }
    }

    /// Construct a float-dtype scalar.
    pub(crate) fn from_f64(dtype: Dtype, v: f64) -> Result<Scalar> {
        match dtype {
            Dtype::F32 => Ok(Scalar::F32(v as f32)),
            Dtype::F64 => Ok(Scalar::F64(v)),
            _ => Err(DynVecError::UnsupportedDtype(dtype)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_conversions() {
        assert_eq!(Scalar::from(7i32).to_i64().unwrap(), 7);
        assert_eq!(Scalar::from(7u32).to_i64().unwrap(), 7);
        assert_eq!(Scalar::from(7i32).to_f64().unwrap(), 7.0);
        assert_eq!(Scalar::from(0.5f32).to_f64().unwrap(), 0.5);
    }

    #[test]
    fn narrowing_is_rejected() {
        // float -> int has no defined widening
        assert!(matches!(
            Scalar::from(1.5f64).to_i64(),
            Err(DynVecError::TypeMismatch { .. })
        ));
        // u64 may not fit i64
        assert!(Scalar::from(1u64).to_i64().is_err());
        // signed -> unsigned is never a widening
        assert!(Scalar::from(1i32).to_u64().is_err());
        // i64 -> f64 is inexact in general
        assert!(Scalar::from(1i64).to_f64().is_err());
    }

    #[test]
    fn compare_promotes_across_tags() {
        assert_eq!(
            Scalar::from(2u8).compare(&Scalar::from(10i64)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Scalar::from(3i32).compare(&Scalar::from(3.0f64)).unwrap(),
            Ordering::Equal
        );
        assert_eq!(
            Scalar::from(-1i8).compare(&Scalar::from(0u64)).unwrap(),
            Ordering::Less
        );
        assert!(Scalar::from(true).compare(&Scalar::from(1i32)).is_err());
        assert!(
            Scalar::from(f64::NAN)
                .compare(&Scalar::from(0.0f64))
                .is_err()
        );
    }

    #[test]
    fn zero_detection() {
        assert!(Scalar::from(0i32).is_zero());
        assert!(Scalar::from(0.0f64).is_zero());
        assert!(!Scalar::from(-1i64).is_zero());
    }

    #[test]
    fn le_bytes_round_trip() {
        let values = [
            Scalar::from(-5i32),
            Scalar::from(300u16),
            Scalar::from(1.25f32),
            Scalar::from(u64::MAX),
            Scalar::from(true),
        ];
        for v in values {
            let mut buf = vec![0u8; v.dtype().size_in_bytes()];
            v.write_le(&mut buf);
            assert_eq!(Scalar::read_le(v.dtype(), &buf), v);
        }
    }

    #[test]
    fn promote_checks_domain() {
        assert_eq!(
            Scalar::from(7u32).promote_to(Dtype::I64).unwrap(),
            Scalar::from(7i64)
        );
        // u32 value above i32::MAX cannot be represented after promotion
        assert!(matches!(
            Scalar::from(4_000_000_000u32).promote_to(Dtype::I32),
            Err(DynVecError::RangeOverflow { .. })
        ));
        // narrowing direction is a type error, not a value error
        assert!(matches!(
            Scalar::from(1i64).promote_to(Dtype::I32),
            Err(DynVecError::TypeMismatch { .. })
        ));
    }
}
