use crate::error::{DynVecError, Result};
use crate::scalar::Scalar;

/// Supported element types.
///
/// The set is fixed at compile time; there is no runtime registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dtype {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl Dtype {
    /// Size of one element, in bytes.
    pub fn size_in_bytes(self) -> usize {
        match self {
            Dtype::Bool | Dtype::U8 | Dtype::I8 => 1,
            Dtype::U16 | Dtype::I16 => 2,
            Dtype::U32 | Dtype::I32 | Dtype::F32 => 4,
            Dtype::U64 | Dtype::I64 | Dtype::F64 => 8,
        }
    }

    /// Required alignment of one element. Matches size for all supported types.
    pub fn alignment(self) -> usize {
        self.size_in_bytes()
    }

    /// Position in the promotion order: unsigned < signed at equal width,
    /// narrower < wider within a class, floating above all integers.
    pub fn promotion_rank(self) -> u8 {
        match self {
            Dtype::Bool => 0,
            Dtype::U8 => 1,
            Dtype::I8 => 2,
            Dtype::U16 => 3,
            Dtype::I16 => 4,
            Dtype::U32 => 5,
            Dtype::I32 => 6,
            Dtype::U64 => 7,
            Dtype::I64 => 8,
            Dtype::F32 => 9,
            Dtype::F64 => 10,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Dtype::U8
                | Dtype::I8
                | Dtype::U16
                | Dtype::I16
                | Dtype::U32
                | Dtype::I32
                | Dtype::U64
                | Dtype::I64
        )
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Dtype::I8 | Dtype::I16 | Dtype::I32 | Dtype::I64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Dtype::F32 | Dtype::F64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Representable domain of an integer dtype.
    pub(crate) fn integer_bounds(self) -> Option<(i128, i128)> {
        match self {
            Dtype::U8 => Some((0, u8::MAX as i128)),
            Dtype::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Dtype::U16 => Some((0, u16::MAX as i128)),
            Dtype::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Dtype::U32 => Some((0, u32::MAX as i128)),
            Dtype::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Dtype::U64 => Some((0, u64::MAX as i128)),
            Dtype::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
            _ => None,
        }
    }

    /// Result dtype for an operation over the given scalars: the dtype of
    /// highest promotion rank among them. All inputs must be numeric.
    pub fn infer(scalars: &[Scalar]) -> Result<Dtype> {
        let mut best: Option<Dtype> = None;
        for s in scalars {
            let dt = s.dtype();
            if !dt.is_numeric() {
                return Err(DynVecError::UnsupportedDtype(dt));
            }
            best = Some(match best {
                Some(b) if b.promotion_rank() >= dt.promotion_rank() => b,
                _ => dt,
            });
        }
        best.ok_or_else(|| {
            DynVecError::InvalidArgument("cannot infer a dtype from no operands".to_string())
        })
    }
}

/// Marker trait bridging native primitives to their runtime tag.
pub trait Element: Copy {
    const DTYPE: Dtype;

    fn to_scalar(self) -> Scalar;
    fn from_scalar(s: Scalar) -> Result<Self>;
}

macro_rules! impl_element {
    ($t:ty, $dtype:expr, $variant:ident) => {
        impl Element for $t {
            const DTYPE: Dtype = $dtype;

            fn to_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(s: Scalar) -> Result<Self> {
                match s {
                    Scalar::$variant(v) => Ok(v),
                    other => Err(DynVecError::TypeMismatch {
                        from: other.dtype(),
                        to: Self::DTYPE,
                    }),
                }
            }
        }
    };
}

impl_element!(u8, Dtype::U8, U8);
impl_element!(i8, Dtype::I8, I8);
impl_element!(u16, Dtype::U16, U16);
impl_element!(i16, Dtype::I16, I16);
impl_element!(u32, Dtype::U32, U32);
impl_element!(i32, Dtype::I32, I32);
impl_element!(u64, Dtype::U64, U64);
impl_element!(i64, Dtype::I64, I64);
impl_element!(f32, Dtype::F32, F32);
impl_element!(f64, Dtype::F64, F64);
impl_element!(bool, Dtype::Bool, Bool);
