use thiserror::Error;

use crate::dtype::Dtype;
use crate::storage::StorageKind;

pub type Result<T> = std::result::Result<T, DynVecError>;

#[derive(Error, Debug)]
pub enum DynVecError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Type mismatch: cannot convert {from:?} to {to:?}")]
    TypeMismatch { from: Dtype, to: Dtype },

    #[error("Unsupported dtype: {0:?} is not numeric")]
    UnsupportedDtype(Dtype),

    #[error("Unsupported storage: {0:?} is not available in this configuration")]
    UnsupportedStorage(StorageKind),

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Range overflow in {dtype:?}: {detail}")]
    RangeOverflow { dtype: Dtype, detail: String },

    #[error("Buffer released twice")]
    DoubleFree,

    #[error("Index {index} out of bounds for vector of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}
