//! dynvec - dynamically-typed numeric vectors across memory domains
//!
//! This library provides a vector container whose element type is a runtime
//! property and whose backing memory lives in a caller-chosen storage domain
//! (host RAM, device memory, or host-visible managed memory), with range
//! generation and fill operations that work identically across all of them.

mod dtype;

mod error;

mod ops;

mod scalar;

mod storage;

mod vector;

pub use dtype::{Dtype, Element};
pub use error::{DynVecError, Result};
pub use ops::{arange, arange_span, arange_step};
pub use scalar::Scalar;
pub use storage::{Buffer, DeviceBuffer, HostBuffer, ManagedBuffer, MemoryTracker, StorageKind};
pub use vector::Vector;
