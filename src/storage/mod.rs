mod device;
mod host;
mod managed;
mod memory_tracker;

pub use device::DeviceBuffer;
pub use host::HostBuffer;
pub use managed::ManagedBuffer;
pub use memory_tracker::MemoryTracker;

use tracing::debug;

use crate::dtype::Dtype;
use crate::error::{DynVecError, Result};
use crate::scalar::Scalar;

/// Environment switch that hides the simulated device, for exercising
/// storage-unavailable paths.
const DISABLE_DEVICE_ENV: &str = "DYNVEC_DISABLE_DEVICE";

/// Identifier of the physical memory domain a buffer resides in.
/// Always chosen by the caller, never inferred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Host,
    Device,
    Managed,
}

impl StorageKind {
    pub fn is_available(self) -> bool {
        match self {
            StorageKind::Host => true,
            StorageKind::Device | StorageKind::Managed => {
                std::env::var_os(DISABLE_DEVICE_ENV).is_none()
            }
        }
    }
}

/// Backing memory for one vector, dispatched over the storage kinds.
///
/// Offsets are in elements; the buffer owns its dtype so the byte arithmetic
/// lives here. All reads are copy-out: non-host bytes are never handed out as
/// a live slice.
pub enum Buffer {
    Host(HostBuffer),
    Device(DeviceBuffer),
    Managed(ManagedBuffer),
}

impl Buffer {
    pub fn allocate(kind: StorageKind, dtype: Dtype, count: usize) -> Result<Buffer> {
        if !kind.is_available() {
            return Err(DynVecError::UnsupportedStorage(kind));
        }

        let capacity_bytes = count
            .checked_mul(dtype.size_in_bytes())
            .ok_or_else(|| {
                DynVecError::OutOfMemory(format!("{} elements of {:?} overflow usize", count, dtype))
            })?;

        debug!(?kind, ?dtype, count, capacity_bytes, "allocating buffer");

        match kind {
            StorageKind::Host => Ok(Buffer::Host(HostBuffer::allocate(dtype, capacity_bytes)?)),
            StorageKind::Device => Ok(Buffer::Device(DeviceBuffer::allocate(
                dtype,
                capacity_bytes,
            )?)),
            StorageKind::Managed => Ok(Buffer::Managed(ManagedBuffer::allocate(
                dtype,
                capacity_bytes,
            )?)),
        }
    }

    pub fn storage_kind(&self) -> StorageKind {
        match self {
            Buffer::Host(_) => StorageKind::Host,
            Buffer::Device(_) => StorageKind::Device,
            Buffer::Managed(_) => StorageKind::Managed,
        }
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            Buffer::Host(b) => b.dtype(),
            Buffer::Device(b) => b.dtype(),
            Buffer::Managed(b) => b.dtype(),
        }
    }

    pub fn capacity_bytes(&self) -> usize {
        match self {
            Buffer::Host(b) => b.capacity_bytes(),
            Buffer::Device(b) => b.capacity_bytes(),
            Buffer::Managed(b) => b.capacity_bytes(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity_bytes() / self.dtype().size_in_bytes()
    }

    fn is_released(&self) -> bool {
        match self {
            Buffer::Host(b) => b.is_released(),
            Buffer::Device(b) => b.is_released(),
            Buffer::Managed(b) => b.is_released(),
        }
    }

    fn byte_range(&self, offset: usize, count: usize) -> Result<usize> {
        if self.is_released() {
            return Err(DynVecError::InvalidArgument(
                "buffer has been released".to_string(),
            ));
        }
        let esize = self.dtype().size_in_bytes();
        let end = offset
            .checked_add(count)
            .and_then(|e| e.checked_mul(esize))
            .ok_or_else(|| {
                DynVecError::InvalidArgument("buffer range overflows usize".to_string())
            })?;
        if end > self.capacity_bytes() {
            return Err(DynVecError::InvalidArgument(format!(
                "range of {} elements at offset {} exceeds capacity of {} elements",
                count,
                offset,
                self.capacity()
            )));
        }
        Ok(offset * esize)
    }

    /// Write a single element. The scalar's tag must equal the buffer dtype.
    pub fn write(&mut self, offset: usize, value: Scalar) -> Result<()> {
        if value.dtype() != self.dtype() {
            return Err(DynVecError::TypeMismatch {
                from: value.dtype(),
                to: self.dtype(),
            });
        }
        let esize = self.dtype().size_in_bytes();
        let mut encoded = [0u8; 8];
        value.write_le(&mut encoded[..esize]);
        self.write_bulk_at(offset, 1, &encoded[..esize])
    }

    /// Write a contiguous little-endian run of whole elements.
    pub fn write_bulk(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let esize = self.dtype().size_in_bytes();
        if data.len() % esize != 0 {
            return Err(DynVecError::InvalidArgument(format!(
                "bulk write of {} bytes is not a whole number of {:?} elements",
                data.len(),
                self.dtype()
            )));
        }
        self.write_bulk_at(offset, data.len() / esize, data)
    }

    fn write_bulk_at(&mut self, offset: usize, count: usize, data: &[u8]) -> Result<()> {
        let byte_offset = self.byte_range(offset, count)?;
        match self {
            Buffer::Host(b) => b.write_bytes(byte_offset, data),
            Buffer::Device(b) => b.copy_into(byte_offset, data),
            Buffer::Managed(b) => b.write_bytes(byte_offset, data),
        }
        Ok(())
    }

    /// Read a single element back out.
    pub fn read(&self, offset: usize) -> Result<Scalar> {
        let bytes = self.read_bulk(offset, 1)?;
        Ok(Scalar::read_le(self.dtype(), &bytes))
    }

    /// Read a contiguous run of elements as little-endian bytes.
    pub fn read_bulk(&self, offset: usize, count: usize) -> Result<Vec<u8>> {
        let byte_offset = self.byte_range(offset, count)?;
        let len = count * self.dtype().size_in_bytes();
        Ok(match self {
            Buffer::Host(b) => b.read_bytes(byte_offset, len),
            Buffer::Device(b) => b.copy_out(byte_offset, len),
            Buffer::Managed(b) => b.read_bytes(byte_offset, len),
        })
    }

    /// Release the backing memory. Releasing twice is a programming error,
    /// reported in debug builds and ignored in release builds.
    pub fn release(&mut self) -> Result<()> {
        if self.is_released() {
            if cfg!(debug_assertions) {
                return Err(DynVecError::DoubleFree);
            }
            return Ok(());
        }

        debug!(kind = ?self.storage_kind(), bytes = self.capacity_bytes(), "releasing buffer");
        match self {
            Buffer::Host(b) => b.release(),
            Buffer::Device(b) => b.release(),
            Buffer::Managed(b) => b.release(),
        }
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if !self.is_released() {
            let _ = self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_round_trip_per_kind() {
        for kind in [StorageKind::Host, StorageKind::Device, StorageKind::Managed] {
            let mut buf = Buffer::allocate(kind, Dtype::I32, 4).unwrap();
            buf.write(0, Scalar::from(-7i32)).unwrap();
            buf.write(3, Scalar::from(42i32)).unwrap();
            assert_eq!(buf.read(0).unwrap(), Scalar::from(-7i32));
            assert_eq!(buf.read(3).unwrap(), Scalar::from(42i32));
            // untouched elements are zeroed at allocation
            assert_eq!(buf.read(1).unwrap(), Scalar::from(0i32));
        }
    }

    #[test]
    fn write_checks_dtype_and_bounds() {
        let mut buf = Buffer::allocate(StorageKind::Host, Dtype::I32, 2).unwrap();
        assert!(matches!(
            buf.write(0, Scalar::from(1i64)),
            Err(DynVecError::TypeMismatch { .. })
        ));
        assert!(buf.write(2, Scalar::from(1i32)).is_err());
        assert!(buf.read(2).is_err());
    }

    #[test]
    fn bulk_write_requires_whole_elements() {
        let mut buf = Buffer::allocate(StorageKind::Host, Dtype::U16, 4).unwrap();
        assert!(buf.write_bulk(0, &[1, 0, 2]).is_err());
        buf.write_bulk(1, &[1, 0, 2, 0]).unwrap();
        assert_eq!(buf.read(1).unwrap(), Scalar::from(1u16));
        assert_eq!(buf.read(2).unwrap(), Scalar::from(2u16));
    }

    #[test]
    fn double_release_is_reported_in_debug() {
        let mut buf = Buffer::allocate(StorageKind::Host, Dtype::U8, 8).unwrap();
        buf.release().unwrap();
        if cfg!(debug_assertions) {
            assert!(matches!(buf.release(), Err(DynVecError::DoubleFree)));
        } else {
            assert!(buf.release().is_ok());
        }
        assert!(buf.read(0).is_err());
    }

    #[test]
    fn device_release_returns_budget() {
        let mut buf = Buffer::allocate(StorageKind::Device, Dtype::F64, 128).unwrap();
        buf.release().unwrap();
        // a second buffer of the same size must be admissible again
        let buf2 = Buffer::allocate(StorageKind::Device, Dtype::F64, 128).unwrap();
        drop(buf2);
    }
}
