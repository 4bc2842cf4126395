use crate::dtype::{Dtype, Element};
use crate::error::{DynVecError, Result};
use crate::scalar::Scalar;
use crate::storage::{Buffer, StorageKind};

/// A dynamically-typed numeric vector backed by exactly one buffer in a
/// caller-chosen memory domain.
///
/// The storage kind is fixed at creation; a cross-domain copy creates a new
/// vector. All element traffic goes through the buffer's write/read contract,
/// so the same code path works whether or not the backing memory is
/// host-addressable.
///
/// Capacity policy: growth reallocates to at least double the previous
/// capacity; shrinking only moves the length and never releases memory.
pub struct Vector {
    len: usize,
    buffer: Buffer,
}

impl Vector {
    /// Allocate a zero-initialized vector of `count` elements.
    pub fn new(kind: StorageKind, dtype: Dtype, count: usize) -> Result<Self> {
        Ok(Self {
            len: count,
            buffer: Buffer::allocate(kind, dtype, count)?,
        })
    }

    /// Allocate an empty vector with room for `capacity` elements.
    pub fn with_capacity(kind: StorageKind, dtype: Dtype, capacity: usize) -> Result<Self> {
        Ok(Self {
            len: 0,
            buffer: Buffer::allocate(kind, dtype, capacity)?,
        })
    }

    /// An empty vector with no reserved capacity. Still carries its requested
    /// storage kind and dtype.
    pub fn empty(kind: StorageKind, dtype: Dtype) -> Result<Self> {
        Self::with_capacity(kind, dtype, 0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn dtype(&self) -> Dtype {
        self.buffer.dtype()
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.buffer.storage_kind()
    }

    /// Elements the current buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(DynVecError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Read one element back out, whatever domain it lives in.
    pub fn get(&self, index: usize) -> Result<Scalar> {
        self.check_index(index)?;
        self.buffer.read(index)
    }

    /// Store one element. The value is promoted to the vector's dtype;
    /// narrowing is a `TypeMismatch`.
    pub fn set(&mut self, index: usize, value: Scalar) -> Result<()> {
        self.check_index(index)?;
        let value = value.promote_to(self.dtype())?;
        self.buffer.write(index, value)
    }

    /// Append one element, growing the buffer if needed.
    pub fn push(&mut self, value: Scalar) -> Result<()> {
        let index = self.len;
        self.resize(index + 1)?;
        self.set(index, value)
    }

    /// Change the length. Growth zero-fills the new elements and reallocates
    /// with at-least-doubled capacity when the buffer is full; shrinking only
    /// moves the length.
    pub fn resize(&mut self, new_len: usize) -> Result<()> {
        if new_len <= self.len {
            self.len = new_len;
            return Ok(());
        }

        let esize = self.dtype().size_in_bytes();
        if new_len > self.capacity() {
            let target = new_len.max(self.capacity().saturating_mul(2));
            let mut grown = Buffer::allocate(self.storage_kind(), self.dtype(), target)?;
            if self.len > 0 {
                let live = self.buffer.read_bulk(0, self.len)?;
                grown.write_bulk(0, &live)?;
            }
            // replacing drops, and thereby releases, the old buffer
            self.buffer = grown;
        } else if self.len < new_len {
            let zeros = vec![0u8; (new_len - self.len) * esize];
            self.buffer.write_bulk(self.len, &zeros)?;
        }

        self.len = new_len;
        Ok(())
    }

    /// Copy every element out as scalars.
    pub fn to_scalars(&self) -> Result<Vec<Scalar>> {
        let dtype = self.dtype();
        let esize = dtype.size_in_bytes();
        let bytes = self.buffer.read_bulk(0, self.len)?;
        Ok(bytes
            .chunks_exact(esize)
            .map(|chunk| Scalar::read_le(dtype, chunk))
            .collect())
    }

    /// Copy every element out as its native type. The requested type must be
    /// the vector's exact dtype.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype() {
            return Err(DynVecError::TypeMismatch {
                from: self.dtype(),
                to: T::DTYPE,
            });
        }
        self.to_scalars()?
            .into_iter()
            .map(T::from_scalar)
            .collect()
    }

    /// Copy this vector into another memory domain. The original is left
    /// untouched; the result is a fresh allocation.
    pub fn to_storage(&self, kind: StorageKind) -> Result<Vector> {
        let mut out = Vector::new(kind, self.dtype(), self.len)?;
        if self.len > 0 {
            let bytes = self.buffer.read_bulk(0, self.len)?;
            out.buffer.write_bulk(0, &bytes)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_round_trip() {
        let mut v = Vector::new(StorageKind::Host, Dtype::I32, 3).unwrap();
        v.set(0, Scalar::from(5i32)).unwrap();
        v.set(2, Scalar::from(-9i32)).unwrap();
        assert_eq!(v.get(0).unwrap(), Scalar::from(5i32));
        assert_eq!(v.get(1).unwrap(), Scalar::from(0i32));
        assert_eq!(v.get(2).unwrap(), Scalar::from(-9i32));
        assert!(matches!(
            v.get(3),
            Err(DynVecError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn set_promotes_but_never_narrows() {
        let mut v = Vector::new(StorageKind::Host, Dtype::I64, 1).unwrap();
        v.set(0, Scalar::from(7u16)).unwrap();
        assert_eq!(v.get(0).unwrap(), Scalar::from(7i64));

        let mut w = Vector::new(StorageKind::Host, Dtype::I16, 1).unwrap();
        assert!(matches!(
            w.set(0, Scalar::from(1i64)),
            Err(DynVecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn growth_doubles_shrink_keeps_capacity() {
        let mut v = Vector::with_capacity(StorageKind::Host, Dtype::U8, 4).unwrap();
        v.resize(4).unwrap();
        assert_eq!(v.capacity(), 4);

        v.set(3, Scalar::from(9u8)).unwrap();
        v.resize(5).unwrap();
        assert!(v.capacity() >= 8);
        assert_eq!(v.get(3).unwrap(), Scalar::from(9u8));
        assert_eq!(v.get(4).unwrap(), Scalar::from(0u8));

        let cap = v.capacity();
        v.resize(1).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v.capacity(), cap);
    }

    #[test]
    fn growth_zero_fills_reused_capacity() {
        let mut v = Vector::with_capacity(StorageKind::Host, Dtype::U8, 8).unwrap();
        v.resize(4).unwrap();
        for i in 0..4 {
            v.set(i, Scalar::from(0xFFu8)).unwrap();
        }
        v.resize(2).unwrap();
        v.resize(6).unwrap();
        // elements beyond the shrunken length read as zero again
        for i in 2..6 {
            assert_eq!(v.get(i).unwrap(), Scalar::from(0u8));
        }
    }

    #[test]
    fn push_appends() {
        let mut v = Vector::empty(StorageKind::Host, Dtype::F64).unwrap();
        for i in 0..10 {
            v.push(Scalar::from(i as f64)).unwrap();
        }
        assert_eq!(v.len(), 10);
        assert_eq!(v.to_vec::<f64>().unwrap(), (0..10).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn typed_readback_checks_dtype() {
        let v = Vector::new(StorageKind::Host, Dtype::I32, 2).unwrap();
        assert!(v.to_vec::<i64>().is_err());
        assert_eq!(v.to_vec::<i32>().unwrap(), vec![0, 0]);
    }

    #[test]
    fn cross_storage_copy_preserves_contents() {
        let mut v = Vector::new(StorageKind::Host, Dtype::I16, 4).unwrap();
        for i in 0..4 {
            v.set(i, Scalar::from(i as i16 * 3)).unwrap();
        }

        let on_device = v.to_storage(StorageKind::Device).unwrap();
        assert_eq!(on_device.storage_kind(), StorageKind::Device);
        assert_eq!(on_device.dtype(), Dtype::I16);
        assert_eq!(on_device.to_scalars().unwrap(), v.to_scalars().unwrap());

        let back = on_device.to_storage(StorageKind::Host).unwrap();
        assert_eq!(back.to_vec::<i16>().unwrap(), vec![0, 3, 6, 9]);
    }
}
