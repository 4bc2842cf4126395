use crate::dtype::Dtype;
use crate::error::Result;
use crate::storage::device::device_tracker;

/// Host-visible, device-tracked buffer (pinned/mapped memory analogue).
///
/// The bytes live in host RAM, but the allocation counts against the device
/// budget because the device maps it.
pub struct ManagedBuffer {
    dtype: Dtype,
    bytes: Vec<u8>,
    released: bool,
}

impl ManagedBuffer {
    pub fn allocate(dtype: Dtype, capacity_bytes: usize) -> Result<Self> {
        device_tracker().allocate(capacity_bytes as u64)?;
        Ok(Self {
            dtype,
            bytes: vec![0; capacity_bytes],
            released: false,
        })
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn capacity_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn write_bytes(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> Vec<u8> {
        self.bytes[offset..offset + len].to_vec()
    }

    pub fn release(&mut self) {
        device_tracker().deallocate(self.bytes.len() as u64);
        self.bytes = Vec::new();
        self.released = true;
    }
}
