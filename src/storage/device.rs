use crate::dtype::Dtype;
use crate::error::Result;
use crate::storage::memory_tracker::MemoryTracker;

/// Total simulated accelerator memory. Everything allocated as `Device` or
/// `Managed` storage is accounted against this budget.
const DEVICE_MEMORY_BYTES: u64 = 1 << 30;

static DEVICE_TRACKER: MemoryTracker = MemoryTracker::new(DEVICE_MEMORY_BYTES);

pub(super) fn device_tracker() -> &'static MemoryTracker {
    &DEVICE_TRACKER
}

/// Device-resident buffer.
///
/// The backing bytes model accelerator memory: they are private to this
/// module and only move through `copy_into`/`copy_out`. Nothing outside the
/// storage layer can obtain a live reference into them, so every caller has
/// to go through the write/read contract, exactly as it would with memory
/// that is not host-addressable.
pub struct DeviceBuffer {
    dtype: Dtype,
    bytes: Vec<u8>,
    released: bool,
}

impl DeviceBuffer {
    pub fn allocate(dtype: Dtype, capacity_bytes: usize) -> Result<Self> {
        DEVICE_TRACKER.allocate(capacity_bytes as u64)?;
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

    /// Copy host bytes into device memory.
    pub fn copy_into(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Copy device bytes out to the host.
    pub fn copy_out(&self, offset: usize, len: usize) -> Vec<u8> {
        self.bytes[offset..offset + len].to_vec()
    }

    pub fn release(&mut self) {
        DEVICE_TRACKER.deallocate(self.bytes.len() as u64);
        self.bytes = Vec::new();
        self.released = true;
    }
}
