use crate::dtype::Dtype;
use crate::error::{DynVecError, Result};

/// Requests below this size skip the system memory probe.
const MEM_PROBE_THRESHOLD_BYTES: usize = 1 << 20;

/// Plain heap-resident buffer.
pub struct HostBuffer {
    dtype: Dtype,
    bytes: Vec<u8>,
    released: bool,
}

impl HostBuffer {
    pub fn allocate(dtype: Dtype, capacity_bytes: usize) -> Result<Self> {
        // Large requests are checked against what the host actually has
        // before committing, so a hopeless allocation fails with a reportable
        // error instead of an allocator abort.
        if capacity_bytes >= MEM_PROBE_THRESHOLD_BYTES
            && let Ok(mem) = sys_info::mem_info()
            && (capacity_bytes as u64) > mem.avail.saturating_mul(1024)
        {
            return Err(DynVecError::OutOfMemory(format!(
                "host allocation of {} bytes exceeds {} KB available",
                capacity_bytes, mem.avail
            )));
        }

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(capacity_bytes).map_err(|_| {
            DynVecError::OutOfMemory(format!(
                "host allocation of {} bytes failed",
                capacity_bytes
            ))
        })?;
        bytes.resize(capacity_bytes, 0);

        Ok(Self {
            dtype,
            bytes,
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
        self.bytes = Vec::new();
        self.released = true;
    }
}
