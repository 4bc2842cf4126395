use rand::distr::{Distribution, Uniform};
use tracing::trace;

use crate::error::{DynVecError, Result};
use crate::scalar::Scalar;
use crate::vector::Vector;

/// Elements staged host-side per bulk commit.
const FILL_CHUNK_ELEMS: usize = 4096;

impl Vector {
    /// Populate every element from a generator called with ascending indices.
    ///
    /// Generated values are promoted to the vector's dtype, staged into a
    /// host-side little-endian run and committed through the buffer's bulk
    /// write path, one chunk at a time. No raw pointer into the backing
    /// memory is ever taken, so the same loop serves every storage kind.
    pub fn fill_with<F>(&mut self, mut generator: F) -> Result<()>
    where
        F: FnMut(usize) -> Result<Scalar>,
    {
        let dtype = self.dtype();
        let esize = dtype.size_in_bytes();
        let len = self.len();
        trace!(?dtype, len, "filling vector from generator");

        let mut stage = vec![0u8; FILL_CHUNK_ELEMS.min(len) * esize];
        let mut start = 0;
        while start < len {
            let count = FILL_CHUNK_ELEMS.min(len - start);
            for local in 0..count {
                let value = generator(start + local)?.promote_to(dtype)?;
                value.write_le(&mut stage[local * esize..(local + 1) * esize]);
            }
            self.buffer_mut().write_bulk(start, &stage[..count * esize])?;
            start += count;
        }
        Ok(())
    }

    /// Set every element to the same value.
    pub fn fill(&mut self, value: Scalar) -> Result<()> {
        let value = value.promote_to(self.dtype())?;
        self.fill_with(|_| Ok(value))
    }

    /// Fill a floating-point vector with uniform samples from `[min, max)`.
    pub fn fill_uniform(&mut self, min: f64, max: f64) -> Result<()> {
        let dtype = self.dtype();
        if !dtype.is_float() {
            return Err(DynVecError::InvalidArgument(format!(
                "uniform fill requires a float dtype, got {:?}",
                dtype
            )));
        }

        let dist = Uniform::new(min, max).map_err(|e| {
            DynVecError::InvalidArgument(format!("bad uniform bounds [{}, {}): {}", min, max, e))
        })?;
        let mut rng = rand::rng();
        self.fill_with(|_| Scalar::from_f64(dtype, dist.sample(&mut rng)))
    }
}
