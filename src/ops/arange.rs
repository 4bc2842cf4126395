use tracing::debug;

use crate::dtype::Dtype;
use crate::error::{DynVecError, Result};
use crate::scalar::Scalar;
use crate::storage::StorageKind;
use crate::vector::Vector;

/// Construct a vector of the range `[0, n)` with increment 1, in `n`'s dtype.
pub fn arange(kind: StorageKind, n: Scalar) -> Result<Vector> {
    check_numeric(&[n])?;
    let start = Scalar::zero(n.dtype())?;
    let inc = Scalar::one(n.dtype())?;
    arange_step(kind, start, n, inc)
}

/// Construct a vector of the range `[start, end)` with increment 1, taken in
/// `start`'s dtype.
pub fn arange_span(kind: StorageKind, start: Scalar, end: Scalar) -> Result<Vector> {
    check_numeric(&[start, end])?;
    let inc = Scalar::one(start.dtype())?;
    arange_step(kind, start, end, inc)
}

/// Construct a vector of the range from `start` towards `end` by `inc`.
///
/// The element dtype is the highest-promotion-rank dtype among the three
/// operands, and the walk is carried out in that dtype's arithmetic domain.
/// A range whose direction disagrees with the sign of `inc` is empty, not an
/// error; a zero increment is rejected. Integer ranges whose first or last
/// element falls outside the inferred dtype's domain fail with
/// `RangeOverflow` before anything is allocated.
pub fn arange_step(kind: StorageKind, start: Scalar, end: Scalar, inc: Scalar) -> Result<Vector> {
    check_numeric(&[start, end, inc])?;
    if inc.is_zero() {
        return Err(DynVecError::InvalidArgument(
            "arange increment must be non-zero".to_string(),
        ));
    }

    let dtype = Dtype::infer(&[start, end, inc])?;
    if dtype.is_float() {
        arange_float(kind, dtype, start, end, inc)
    } else {
        arange_integer(kind, dtype, start, end, inc)
    }
}

fn check_numeric(scalars: &[Scalar]) -> Result<()> {
    for s in scalars {
        if !s.is_numeric() {
            return Err(DynVecError::InvalidArgument(format!(
                "arange requires numeric scalars, got {:?}",
                s.dtype()
            )));
        }
    }
    Ok(())
}

/// Exact integer walk: `start + i * inc` computed in i128, with the domain of
/// the inferred dtype checked up front. The generated values are monotone
/// between the first and last element, so checking those two suffices.
fn arange_integer(
    kind: StorageKind,
    dtype: Dtype,
    start: Scalar,
    end: Scalar,
    inc: Scalar,
) -> Result<Vector> {
    let s = start.as_i128();
    let e = end.as_i128();
    let i = inc.as_i128();

    let count = if i > 0 && e > s {
        ((e - s) as u128).div_ceil(i as u128)
    } else if i < 0 && s > e {
        ((s - e) as u128).div_ceil(i.unsigned_abs())
    } else {
        0
    };
    let count = usize::try_from(count).map_err(|_| {
        DynVecError::OutOfMemory(format!("range would produce {} elements", count))
    })?;

    if count > 0 {
        let last = s + (count as i128 - 1) * i;
        let (lo, hi) = dtype
            .integer_bounds()
            .ok_or(DynVecError::UnsupportedDtype(dtype))?;
        for value in [s, last] {
            if value < lo || value > hi {
                return Err(DynVecError::RangeOverflow {
                    dtype,
                    detail: format!("element {} exceeds the representable range", value),
                });
            }
        }
    }

    debug!(?kind, ?dtype, count, "arange (integer)");
    let mut out = Vector::new(kind, dtype, count)?;
    out.fill_with(|idx| Scalar::from_i128(dtype, s + idx as i128 * i))?;
    Ok(out)
}

/// Floating-point walk. The element count comes from the f64 division, but
/// values accumulate by repeated addition, matching conventional range
/// generators at the cost of rounding drift near the boundary.
fn arange_float(
    kind: StorageKind,
    dtype: Dtype,
    start: Scalar,
    end: Scalar,
    inc: Scalar,
) -> Result<Vector> {
    let s = start.as_f64_lossy();
    let e = end.as_f64_lossy();
    let i = inc.as_f64_lossy();
    for v in [s, e, i] {
        if !v.is_finite() {
            return Err(DynVecError::InvalidArgument(
                "arange bounds and increment must be finite".to_string(),
            ));
        }
    }

    let raw_count = if i > 0.0 && e > s {
        ((e - s) / i).ceil()
    } else if i < 0.0 && s > e {
        ((s - e) / -i).ceil()
    } else {
        0.0
    };
    if raw_count > usize::MAX as f64 {
        return Err(DynVecError::OutOfMemory(format!(
            "range would produce {} elements",
            raw_count
        )));
    }
    let count = raw_count as usize;

    debug!(?kind, ?dtype, count, "arange (float)");
    let mut out = Vector::new(kind, dtype, count)?;
    let mut acc = s;
    out.fill_with(|_| {
        let value = Scalar::from_f64(dtype, acc);
        acc += i;
        value
    })?;
    Ok(out)
}
