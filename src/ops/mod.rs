mod arange;

pub use arange::{arange, arange_span, arange_step};
