mod fill;
mod vector;

pub use vector::Vector;
