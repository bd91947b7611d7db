//! Series alignment and resampling

pub mod align;
pub mod resample;

pub use align::align_benchmark;
pub use resample::resample_hours;
