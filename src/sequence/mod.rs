pub mod core;

pub use core::{MAX_SIZE, MAX_VALUE, MIN_SIZE, MIN_VALUE, SAMPLE_LEN, generate, sample};
