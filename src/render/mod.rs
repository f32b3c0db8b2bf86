pub mod core;

pub use core::{BarRenderer, Frame, Size};
