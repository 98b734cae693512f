pub mod evaluate;
pub mod intrinsic;
pub mod ratios;

pub use evaluate::{evaluate, instruction, viability};
