mod greeting;
mod target;

pub use greeting::*;
pub use target::*;
