pub mod enums;
pub mod patient;

pub use enums::*;
pub use patient::*;
