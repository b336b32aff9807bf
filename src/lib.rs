mod wav;
pub use wav::*;
pub mod structs;
