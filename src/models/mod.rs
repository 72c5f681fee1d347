pub mod entry;
pub mod enums;

pub use entry::*;
pub use enums::*;
