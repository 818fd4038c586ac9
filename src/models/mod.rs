pub mod derived;
pub mod ladder;
pub mod raw_match;

pub use derived::*;
pub use ladder::*;
pub use raw_match::*;
