pub mod classification;
pub mod exclusion;
pub mod raw;
pub mod verdict;

pub use classification::*;
pub use exclusion::*;
pub use raw::*;
pub use verdict::*;
