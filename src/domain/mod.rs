pub mod source;
pub mod status;

pub use source::*;
pub use status::*;
