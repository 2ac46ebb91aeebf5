pub mod build;
pub mod catalog;
pub mod localized;

pub use build::*;
pub use catalog::*;
pub use localized::*;
