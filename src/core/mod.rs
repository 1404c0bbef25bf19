//! Core functionality for tubefetch

pub mod format;
pub mod pipeline;
pub mod resolver;
pub mod source;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use format::*;
pub use pipeline::*;
pub use resolver::*;
pub use source::*;
pub use workspace::*;
