//! Extraction backends that talk to the video platform

pub mod extractor;
pub mod ytdlp;

pub use extractor::*;
pub use ytdlp::*;
