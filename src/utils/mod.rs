//! Utility functions for tubefetch

pub mod filename;
pub mod mime;
pub mod url;

pub use self::filename::*;
pub use self::mime::*;
pub use self::url::*;
