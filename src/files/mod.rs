//! Static file serving
//!
//! Turns a parsed request into a response: virtual-host selection, path
//! resolution with containment, and reading the file.

pub mod resolver;
pub mod responder;

pub use responder::StaticFiles;
