//! Domain building blocks shared by every restyle crate.
//!
//! Nothing in here performs I/O: identifiers, errors, the fixed style
//! prompt, deterministic storage paths, and the preview resizer.

pub mod error;
pub mod paths;
pub mod preview;
pub mod prompt;
pub mod types;
