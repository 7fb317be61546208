//! Shared gitall data models consumed by the core library, the credential
//! crates and the presentation layer.

pub mod outcome;
pub mod tips;
pub mod worktree;

pub use outcome::*;
pub use tips::*;
pub use worktree::*;
