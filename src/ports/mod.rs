//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the guard and an external
//! system (issue tracker, filesystem, log sink, IDs).
//! Implementations live in `src/adapters/`.

pub mod filesystem;
pub mod id_gen;
pub mod issues;
pub mod logger;

pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use issues::{FetchedIssues, IssueTrackerClient};
pub use logger::Logger;
