//! Live adapters for real external interactions.

pub mod filesystem;
pub mod gitlab;
pub mod id_gen;
pub mod logger;

pub use filesystem::LiveFileSystem;
pub use gitlab::GitlabIssuesClient;
pub use id_gen::LiveIdGenerator;
pub use logger::TracingLogger;
