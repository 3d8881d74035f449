//! packwatch-api: Shared data types
//!
//! Contains the release, local version and status types passed between the
//! release source, the checker state machine and the persisted state.

pub mod local;
pub mod release;
pub mod status;

pub use local::LocalVersionInfo;
pub use release::{RELEASE_KIND, ReleaseDescriptor};
pub use status::{CheckStatus, ParseStatusError};
