//! # curator-sync
//!
//! Release enumeration, bundle planning and the hash-gated bundle writer.
//!
//! Call [`plan`] to turn a [`curator_core::Config`] into [`PackagePlan`]s, then
//! [`write_package`] (or [`writer::write_all`]) to materialize them on disk.

pub mod cache;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod writer;

#[cfg(test)]
mod testing;

pub use cache::ReleaseCache;
pub use error::SyncError;
pub use pipeline::{plan, plan_package, PackagePlan, PlanScope, ReleasePlan, SourceSection};
pub use provider::{GitHubProvider, MirrorProvider, ReleaseProvider};
pub use writer::{write_package, BundleResult, WriteResult};
