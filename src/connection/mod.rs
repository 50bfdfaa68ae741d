//! Connection descriptors: turning a resolved workspace into something the
//! embedded store can open.

pub mod config;

pub use config::{ConnectionDescriptor, DEFAULT_PASSWORD, DEFAULT_USERNAME, URL_SCHEME};

use crate::cli::workspace::Workspace;

/// Descriptor for a resolved workspace. Pure; the open itself may still fail
/// inside the store.
pub fn build_descriptor(workspace: &Workspace) -> ConnectionDescriptor {
    ConnectionDescriptor::new(workspace.resolved_directory())
}
