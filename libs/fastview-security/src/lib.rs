#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Composable permissions for CRUD viewgroups.
//!
//! A [`Permission`] answers two questions that must never disagree: may this
//! actor touch this record ([`Permission::check`]), and which records of a
//! collection may it see ([`Permission::filter`]).

pub mod actor;
pub mod capability;
pub mod collection;
pub mod config;
pub mod error;
pub mod memory;
pub mod permission;
pub mod prelude;
pub mod resource;
pub mod restriction;
pub mod schema;
pub mod viewgroup;

pub use actor::{Actor, ActorBuilder, Identity};
pub use capability::Capability;
pub use collection::Collection;
pub use config::{ConfigError, PermissionsConfig, ViewGroupConfig};
pub use error::ConfigurationError;
pub use memory::{Identified, MemoryCollection, Row};
pub use permission::Permission;
pub use resource::{Record, ResourceType};
pub use restriction::Restriction;
pub use schema::Schema;
pub use viewgroup::{AccessDenied, ViewGroupPermissions, ViewGroupPermissionsBuilder};
