//! Everything a view layer needs to declare and enforce permissions.
pub use crate::actor::{Actor, Identity};
pub use crate::collection::Collection;
pub use crate::permission::Permission;
pub use crate::resource::{Record, ResourceType};
pub use crate::schema::Schema;
pub use crate::viewgroup::{AccessDenied, ViewGroupPermissions};
