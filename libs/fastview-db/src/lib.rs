#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `SeaORM` storage for `fastview-security`.
//!
//! Map permission fields to entity columns with a [`FieldMap`], wrap a
//! `Select` as an [`EntityCollection`], and let permissions filter it in SQL.

pub mod cond;
pub mod error;
pub mod field_map;
pub mod select;

pub use cond::build_restriction_condition;
pub use error::DbError;
pub use field_map::FieldMap;
pub use select::{EntityCollection, EntityCollectionExt};
