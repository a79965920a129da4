//! Scopeseal core: scope model and subset-check engine
//!
//! This crate holds the pure half of scopeseal: immutable scope value types,
//! the four scope builders, and the hierarchical subset-check algorithm that
//! decides whether a requested scope is covered by a granted scope.
//!
//! Nothing here performs I/O or cryptography; signing and wire encoding live
//! in `scopeseal-token`.
//!
//! ## Core Components
//!
//! - **Scope Model**: [`Selector`], [`Grant`] and [`Scope`] value types,
//!   combined with `+` or [`Scope::combine`]
//! - **Subset-Check Engine**: [`is_authorized`]
//! - **Resolver Seam**: the [`Resource`] trait, by which host applications
//!   map their own instance types to canonical selector triples

pub mod authorize;
pub mod resolver;
pub mod scope;

pub use authorize::is_authorized;
pub use resolver::{Resource, ResourceRef};
pub use scope::{Grant, Scope, Selector};
