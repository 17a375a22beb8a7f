//! # states-state — State Descriptors
//!
//! A state is a named bundle of method implementations. This crate holds
//! the per-state method table and the rules deciding whether a caller may
//! reach a given method:
//!
//! - **Visibility** ([`visibility`]): `Public`, `Protected` and `Private`
//!   methods, and the [`Scope`] a call arrives with.
//! - **Methods** ([`method`]): descriptors, instance and static bodies, and
//!   [`BoundMethod`], an implementation bound to one proxy identity.
//! - **Descriptors** ([`descriptor`]): [`StateDescriptor`], whose method
//!   table is fixed once built.
//!
//! ## Design
//!
//! The crate is generic over the instance method signature `M`. The proxy
//! crate fixes `M` to a closure taking its binding type, which keeps this
//! crate free of any proxy knowledge while the method table stays a plain
//! `HashMap<MethodName, Arc<M>>`.

pub mod descriptor;
pub mod method;
pub mod visibility;

pub use descriptor::{Access, StateBuilder, StateDescriptor};
pub use method::{BoundMethod, MethodBody, MethodDescriptor, StaticFn};
pub use visibility::{CallerContext, Scope, Visibility};
