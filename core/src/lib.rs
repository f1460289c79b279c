//! Core data model for the Ripple reconciler.
//!
//! This crate holds everything a descriptor producer needs without pulling in the
//! reconciliation engine itself:
//!
//! - [`VNode`] descriptors with their closed [`Kind`] and [`Children`] sum types,
//! - [`Props`] / [`PropValue`] attribute maps, [`Key`]s and [`Ref`]s,
//! - [`clone_vnode`], the prop-merging clone used by higher-order components,
//! - the [`Component`] contract plus the [`Updater`] handle that feeds the shared
//!   [`UpdateQueue`],
//! - the [`Host`] trait implemented by display-tree backends.
//!
//! # Example
//!
//! ```rust
//! use ripple_core::{Props, clone_vnode, element};
//!
//! let original = element("div").class_name("test").text("hello").build();
//! let cleared = clone_vnode(&original, Some(&Props::new().with("className", ())), vec![]);
//! assert!(cleared.props().get("className").is_none());
//! ```

extern crate alloc;

pub mod clone;
pub mod component;
pub mod error;
pub mod host;
pub mod key;
pub mod node;
pub mod node_ref;
pub mod props;

pub use clone::{ChildArg, clone_vnode};
pub use component::{
    AnyComponent, Batch, Callback, Component, ComponentType, InstanceHandle, InstanceId,
    PendingUpdate, StateUpdate, UpdateQueue, Updater,
};
pub use error::{Error, Result};
pub use host::{Host, NodeId};
pub use key::Key;
pub use node::{
    Children, Kind, RawName, RawVNode, VNode, VNodeBuilder, VNodeFlags, VNodeRef, component,
    element, empty, fragment, portal, text,
};
pub use node_ref::{Ref, RefTarget};
pub use props::{Event, Handler, PropChange, PropValue, Props};
