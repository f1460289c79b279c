#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
mod diff;
mod fiber;
mod instance;
mod lifecycle;
mod lis;
pub mod logging;
mod mount;
mod patch;
mod renderer;
mod scheduler;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use renderer::Renderer;

#[doc(inline)]
pub use ripple_core::{
    AnyComponent, Callback, ChildArg, Children, Component, ComponentType, Error, Event, Handler,
    Host, InstanceId, Key, Kind, NodeId, PropChange, PropValue, Props, RawName, RawVNode, Ref,
    RefTarget, Result, Updater, VNode, VNodeBuilder, VNodeFlags, VNodeRef, clone_vnode,
    component, element, empty, fragment, portal, text,
};

pub mod prelude {
    //! Commonly used items for building and rendering descriptor trees.
    //!
    //! ```rust
    //! use ripple::prelude::*;
    //!
    //! let tree = element("ul")
    //!     .children(["a", "b"].map(|key| element("li").key(key).text(key).build()))
    //!     .build();
    //! assert!(matches!(tree.children(), Children::Keyed(_)));
    //! ```
    pub use super::{
        ChildArg, Children, Component, ComponentType, Config, Handler, Host, NodeId, PropValue,
        Props, Ref, RefTarget, Renderer, Updater, VNodeRef, clone_vnode, component, element,
        empty, fragment, portal, text,
    };
}
