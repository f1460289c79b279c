//! Renderer behavior checked against the in-memory host.

use std::{cell::RefCell, rc::Rc};

use ripple_memory::MemoryHost;

use crate::{Config, NodeId, Renderer};

mod lifecycle;
mod scheduling;

/// Shared event log written by test components.
type Log = Rc<RefCell<Vec<String>>>;

fn setup() -> (Renderer<MemoryHost>, NodeId) {
    setup_with(Config::default().strict_keys(true))
}

fn setup_with(config: Config) -> (Renderer<MemoryHost>, NodeId) {
    let mut host = MemoryHost::new();
    let root = host.create_container();
    (Renderer::with_config(host, config), root)
}

fn html(renderer: &Renderer<MemoryHost>, node: NodeId) -> String {
    renderer.host().inner_html(node)
}

fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}
