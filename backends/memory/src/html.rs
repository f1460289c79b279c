//! HTML serialization of memory-host subtrees.

use std::fmt::Write as _;

use ripple_core::{NodeId, PropValue, node::format_number};

use crate::tree::{MemoryHost, NodeData};

const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "hr", "img", "input", "link", "meta"];

impl MemoryHost {
    /// Serializes the children of `node`.
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_node(&mut out, *child);
        }
        out
    }

    /// Serializes `node` and its subtree. Containers serialize as their children.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node);
        out
    }

    fn write_node(&self, out: &mut String, node: NodeId) {
        match self.data(node) {
            Some(NodeData::Text(text)) => escape_into(out, text, false),
            Some(NodeData::Element {
                tag, attributes, ..
            }) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    write_attribute(out, name, value);
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&&**tag) {
                    return;
                }
                for child in self.children(node) {
                    self.write_node(out, *child);
                }
                let _ = write!(out, "</{tag}>");
            }
            Some(NodeData::Container) => {
                for child in self.children(node) {
                    self.write_node(out, *child);
                }
            }
            None => {}
        }
    }
}

fn write_attribute(out: &mut String, name: &str, value: &PropValue) {
    let name = if name == "className" { "class" } else { name };
    match value {
        PropValue::Bool(true) => {
            out.push(' ');
            out.push_str(name);
        }
        PropValue::Str(text) => {
            let _ = write!(out, " {name}=\"");
            escape_into(out, text, true);
            out.push('"');
        }
        PropValue::Number(n) => {
            let _ = write!(out, " {name}=\"{}\"", format_number(*n));
        }
        _ => {}
    }
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
