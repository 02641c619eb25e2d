//! HTML serialization.

use std::fmt::Write;

use crate::node::{Node, NodeId};
use crate::tree::Document;

/// Elements written without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

impl Document {
    /// Serialize `id` including its own tag.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::with_capacity(256);
        self.write_node(id, &mut out);
        out
    }

    /// Serialize the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::with_capacity(256);
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.get(id) {
            Some(Node::Text(text)) => out.push_str(&escape_text(text)),
            Some(Node::Element(el)) => {
                out.push('<');
                out.push_str(&el.tag);
                for (key, value) in el.attrs() {
                    let _ = write!(out, r#" {key}="{}""#, escape_attr(value));
                }
                if VOID_ELEMENTS.contains(&el.tag.as_str()) && self.children(id).is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
            None => {}
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
