//! Arena document model for Lucid.
//!
//! A [`Document`] stores element and text nodes in a slotmap arena. Node
//! handles ([`NodeId`]) are `Copy` and go stale when their node is removed,
//! which is how the expansion engine notices that a handler replaced an
//! element it was about to visit.
//!
//! Fragments are parsed from well-formed XHTML with quick-xml
//! ([`Document::parse_fragment`]) and serialized back with
//! [`Document::outer_html`] / [`Document::inner_html`].

mod error;
mod node;
mod parse;
mod query;
mod serialize;
mod tree;

pub use error::DomError;
pub use node::{Element, Node, NodeId};
pub use tree::Document;
