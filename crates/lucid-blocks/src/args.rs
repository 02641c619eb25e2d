//! Block argument parsing.
//!
//! Arguments are direct children of a block element whose class names the
//! argument:
//!
//! ```html
//! <div class="menu_contents_block">
//!   <div class="menu_id">menu_node_page/menus.xml/main</div>
//!   <div class="menu_expand_level">1</div>
//! </div>
//! ```

use std::collections::HashMap;
use std::str::FromStr;

use lucid_dom::{Document, NodeId};

use crate::error::BlockError;

/// One expected argument.
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    /// Class name of the argument element.
    pub name: &'static str,
    pub required: bool,
}

impl ArgSpec {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// Argument elements found on a block, keyed by argument name.
#[derive(Debug, Default)]
pub struct BlockArguments {
    values: HashMap<&'static str, (NodeId, String)>,
}

impl BlockArguments {
    /// Collect the children of `element` matching `schema`.
    ///
    /// The first matching child wins when several carry the same class.
    pub fn parse(
        document: &Document,
        element: NodeId,
        schema: &[ArgSpec],
    ) -> Result<Self, BlockError> {
        let mut values = HashMap::with_capacity(schema.len());
        for spec in schema {
            match document.children_with_class(element, spec.name).first() {
                Some(&node) => {
                    let text = document.text_content(node).trim().to_owned();
                    values.insert(spec.name, (node, text));
                }
                None if spec.required => {
                    return Err(BlockError::MissingArgument(spec.name.to_owned()));
                }
                None => {}
            }
        }
        Ok(Self { values })
    }

    /// Trimmed text of an argument.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|(_, text)| text.as_str())
    }

    /// The argument element itself.
    pub fn element(&self, name: &str) -> Option<NodeId> {
        self.values.get(name).map(|(node, _)| *node)
    }

    /// Parse an argument's text, `None` when absent.
    pub fn parsed<T>(&self, name: &str) -> Result<Option<T>, BlockError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.text(name)
            .map(|text| {
                text.parse().map_err(|e: T::Err| BlockError::InvalidArgument {
                    name: name.to_owned(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Boolean flag; present with any text other than `false` or `0`.
    pub fn flag(&self, name: &str) -> bool {
        self.text(name)
            .is_some_and(|text| !matches!(text, "false" | "0"))
    }
}
