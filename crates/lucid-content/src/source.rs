//! Source document parsing shared by the content builders.
//!
//! Source documents are XML. Each entry names its fields with child
//! elements (`<name>`, `<title>`, ...). A broken entry is skipped together
//! with its subtree and recorded in the [`ParseReport`]; the rest of the
//! document still loads.

use lucid_blocks::{BlockError, ResourceId};
use lucid_dom::{Document, DomError, NodeId};

use crate::tree::{ContentNode, ContentTree, ContentTreeBuilder, NodeKind};

/// A failure while reading a source document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("'{url}' is not well-formed: {source}")]
    Xml {
        url: String,
        #[source]
        source: DomError,
    },

    #[error("'{url}': expected a <{expected}> document, found <{found}>")]
    UnexpectedRoot {
        url: String,
        expected: &'static str,
        found: String,
    },

    #[error("'{url}': <{element}> is missing its <{field}>")]
    MissingField {
        url: String,
        element: String,
        field: &'static str,
    },

    #[error("'{url}': unexpected <{tag}> inside <{parent}>")]
    UnknownElement {
        url: String,
        tag: String,
        parent: String,
    },

    #[error("'{url}': <{element}> has an invalid link: {source}")]
    InvalidLink {
        url: String,
        element: String,
        #[source]
        source: BlockError,
    },
}

impl ParseError {
    /// URL of the document that failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Xml { url, .. }
            | Self::UnexpectedRoot { url, .. }
            | Self::MissingField { url, .. }
            | Self::UnknownElement { url, .. }
            | Self::InvalidLink { url, .. } => url,
        }
    }
}

impl From<ParseError> for BlockError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Xml { url, source } => BlockError::Parse { url, source },
            other => BlockError::Content {
                url: other.url().to_owned(),
                message: other.to_string(),
            },
        }
    }
}

/// A parsed forest plus the entries that could not be read.
#[derive(Debug)]
pub struct ParseReport {
    pub tree: ContentTree,
    pub errors: Vec<ParseError>,
}

/// How one content family lays out its entries.
pub(crate) struct Schema {
    /// Tag of the document element.
    pub root: &'static str,
    /// Tag of the element holding an entry's children.
    pub container: &'static str,
    /// Maps a child tag to its node kind and page type, given whether it
    /// sits at the top level.
    pub entry: fn(tag: &str, top: bool) -> Option<(NodeKind, &'static str)>,
}

/// Parse `source` (fetched from `url`) into a forest following `schema`.
///
/// `fill` completes each node from its element's fields.
pub(crate) fn parse_forest(
    url: &str,
    source: &str,
    schema: &Schema,
    fill: &dyn Fn(&Fields<'_>, ContentNode) -> Result<ContentNode, ParseError>,
) -> Result<ParseReport, ParseError> {
    let doc = Document::parse(source).map_err(|source| ParseError::Xml {
        url: url.to_owned(),
        source,
    })?;
    let found = doc
        .element(doc.root())
        .map(|el| el.tag.clone())
        .unwrap_or_default();
    if found != schema.root {
        return Err(ParseError::UnexpectedRoot {
            url: url.to_owned(),
            expected: schema.root,
            found,
        });
    }

    let mut parser = ForestParser {
        url,
        doc: &doc,
        schema,
        fill,
        builder: ContentTreeBuilder::new(),
        errors: Vec::new(),
    };
    let base = vec![url.to_owned()];
    for entry in doc.child_elements(doc.root()) {
        parser.entry(entry, None, &base, schema.root);
    }

    Ok(ParseReport {
        tree: parser.builder.build(),
        errors: parser.errors,
    })
}

struct ForestParser<'a> {
    url: &'a str,
    doc: &'a Document,
    schema: &'a Schema,
    fill: &'a dyn Fn(&Fields<'_>, ContentNode) -> Result<ContentNode, ParseError>,
    builder: ContentTreeBuilder,
    errors: Vec<ParseError>,
}

impl ForestParser<'_> {
    fn entry(&mut self, element: NodeId, parent: Option<usize>, path: &[String], parent_tag: &str) {
        if let Err(err) = self.try_entry(element, parent, path, parent_tag) {
            tracing::debug!(url = self.url, "Skipping entry: {err}");
            self.errors.push(err);
        }
    }

    fn try_entry(
        &mut self,
        element: NodeId,
        parent: Option<usize>,
        path: &[String],
        parent_tag: &str,
    ) -> Result<(), ParseError> {
        let tag = self.tag(element);
        let (kind, page_type) = (self.schema.entry)(&tag, parent.is_none()).ok_or_else(|| {
            ParseError::UnknownElement {
                url: self.url.to_owned(),
                tag: tag.clone(),
                parent: parent_tag.to_owned(),
            }
        })?;

        let fields = Fields {
            url: self.url,
            doc: self.doc,
            element,
            tag: &tag,
        };
        let name = fields.required("name")?;
        let mut node_path = path.to_vec();
        node_path.push(name.clone());
        let node = ContentNode::new(kind, name, ResourceId::new(page_type, node_path.clone()));
        let node = (self.fill)(&fields, node)?;
        let idx = self.builder.add(node, parent);

        if let Some(container) = self.doc.child_by_tag(element, self.schema.container) {
            for child in self.doc.child_elements(container) {
                self.entry(child, Some(idx), &node_path, &tag);
            }
        }
        Ok(())
    }

    fn tag(&self, element: NodeId) -> String {
        self.doc
            .element(element)
            .map(|el| el.tag.clone())
            .unwrap_or_default()
    }
}

/// Field accessors for one source entry.
pub(crate) struct Fields<'a> {
    url: &'a str,
    doc: &'a Document,
    element: NodeId,
    tag: &'a str,
}

impl Fields<'_> {
    /// Trimmed text of a field, `None` when the field element is absent.
    pub fn text(&self, field: &str) -> Option<String> {
        self.doc
            .child_by_tag(self.element, field)
            .map(|node| self.doc.text_content(node).trim().to_owned())
    }

    /// Like [`text`](Self::text), failing when absent or empty.
    pub fn required(&self, field: &'static str) -> Result<String, ParseError> {
        self.text(field)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ParseError::MissingField {
                url: self.url.to_owned(),
                element: self.tag.to_owned(),
                field,
            })
    }

    /// Markup of a field: inline elements are kept as serialized markup,
    /// otherwise the (entity-decoded) text is taken as markup.
    pub fn markup(&self, field: &str) -> Option<String> {
        let node = self.doc.child_by_tag(self.element, field)?;
        if self.doc.child_elements(node).is_empty() {
            Some(self.doc.text_content(node).trim().to_owned())
        } else {
            Some(self.doc.inner_html(node).trim().to_owned())
        }
    }

    /// An optional field holding a resource id.
    pub fn link(&self, field: &str) -> Result<Option<ResourceId>, ParseError> {
        self.text(field)
            .filter(|text| !text.is_empty())
            .map(|text| {
                ResourceId::parse(&text).map_err(|source| ParseError::InvalidLink {
                    url: self.url.to_owned(),
                    element: self.tag.to_owned(),
                    source,
                })
            })
            .transpose()
    }
}
