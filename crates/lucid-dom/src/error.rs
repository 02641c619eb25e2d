//! Error types for fragment parsing.

/// Errors from parsing a fragment.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// Malformed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Malformed attribute.
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    /// Text that is not valid in the source encoding.
    #[error("Encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
    /// An end tag with no matching start tag.
    #[error("Unexpected end tag </{0}>")]
    UnexpectedEnd(String),
    /// Input ended inside an element.
    #[error("Unclosed element <{0}>")]
    Unclosed(String),
}
