//! Resource identifiers.
//!
//! An id names a virtual page: a type token followed by path segments,
//! written `type/seg/seg` with every component percent-encoded. The type
//! token selects the page handler; the segments locate the resource.

use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::error::BlockError;

/// Characters encoded inside a component. `/` is included so a segment
/// such as a database URL stays a single component.
const COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A page identifier: type token plus path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    kind: String,
    path: Vec<String>,
}

impl ResourceId {
    pub fn new(kind: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            kind: kind.into(),
            path,
        }
    }

    /// Parse `type/seg/...`, with or without a leading `#`.
    pub fn parse(s: &str) -> Result<Self, BlockError> {
        let raw = s.trim();
        let raw = raw.strip_prefix('#').unwrap_or(raw);
        let mut components = raw.split('/');
        let kind = decode(components.next().unwrap_or_default(), s)?;
        if kind.is_empty() {
            return Err(BlockError::InvalidId(s.to_owned()));
        }
        let path = components
            .map(|segment| decode(segment, s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { kind, path })
    }

    /// The type token that selects a page handler.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// URL referencing this resource (`#type/seg/...`).
    pub fn content_url(&self) -> String {
        format!("#{self}")
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", utf8_percent_encode(&self.kind, COMPONENT))?;
        for segment in &self.path {
            write!(f, "/{}", utf8_percent_encode(segment, COMPONENT))?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ResourceId {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn decode(component: &str, whole: &str) -> Result<String, BlockError> {
    percent_decode_str(component)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| BlockError::InvalidId(whole.to_owned()))
}

/// Whether `prefix` is a prefix of `path`. The empty path prefixes everything.
pub fn is_prefix<T: PartialEq>(prefix: &[T], path: &[T]) -> bool {
    path.starts_with(prefix)
}
