//! Fragment parsing with quick-xml.
//!
//! Fragments are well-formed XHTML. Several top-level nodes are wrapped in a
//! `div`; a single top-level element is returned as is.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::DomError;
use crate::node::{Element, Node, NodeId};
use crate::tree::Document;

impl Document {
    /// Parse a complete document; its single top-level element becomes the root.
    pub fn parse(source: &str) -> Result<Self, DomError> {
        let mut doc = Self::new();
        let node = doc.parse_fragment(source)?;
        doc.set_root(node);
        Ok(doc)
    }

    /// Parse `source` into a new detached subtree of this document.
    ///
    /// On failure nothing parsed so far stays in the arena.
    pub fn parse_fragment(&mut self, source: &str) -> Result<NodeId, DomError> {
        let wrapper = self.create_element("div");
        match self.parse_into(source, wrapper) {
            Ok(()) => Ok(self.unwrap_single(wrapper)),
            Err(e) => {
                self.remove(wrapper);
                Err(e)
            }
        }
    }

    fn parse_into(&mut self, source: &str, wrapper: NodeId) -> Result<(), DomError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);

        let mut open = vec![wrapper];
        let mut buf = Vec::new();

        loop {
            let top = open.last().copied().unwrap_or(wrapper);
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let el = decode_element(&reader, &e)?;
                    let id = self.insert(Node::Element(el));
                    self.append_child(top, id);
                    open.push(id);
                }
                Event::Empty(e) => {
                    let el = decode_element(&reader, &e)?;
                    let id = self.insert(Node::Element(el));
                    self.append_child(top, id);
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    self.append_text(top, &text);
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    self.append_text(top, &decode_entity(&entity));
                }
                Event::CData(e) => {
                    self.append_text(top, &String::from_utf8_lossy(&e));
                }
                Event::End(e) => {
                    if open.len() == 1 {
                        let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        return Err(DomError::UnexpectedEnd(tag));
                    }
                    open.pop();
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }

        if open.len() > 1 {
            let tag = open
                .last()
                .and_then(|&n| self.element(n))
                .map(|el| el.tag.clone())
                .unwrap_or_default();
            return Err(DomError::Unclosed(tag));
        }
        Ok(())
    }

    /// Return the only element child of `wrapper` when everything else is
    /// whitespace, dropping the wrapper.
    fn unwrap_single(&mut self, wrapper: NodeId) -> NodeId {
        let significant: Vec<NodeId> = self
            .children(wrapper)
            .iter()
            .copied()
            .filter(|&n| !matches!(self.get(n), Some(Node::Text(t)) if t.trim().is_empty()))
            .collect();
        match significant.as_slice() {
            [only] if self.is_element(*only) => {
                let only = *only;
                self.detach(only);
                self.remove(wrapper);
                only
            }
            _ => wrapper,
        }
    }

    /// Append text, merging with a trailing text node.
    fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.children(parent).last()
            && let Some(Node::Text(existing)) = self.nodes.get_mut(last)
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text);
        self.append_child(parent, node);
    }
}

fn decode_element<R>(reader: &Reader<R>, e: &BytesStart) -> Result<Element, DomError> {
    let tag = reader.decoder().decode(e.name().as_ref())?.into_owned();
    let mut el = Element::new(tag);
    for attr in e.attributes() {
        let attr = attr?;
        let key = reader.decoder().decode(attr.key.as_ref())?;
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        el.set_attr(&key, value);
    }
    Ok(el)
}

/// Decode an entity reference body (`amp`, `#38`, `#x26`).
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        "nbsp" => "\u{a0}".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{Document, DomError};

    #[test]
    fn test_parse_single_element_not_wrapped() {
        let mut doc = Document::new();
        let node = doc.parse_fragment("  <p class=\"x\">Hi</p>\n").unwrap();
        assert_eq!(doc.element(node).unwrap().tag, "p");
        assert_eq!(doc.text_content(node), "Hi");
        assert!(!doc.is_attached(node));
    }

    #[test]
    fn test_parse_multiple_nodes_wrapped_in_div() {
        let mut doc = Document::new();
        let node = doc.parse_fragment("<h1>T</h1><p>B</p>").unwrap();
        assert_eq!(doc.element(node).unwrap().tag, "div");
        assert_eq!(doc.child_elements(node).len(), 2);
    }

    #[test]
    fn test_parse_text_only_fragment_wrapped() {
        let mut doc = Document::new();
        let node = doc.parse_fragment("book_page_page/a").unwrap();
        assert_eq!(doc.element(node).unwrap().tag, "div");
        assert_eq!(doc.text_content(node), "book_page_page/a");
    }

    #[test]
    fn test_parse_entities() {
        let mut doc = Document::new();
        let node = doc
            .parse_fragment("<p title=\"a &amp; b\">x &lt; y &#38; &#x41;</p>")
            .unwrap();
        assert_eq!(doc.text_content(node), "x < y & A");
        assert_eq!(doc.attr(node, "title"), Some("a & b"));
    }

    #[test]
    fn test_parse_self_closing_and_cdata() {
        let mut doc = Document::new();
        let node = doc
            .parse_fragment("<div><br/><![CDATA[<raw>]]></div>")
            .unwrap();
        assert_eq!(doc.children(node).len(), 2);
        assert_eq!(doc.text_content(node), "<raw>");
    }

    #[test]
    fn test_parse_unclosed_element_fails() {
        let mut doc = Document::new();
        let before = doc.len();
        let err = doc.parse_fragment("<div><p>text</div>").unwrap_err();
        assert!(matches!(err, DomError::Xml(_) | DomError::Unclosed(_)));
        assert_eq!(doc.len(), before);
    }

    #[test]
    fn test_parse_document_sets_root() {
        let doc = Document::parse("<html><body id=\"b\"/></html>").unwrap();
        assert_eq!(doc.element(doc.root()).unwrap().tag, "html");
        assert!(doc.get_element_by_id("b").is_some());
    }
}
