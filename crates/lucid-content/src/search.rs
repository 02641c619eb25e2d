//! Search index projection.
//!
//! Produces plain-text title/body pairs for a client-side search box.
//! Markup is stripped and bodies are cut to a display snippet.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::tree::ContentTree;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(amp|lt|gt|quot|apos|nbsp|#[0-9]+);").unwrap());

/// Marker appended to truncated snippets.
pub const ELLIPSIS: &str = "...";

/// One searchable node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    pub id: String,
    pub title: String,
    pub body: String,
}

/// Index every node of `tree`, in pre-order.
pub fn search_index(tree: &ContentTree, snippet_length: usize) -> Vec<SearchEntry> {
    tree.preorder()
        .into_iter()
        .map(|idx| {
            let node = tree.node(idx);
            SearchEntry {
                id: node.id.to_string(),
                title: strip_markup(&node.title),
                body: snippet(
                    &strip_markup(node.body.as_deref().unwrap_or_default()),
                    snippet_length,
                ),
            }
        })
        .collect()
}

/// Remove tags, decode common entities and collapse whitespace.
pub fn strip_markup(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    let text = ENTITY_RE.replace_all(&text, |caps: &regex::Captures<'_>| {
        match &caps[1] {
            "amp" => "&".to_owned(),
            "lt" => "<".to_owned(),
            "gt" => ">".to_owned(),
            "quot" => "\"".to_owned(),
            "apos" => "'".to_owned(),
            "nbsp" => " ".to_owned(),
            code => code[1..]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default(),
        }
    });
    SPACE_RE.replace_all(&text, " ").trim().to_owned()
}

/// First `length` characters of `text`, with [`ELLIPSIS`] when cut.
pub fn snippet(text: &str, length: usize) -> String {
    match text.char_indices().nth(length) {
        Some((end, _)) => format!("{}{ELLIPSIS}", &text[..end]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tree::tests::sample;

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("<p>Fish &amp; <b>chips</b></p>\n\n<p>&#233;t&eacute;</p>"),
            "Fish & chips ét&eacute;"
        );
    }

    #[test]
    fn test_snippet_truncates_by_chars() {
        assert_eq!(snippet("abcdef", 3), "abc...");
        assert_eq!(snippet("abc", 3), "abc");
        assert_eq!(snippet("héllo", 2), "hé...");
        assert_eq!(snippet("", 0), "");
    }

    #[test]
    fn test_search_index_entries() {
        let index = search_index(&sample(), 4);
        assert_eq!(index.len(), 7);
        assert_eq!(
            index[0],
            SearchEntry {
                id: "doc_root_page/guide".to_owned(),
                title: "Guide".to_owned(),
                body: "Welc...".to_owned(),
            }
        );
        assert_eq!(index[1].body, "");
    }

    #[test]
    fn test_search_entry_json() {
        let entry = SearchEntry {
            id: "book_page_page/b.xml/a".to_owned(),
            title: "A".to_owned(),
            body: "Text".to_owned(),
        };
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"id":"book_page_page/b.xml/a","title":"A","body":"Text"}"#
        );
    }
}
