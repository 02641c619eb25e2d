//! Handler registry.
//!
//! Block handlers are keyed by class name, page handlers by id type token.
//! Both share one namespace of names: registering a name already present in
//! either map is rejected and the first registration stays active.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{BlockError, Namespace};
use crate::handler::{BlockHandler, Handler, PageHandler, PageLoadHandler};

/// Registered block, page and page-load handlers.
///
/// Filled while modules load, then handed to the engine and read-only.
#[derive(Default)]
pub struct HandlerRegistry {
    blocks: HashMap<String, Handler<dyn BlockHandler>>,
    pages: HashMap<String, Handler<dyn PageHandler>>,
    page_load: Vec<Rc<dyn PageLoadHandler>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_block(
        &mut self,
        name: &str,
        handler: Handler<dyn BlockHandler>,
    ) -> Result<(), BlockError> {
        self.check_new(name, &handler)?;
        tracing::debug!(name, "Registered block handler");
        self.blocks.insert(name.to_owned(), handler);
        Ok(())
    }

    pub fn register_page(
        &mut self,
        name: &str,
        handler: Handler<dyn PageHandler>,
    ) -> Result<(), BlockError> {
        self.check_new(name, &handler)?;
        tracing::debug!(name, "Registered page handler");
        self.pages.insert(name.to_owned(), handler);
        Ok(())
    }

    /// Register a handler run after every page load.
    pub fn register_page_load(&mut self, handler: Rc<dyn PageLoadHandler>) {
        self.page_load.push(handler);
    }

    fn check_new<H: ?Sized>(&self, name: &str, handler: &Handler<H>) -> Result<(), BlockError> {
        if let Handler::Template(url) = handler
            && url.trim().is_empty()
        {
            return Err(BlockError::InvalidHandler(name.to_owned()));
        }
        let existing = if self.blocks.contains_key(name) {
            Some(Namespace::Block)
        } else if self.pages.contains_key(name) {
            Some(Namespace::Page)
        } else {
            None
        };
        match existing {
            Some(namespace) => Err(BlockError::DuplicateHandler {
                name: name.to_owned(),
                namespace,
            }),
            None => Ok(()),
        }
    }

    pub fn block(&self, name: &str) -> Option<&Handler<dyn BlockHandler>> {
        self.blocks.get(name)
    }

    pub fn page(&self, name: &str) -> Option<&Handler<dyn PageHandler>> {
        self.pages.get(name)
    }

    /// First class, in declaration order, with a block handler.
    pub fn find_block<'c>(
        &self,
        classes: &'c [String],
    ) -> Option<(&'c str, &Handler<dyn BlockHandler>)> {
        classes
            .iter()
            .find_map(|class| Some((class.as_str(), self.blocks.get(class)?)))
    }

    /// First class, in declaration order, naming a page handler.
    pub fn find_page<'c>(
        &self,
        classes: &'c [String],
    ) -> Option<(&'c str, &Handler<dyn PageHandler>)> {
        classes
            .iter()
            .find_map(|class| Some((class.as_str(), self.pages.get(class)?)))
    }

    /// Registered names in one namespace, sorted.
    pub fn names(&self, namespace: Namespace) -> Vec<&str> {
        let mut names: Vec<&str> = match namespace {
            Namespace::Block => self.blocks.keys().map(String::as_str).collect(),
            Namespace::Page => self.pages.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }

    pub(crate) fn page_load_handlers(&self) -> &[Rc<dyn PageLoadHandler>] {
        &self.page_load
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("blocks", &self.names(Namespace::Block))
            .field("pages", &self.names(Namespace::Page))
            .field("page_load", &self.page_load.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use lucid_dom::NodeId;

    use super::*;
    use crate::context::BlockContext;
    use crate::handler::BoxFuture;

    struct Noop;

    impl BlockHandler for Noop {
        fn expand<'a>(
            &'a self,
            _cx: BlockContext<'a>,
        ) -> BoxFuture<'a, Result<Option<NodeId>, BlockError>> {
            Box::pin(async { Ok(None) })
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_block("x_block", Handler::block(Noop))
            .unwrap();
        registry
            .register_page("x_page", Handler::template("x.html"))
            .unwrap();

        assert!(matches!(registry.block("x_block"), Some(Handler::Function(_))));
        assert!(matches!(registry.page("x_page"), Some(Handler::Template(url)) if url == "x.html"));
        assert!(registry.block("x_page").is_none());
        assert_eq!(registry.names(Namespace::Block), vec!["x_block"]);
        assert_eq!(registry.names(Namespace::Page), vec!["x_page"]);
    }

    #[test]
    fn test_duplicate_block_keeps_first() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_block("x_block", Handler::template("first.html"))
            .unwrap();

        let err = registry
            .register_block("x_block", Handler::template("second.html"))
            .unwrap_err();

        assert!(matches!(
            err,
            BlockError::DuplicateHandler { namespace: Namespace::Block, .. }
        ));
        assert!(
            matches!(registry.block("x_block"), Some(Handler::Template(url)) if url == "first.html")
        );
    }

    #[test]
    fn test_duplicate_across_namespaces_rejected() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_page("shared", Handler::template("page.html"))
            .unwrap();

        let err = registry
            .register_block("shared", Handler::block(Noop))
            .unwrap_err();

        assert!(matches!(
            err,
            BlockError::DuplicateHandler { namespace: Namespace::Page, .. }
        ));
        assert!(registry.block("shared").is_none());
    }

    #[test]
    fn test_empty_template_is_invalid() {
        let mut registry = HandlerRegistry::new();
        let err = registry
            .register_block("bad_block", Handler::template("  "))
            .unwrap_err();
        assert!(matches!(err, BlockError::InvalidHandler(name) if name == "bad_block"));
        assert!(registry.names(Namespace::Block).is_empty());
    }

    #[test]
    fn test_find_block_uses_declaration_order() {
        let mut registry = HandlerRegistry::new();
        registry.register_block("b_block", Handler::template("b.html")).unwrap();
        registry.register_block("a_block", Handler::template("a.html")).unwrap();

        let classes = vec![
            "plain".to_owned(),
            "b_block".to_owned(),
            "a_block".to_owned(),
        ];
        let (class, _) = registry.find_block(&classes).unwrap();

        assert_eq!(class, "b_block");
        assert!(registry.find_page(&classes).is_none());
    }
}
