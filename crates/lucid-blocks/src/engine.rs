//! Block expansion engine.
//!
//! Expansion of an element, under an ambient page id:
//!
//! 1. Nothing happens for a missing, removed or text node.
//! 2. A `core_page_block` is replaced by the rendered page whose id is the
//!    element text (or the ambient id when empty), and that page is expanded
//!    with its own id as the new ambient id.
//! 3. A `core_id_block` is replaced by the ambient id as text.
//! 4. Otherwise the children are expanded one after another, in document
//!    order, and then the element's first class with a block handler is
//!    removed and the handler applied. A returned replacement is expanded
//!    in turn.
//! 5. An element whose class names a page handler is replaced by that page,
//!    using its text as the page id.
//!
//! Every failure goes through the [`ErrorPolicy`].

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use lucid_config::{Config, ErrorMode};
use lucid_dom::{Document, NodeId};
use lucid_storage::Storage;

use crate::context::{BlockContext, PageContext};
use crate::error::BlockError;
use crate::handler::{BoxFuture, Handler, PageHandler, PageLoadHandler};
use crate::id::ResourceId;
use crate::policy::ErrorPolicy;
use crate::registry::HandlerRegistry;

/// Marker class for an embedded page.
pub const PAGE_BLOCK: &str = "core_page_block";
/// Marker class replaced by the ambient id.
pub const ID_BLOCK: &str = "core_id_block";

/// Engine limits and error mode.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum nesting of re-entries: handler replacements, embedded pages
    /// and handler-driven expansions. Plain markup nesting is not counted.
    ///
    /// Default: 64
    pub max_depth: usize,
    pub error_mode: ErrorMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            error_mode: ErrorMode::Strict,
        }
    }
}

impl EngineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.engine.max_depth,
            error_mode: config.error_mode,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }
}

/// Expands block elements using a frozen [`HandlerRegistry`].
pub struct BlockEngine {
    registry: HandlerRegistry,
    storage: Arc<dyn Storage>,
    config: EngineConfig,
    policy: ErrorPolicy,
    page_load: RefCell<Vec<Rc<dyn PageLoadHandler>>>,
}

impl BlockEngine {
    pub fn new(registry: HandlerRegistry, storage: Arc<dyn Storage>, config: EngineConfig) -> Self {
        let page_load = registry.page_load_handlers().to_vec();
        Self {
            policy: ErrorPolicy::new(config.error_mode),
            registry,
            storage,
            config,
            page_load: RefCell::new(page_load),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn policy(&self) -> &ErrorPolicy {
        &self.policy
    }

    /// Report a failure that happened outside an expansion.
    pub fn report(&self, err: BlockError) -> Result<(), BlockError> {
        self.policy.report(err)
    }

    /// Messages reported in lenient mode so far.
    pub fn warnings(&self) -> Vec<String> {
        self.policy.warnings()
    }

    /// Expand `node` and everything inside it under the ambient `id`.
    ///
    /// Completes once the whole subtree has been expanded. In strict mode the
    /// first failure aborts the expansion and is returned.
    pub async fn expand(
        &self,
        document: &mut Document,
        node: Option<NodeId>,
        id: &ResourceId,
    ) -> Result<(), BlockError> {
        self.expand_at(document, node, id, 0).await
    }

    pub(crate) fn expand_at<'a>(
        &'a self,
        document: &'a mut Document,
        node: Option<NodeId>,
        id: &'a ResourceId,
        depth: usize,
    ) -> BoxFuture<'a, Result<(), BlockError>> {
        Box::pin(async move {
            let result = if depth > self.config.max_depth {
                Err(BlockError::DepthExceeded(self.config.max_depth))
            } else {
                self.expand_node(document, node, id, depth).await
            };
            match result {
                Ok(()) => Ok(()),
                Err(err) => self.policy.report(err),
            }
        })
    }

    async fn expand_node(
        &self,
        document: &mut Document,
        node: Option<NodeId>,
        id: &ResourceId,
        depth: usize,
    ) -> Result<(), BlockError> {
        let Some(node) = node else {
            return Ok(());
        };
        if !document.is_element(node) {
            return Ok(());
        }

        if document.has_class(node, PAGE_BLOCK) {
            return self.expand_page_block(document, node, id, depth).await;
        }

        if document.has_class(node, ID_BLOCK) {
            let text = document.create_text(id.to_string());
            document.replace_with(node, text);
            return Ok(());
        }

        for child in document.children(node).to_vec() {
            // Skip children an earlier sibling's handler removed or moved.
            if document.parent(child) != Some(node) {
                continue;
            }
            self.expand_at(document, Some(child), id, depth).await?;
        }
        if !document.is_element(node) {
            return Ok(());
        }

        let classes = document.classes(node);

        if let Some((class, handler)) = self.registry.find_block(&classes) {
            document.remove_class(node, class);
            tracing::debug!(class, id = %id, "Expanding block");
            let next = match handler {
                Handler::Template(url) => {
                    let fragment = self.fetch_fragment(document, url).await?;
                    document.replace_with(node, fragment);
                    Some(fragment)
                }
                Handler::Function(f) => {
                    let cx = BlockContext {
                        engine: self,
                        document: &mut *document,
                        element: node,
                        id,
                        depth,
                    };
                    f.expand(cx).await?
                }
            };
            if let Some(next) = next {
                self.expand_at(document, Some(next), id, depth + 1).await?;
            }
            return Ok(());
        }

        if let Some((class, handler)) = self.registry.find_page(&classes) {
            document.remove_class(node, class);
            let page_id = ResourceId::parse(&document.text_content(node))?;
            tracing::debug!(class, id = %page_id, "Expanding page-type block");
            return self
                .swap_in_page(document, node, handler, &page_id, depth)
                .await;
        }

        Ok(())
    }

    async fn expand_page_block(
        &self,
        document: &mut Document,
        node: NodeId,
        id: &ResourceId,
        depth: usize,
    ) -> Result<(), BlockError> {
        let text = document.text_content(node);
        let page_id = if text.trim().is_empty() {
            id.clone()
        } else {
            ResourceId::parse(&text)?
        };
        let handler = self
            .registry
            .page(page_id.kind())
            .ok_or_else(|| BlockError::UnknownPageType(page_id.kind().to_owned()))?;
        tracing::debug!(id = %page_id, "Expanding page block");
        self.swap_in_page(document, node, handler, &page_id, depth)
            .await
    }

    /// Render a page, hide it, put it where `node` is, expand it under the
    /// page id, then reveal it.
    async fn swap_in_page(
        &self,
        document: &mut Document,
        node: NodeId,
        handler: &Handler<dyn PageHandler>,
        page_id: &ResourceId,
        depth: usize,
    ) -> Result<(), BlockError> {
        let page = self.apply_page_handler(document, handler, page_id).await?;
        document.set_style(page, "opacity", "0");
        document.replace_with(node, page);
        self.expand_at(document, Some(page), page_id, depth + 1)
            .await?;
        document.set_style(page, "opacity", "1");
        Ok(())
    }

    /// Render the detached page element for `id`.
    pub async fn render_page(
        &self,
        document: &mut Document,
        id: &ResourceId,
    ) -> Result<NodeId, BlockError> {
        let handler = self
            .registry
            .page(id.kind())
            .ok_or_else(|| BlockError::UnknownPageType(id.kind().to_owned()))?;
        self.apply_page_handler(document, handler, id).await
    }

    async fn apply_page_handler(
        &self,
        document: &mut Document,
        handler: &Handler<dyn PageHandler>,
        id: &ResourceId,
    ) -> Result<NodeId, BlockError> {
        match handler {
            Handler::Template(url) => self.fetch_fragment(document, url).await,
            Handler::Function(f) => {
                f.render(PageContext {
                    engine: self,
                    document,
                    id,
                })
                .await
            }
        }
    }

    /// Fetch `url` and parse it into a detached node.
    pub async fn fetch_fragment(
        &self,
        document: &mut Document,
        url: &str,
    ) -> Result<NodeId, BlockError> {
        let source = self
            .storage
            .read(url)
            .await
            .map_err(|source| BlockError::Fetch {
                url: url.to_owned(),
                source,
            })?;
        document
            .parse_fragment(&source)
            .map_err(|source| BlockError::Parse {
                url: url.to_owned(),
                source,
            })
    }

    /// Register a handler run after every later page load.
    pub fn on_page_load(&self, handler: Rc<dyn PageLoadHandler>) {
        self.page_load.borrow_mut().push(handler);
    }

    /// Run the page-load handlers in registration order, each awaited.
    ///
    /// Handlers whose element left the document are dropped first.
    pub async fn run_page_load(
        &self,
        document: &mut Document,
        id: &ResourceId,
    ) -> Result<(), BlockError> {
        let handlers = {
            let doc: &Document = document;
            let mut list = self.page_load.borrow_mut();
            list.retain(|h| h.is_live(doc));
            list.clone()
        };
        for handler in handlers {
            if let Err(err) = handler.on_page_load(document, id).await {
                self.policy.report(err)?;
            }
        }
        Ok(())
    }

    /// Number of page-load handlers currently registered.
    pub fn page_load_count(&self) -> usize {
        self.page_load.borrow().len()
    }
}

impl std::fmt::Debug for BlockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockEngine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use lucid_config::ErrorMode;
    use lucid_dom::{Document, NodeId};
    use lucid_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::handler::BlockHandler;

    #[derive(Clone, Copy)]
    enum Outcome {
        Done,
        Again,
        Fail,
    }

    /// Logs the element's `data-name` and resolves with a fixed outcome.
    struct Record {
        log: Rc<RefCell<Vec<String>>>,
        outcome: Outcome,
    }

    impl BlockHandler for Record {
        fn expand<'a>(
            &'a self,
            cx: BlockContext<'a>,
        ) -> BoxFuture<'a, Result<Option<NodeId>, BlockError>> {
            Box::pin(async move {
                let name = cx
                    .document
                    .attr(cx.element, "data-name")
                    .unwrap_or_default()
                    .to_owned();
                self.log.borrow_mut().push(name);
                match self.outcome {
                    Outcome::Done => Ok(None),
                    Outcome::Again => Ok(Some(cx.element)),
                    Outcome::Fail => Err(BlockError::Handler("boom".to_owned())),
                }
            })
        }
    }

    /// Removes the element's next sibling.
    struct RemoveNext;

    impl BlockHandler for RemoveNext {
        fn expand<'a>(
            &'a self,
            mut cx: BlockContext<'a>,
        ) -> BoxFuture<'a, Result<Option<NodeId>, BlockError>> {
            Box::pin(async move {
                let parent = cx.document.parent(cx.element);
                let next = parent.and_then(|p| {
                    let siblings = cx.document.children(p);
                    let pos = siblings.iter().position(|&n| n == cx.element)?;
                    siblings.get(pos + 1).copied()
                });
                if let Some(next) = next {
                    cx.document.remove(next);
                }
                Ok(None)
            })
        }
    }

    /// Appends an id block to the element and expands it in place.
    struct AppendId;

    impl BlockHandler for AppendId {
        fn expand<'a>(
            &'a self,
            mut cx: BlockContext<'a>,
        ) -> BoxFuture<'a, Result<Option<NodeId>, BlockError>> {
            Box::pin(async move {
                let child = cx.document.create_element("span");
                cx.document.add_class(child, ID_BLOCK);
                cx.document.append_child(cx.element, child);
                cx.expand(child).await?;
                Ok(None)
            })
        }
    }

    /// Logs the opacity and attachment of the element's parent.
    struct ParentState {
        log: Rc<RefCell<Vec<(Option<String>, bool)>>>,
    }

    impl BlockHandler for ParentState {
        fn expand<'a>(
            &'a self,
            cx: BlockContext<'a>,
        ) -> BoxFuture<'a, Result<Option<NodeId>, BlockError>> {
            Box::pin(async move {
                let parent = cx.document.parent(cx.element);
                let opacity = parent
                    .and_then(|p| cx.document.element(p))
                    .and_then(|e| e.style("opacity"))
                    .map(str::to_owned);
                let attached = parent.is_some_and(|p| cx.document.is_attached(p));
                self.log.borrow_mut().push((opacity, attached));
                Ok(None)
            })
        }
    }

    fn recorder(
        registry: &mut HandlerRegistry,
        name: &str,
        outcome: Outcome,
        log: &Rc<RefCell<Vec<String>>>,
    ) {
        registry
            .register_block(
                name,
                Handler::block(Record {
                    log: Rc::clone(log),
                    outcome,
                }),
            )
            .unwrap();
    }

    fn engine(registry: HandlerRegistry, storage: MockStorage, mode: ErrorMode) -> BlockEngine {
        BlockEngine::new(
            registry,
            Arc::new(storage),
            EngineConfig::default().with_error_mode(mode),
        )
    }

    fn home() -> ResourceId {
        ResourceId::parse("home_page/main").unwrap()
    }

    async fn expand_root(engine: &BlockEngine, doc: &mut Document) -> Result<(), BlockError> {
        let root = doc.root();
        engine.expand(doc, Some(root), &home()).await
    }

    #[tokio::test]
    async fn test_children_expand_before_parent_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        recorder(&mut registry, "rec_block", Outcome::Done, &log);
        let engine = engine(registry, MockStorage::new(), ErrorMode::Strict);
        let mut doc = Document::parse(
            r#"<div class="rec_block" data-name="parent">
                <p class="rec_block" data-name="a"><b class="rec_block" data-name="a1"/></p>
                <p class="rec_block" data-name="b"/>
            </div>"#,
        )
        .unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(*log.borrow(), vec!["a1", "a", "b", "parent"]);
        assert!(!doc.has_class(doc.root(), "rec_block"));
    }

    #[tokio::test]
    async fn test_first_declared_class_wins_then_rest_apply() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        recorder(&mut registry, "first_block", Outcome::Done, &log);
        recorder(&mut registry, "second_block", Outcome::Again, &log);
        let engine = engine(registry, MockStorage::new(), ErrorMode::Strict);
        let mut doc =
            Document::parse(r#"<div class="second_block plain first_block" data-name="x"/>"#)
                .unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(*log.borrow(), vec!["x", "x"]);
        assert_eq!(doc.classes(doc.root()), vec!["plain"]);
    }

    #[tokio::test]
    async fn test_unregistered_classes_are_ignored() {
        let engine = engine(HandlerRegistry::new(), MockStorage::new(), ErrorMode::Strict);
        let mut doc = Document::parse(r#"<div class="unknown_block">text</div>"#).unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(doc.outer_html(doc.root()), r#"<div class="unknown_block">text</div>"#);
    }

    #[tokio::test]
    async fn test_id_block_replaced_by_ambient_id() {
        let engine = engine(HandlerRegistry::new(), MockStorage::new(), ErrorMode::Strict);
        let mut doc = Document::parse(r#"<p>Id: <span class="core_id_block"/></p>"#).unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(doc.outer_html(doc.root()), "<p>Id: home_page/main</p>");
    }

    #[tokio::test]
    async fn test_template_handler_replaces_and_recurses() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_block("note_block", Handler::template("note.html"))
            .unwrap();
        let storage = MockStorage::new()
            .with_file("note.html", r#"<aside>Note on <i class="core_id_block"/></aside>"#);
        let engine = engine(registry, storage, ErrorMode::Strict);
        let mut doc = Document::parse(r#"<div><div class="note_block"/></div>"#).unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(
            doc.outer_html(doc.root()),
            "<div><aside>Note on home_page/main</aside></div>"
        );
    }

    #[tokio::test]
    async fn test_page_block_uses_page_id_as_ambient_id() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_page("article_page", Handler::template("article.html"))
            .unwrap();
        let storage = MockStorage::new().with_file(
            "article.html",
            r#"<article><h1 class="core_id_block"/></article>"#,
        );
        let engine = engine(registry, storage, ErrorMode::Strict);
        let mut doc = Document::parse(
            r#"<main><span class="core_id_block"/><div class="core_page_block">article_page/intro</div></main>"#,
        )
        .unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(
            doc.outer_html(doc.root()),
            r#"<main>home_page/main<article style="opacity:1">article_page/intro</article></main>"#
        );
    }

    #[tokio::test]
    async fn test_page_block_is_hidden_and_attached_while_expanding() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        registry
            .register_page("article_page", Handler::template("article.html"))
            .unwrap();
        registry
            .register_block("state_block", Handler::block(ParentState { log: Rc::clone(&log) }))
            .unwrap();
        let storage = MockStorage::new()
            .with_file("article.html", r#"<article><p class="state_block"/></article>"#);
        let engine = engine(registry, storage, ErrorMode::Strict);
        let mut doc = Document::parse(
            r#"<main><div class="core_page_block">article_page/intro</div></main>"#,
        )
        .unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(*log.borrow(), vec![(Some("0".to_owned()), true)]);
        let article = doc.child_elements(doc.root())[0];
        assert_eq!(doc.element(article).unwrap().style("opacity"), Some("1"));
    }

    #[tokio::test]
    async fn test_empty_page_block_uses_ambient_id() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_page("home_page", Handler::template("home.html"))
            .unwrap();
        let storage = MockStorage::new().with_file("home.html", r#"<section class="core_id_block"/>"#);
        let engine = engine(registry, storage, ErrorMode::Strict);
        let mut doc = Document::parse(r#"<main><div class="core_page_block"/></main>"#).unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(doc.outer_html(doc.root()), "<main>home_page/main</main>");
    }

    #[tokio::test]
    async fn test_page_type_class_expands_as_page() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_page("card_page", Handler::template("card.html"))
            .unwrap();
        let storage =
            MockStorage::new().with_file("card.html", r#"<div class="card"><b><i class="core_id_block"/></b></div>"#);
        let engine = engine(registry, storage, ErrorMode::Strict);
        let mut doc = Document::parse(r#"<main><span class="card_page">card_page/x</span></main>"#).unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(
            doc.outer_html(doc.root()),
            r#"<main><div class="card" style="opacity:1"><b>card_page/x</b></div></main>"#
        );
    }

    #[tokio::test]
    async fn test_unknown_page_type_strict_fails() {
        let engine = engine(HandlerRegistry::new(), MockStorage::new(), ErrorMode::Strict);
        let mut doc =
            Document::parse(r#"<main><div class="core_page_block">nowhere_page/x</div></main>"#).unwrap();

        let err = expand_root(&engine, &mut doc).await.unwrap_err();

        assert!(matches!(err, BlockError::UnknownPageType(kind) if kind == "nowhere_page"));
    }

    #[tokio::test]
    async fn test_strict_failure_stops_later_siblings() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        recorder(&mut registry, "fail_block", Outcome::Fail, &log);
        recorder(&mut registry, "ok_block", Outcome::Done, &log);
        let engine = engine(registry, MockStorage::new(), ErrorMode::Strict);
        let mut doc = Document::parse(
            r#"<div><p class="fail_block" data-name="bad"/><p class="ok_block" data-name="good"/></div>"#,
        )
        .unwrap();

        let err = expand_root(&engine, &mut doc).await.unwrap_err();

        assert!(matches!(err, BlockError::Handler(_)));
        assert_eq!(*log.borrow(), vec!["bad"]);
    }

    #[tokio::test]
    async fn test_lenient_failure_continues_with_siblings() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        recorder(&mut registry, "fail_block", Outcome::Fail, &log);
        recorder(&mut registry, "ok_block", Outcome::Done, &log);
        let engine = engine(registry, MockStorage::new(), ErrorMode::Lenient);
        let mut doc = Document::parse(
            r#"<div><p class="fail_block" data-name="bad"/><p class="ok_block" data-name="good"/></div>"#,
        )
        .unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(*log.borrow(), vec!["bad", "good"]);
        assert_eq!(engine.warnings(), vec!["boom".to_owned()]);
    }

    #[tokio::test]
    async fn test_missing_template_is_fetch_error() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_block("gone_block", Handler::template("gone.html"))
            .unwrap();
        let engine = engine(registry, MockStorage::new(), ErrorMode::Strict);
        let mut doc = Document::parse(r#"<div class="gone_block"/>"#).unwrap();

        let err = expand_root(&engine, &mut doc).await.unwrap_err();

        assert!(matches!(err, BlockError::Fetch { ref url, .. } if url == "gone.html"));
        assert_eq!(err.kind(), crate::ErrorKind::Fetch);
    }

    #[tokio::test]
    async fn test_removed_sibling_is_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        registry
            .register_block("remove_next_block", Handler::block(RemoveNext))
            .unwrap();
        recorder(&mut registry, "rec_block", Outcome::Done, &log);
        let engine = engine(registry, MockStorage::new(), ErrorMode::Strict);
        let mut doc = Document::parse(
            r#"<div><p class="remove_next_block"/><p class="rec_block" data-name="gone"/><p class="rec_block" data-name="kept"/></div>"#,
        )
        .unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(*log.borrow(), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_self_including_template_hits_depth_limit() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_block("loop_block", Handler::template("loop.html"))
            .unwrap();
        let storage = MockStorage::new().with_file("loop.html", r#"<div class="loop_block"/>"#);
        let engine = BlockEngine::new(
            registry,
            Arc::new(storage),
            EngineConfig::default().with_max_depth(8),
        );
        let mut doc = Document::parse(r#"<div class="loop_block"/>"#).unwrap();

        let err = expand_root(&engine, &mut doc).await.unwrap_err();

        assert!(matches!(err, BlockError::DepthExceeded(8)));
    }

    #[tokio::test]
    async fn test_handler_expands_its_own_nodes() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_block("append_block", Handler::block(AppendId))
            .unwrap();
        let engine = engine(registry, MockStorage::new(), ErrorMode::Strict);
        let mut doc = Document::parse(r#"<div><p class="append_block">Id: </p></div>"#).unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(doc.text_content(doc.root()), "Id: home_page/main");
        assert!(doc.find_by_class(doc.root(), ID_BLOCK).is_empty());
    }

    #[tokio::test]
    async fn test_deep_plain_markup_is_not_a_loop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        recorder(&mut registry, "rec_block", Outcome::Done, &log);
        let engine = engine(registry, MockStorage::new(), ErrorMode::Strict);
        let depth = 70;
        let source = format!(
            r#"{}<p class="rec_block" data-name="deep"/>{}"#,
            "<div>".repeat(depth),
            "</div>".repeat(depth)
        );
        let mut doc = Document::parse(&source).unwrap();

        expand_root(&engine, &mut doc).await.unwrap();

        assert_eq!(*log.borrow(), vec!["deep"]);
        assert!(engine.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_expand_none_and_text_complete() {
        let engine = engine(HandlerRegistry::new(), MockStorage::new(), ErrorMode::Strict);
        let mut doc = Document::new();
        let text = doc.create_text("plain");

        engine.expand(&mut doc, None, &home()).await.unwrap();
        engine.expand(&mut doc, Some(text), &home()).await.unwrap();
    }

    struct PageLoadLog {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        element: Option<NodeId>,
    }

    impl PageLoadHandler for PageLoadLog {
        fn on_page_load<'a>(
            &'a self,
            _document: &'a mut Document,
            id: &'a ResourceId,
        ) -> BoxFuture<'a, Result<(), BlockError>> {
            Box::pin(async move {
                self.log.borrow_mut().push(format!("{}:{id}", self.name));
                Ok(())
            })
        }

        fn is_live(&self, document: &Document) -> bool {
            self.element.is_none_or(|n| document.is_attached(n))
        }
    }

    #[tokio::test]
    async fn test_page_load_handlers_run_in_order_and_prune() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut doc = Document::parse("<div><nav/></div>").unwrap();
        let nav = doc.child_elements(doc.root())[0];

        let mut registry = HandlerRegistry::new();
        registry.register_page_load(Rc::new(PageLoadLog {
            name: "first",
            log: Rc::clone(&log),
            element: None,
        }));
        let engine = engine(registry, MockStorage::new(), ErrorMode::Strict);
        engine.on_page_load(Rc::new(PageLoadLog {
            name: "nav",
            log: Rc::clone(&log),
            element: Some(nav),
        }));

        engine.run_page_load(&mut doc, &home()).await.unwrap();
        doc.remove(nav);
        engine.run_page_load(&mut doc, &home()).await.unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["first:home_page/main", "nav:home_page/main", "first:home_page/main"]
        );
        assert_eq!(engine.page_load_count(), 1);
    }

    #[tokio::test]
    async fn test_render_page_is_detached() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_page("home_page", Handler::template("home.html"))
            .unwrap();
        let storage = MockStorage::new().with_file("home.html", "<section>Home</section>");
        let engine = engine(registry, storage, ErrorMode::Strict);
        let mut doc = Document::new();

        let page = engine.render_page(&mut doc, &home()).await.unwrap();

        assert!(!doc.is_attached(page));
        assert_eq!(doc.outer_html(page), "<section>Home</section>");
    }
}
