//! Template module: page layouts nested inside section layouts.
//!
//! ```xml
//! <templates>
//!   <section>
//!     <name>site</name>
//!     <url>templates/site.html</url>
//!     <content>
//!       <page><name>home</name><url>templates/home.html</url></page>
//!     </content>
//!   </section>
//! </templates>
//! ```
//!
//! Rendering `template_page/{url}/site/home` fetches `home.html`, then wraps
//! it in every ancestor section, nearest first. A section template marks
//! where the inner element goes with a `template_hole_block` and may show
//! its own id through `template_id_block`s.

use std::sync::Arc;

use lucid_blocks::{
    BlockError, BoxFuture, Handler, LoadContext, Module, PageContext, PageHandler,
};
use lucid_dom::{Document, NodeId};

use crate::cache::ForestCache;
use crate::forest::ForestSource;
use crate::source::{ParseError, ParseReport, Schema, parse_forest};
use crate::tree::{ContentTree, FlatEntry, NodeKind};

pub const SECTION_TYPE: &str = "template_section";
pub const PAGE_TYPE: &str = "template_page";

pub const ID_BLOCK: &str = "template_id_block";
pub const HOLE_BLOCK: &str = "template_hole_block";

/// Template list loaded when the module entry names no URL.
pub const DEFAULT_TEMPLATES_URL: &str = "modules/template/templates.xml";

fn template_entry(tag: &str, top: bool) -> Option<(NodeKind, &'static str)> {
    match (tag, top) {
        ("section", true) => Some((NodeKind::Root, SECTION_TYPE)),
        ("section", false) => Some((NodeKind::Section, SECTION_TYPE)),
        ("page", _) => Some((NodeKind::Leaf, PAGE_TYPE)),
        _ => None,
    }
}

const SCHEMA: Schema = Schema {
    root: "templates",
    container: "content",
    entry: template_entry,
};

/// Parse a template list fetched from `url`.
pub fn parse_templates(url: &str, source: &str) -> Result<ParseReport, ParseError> {
    parse_forest(url, source, &SCHEMA, &|fields, node| {
        let template = fields.required("url")?;
        let title = fields.text("title").unwrap_or_else(|| node.name.clone());
        Ok(node.with_title(title).with_template(template))
    })
}

/// A loaded template forest.
#[derive(Debug, Clone)]
pub struct TemplateForest {
    tree: Arc<ContentTree>,
}

impl TemplateForest {
    pub fn new(tree: Arc<ContentTree>) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    /// Every section and page template, in document order.
    pub fn templates(&self) -> Vec<FlatEntry> {
        self.tree.flatten()
    }
}

/// Registers the `template_page` page type.
pub struct TemplateModule {
    cache: Arc<ForestCache>,
}

impl TemplateModule {
    pub fn new(cache: Arc<ForestCache>) -> Self {
        Self { cache }
    }
}

impl Module for TemplateModule {
    fn name(&self) -> &'static str {
        "template"
    }

    fn load<'a>(&'a self, mut cx: LoadContext<'a>) -> BoxFuture<'a, Result<(), BlockError>> {
        Box::pin(async move {
            let forests = ForestSource::new(Arc::clone(&self.cache), parse_templates);
            let module = cx.module;
            let url = module.url.as_deref().unwrap_or(DEFAULT_TEMPLATES_URL);
            forests.preload(cx.storage.as_ref(), url, cx.policy).await?;

            cx.register_page(PAGE_TYPE, Handler::page(TemplatePage { forests }))?;
            tracing::info!(url, "Loaded template module");
            Ok(())
        })
    }
}

struct TemplatePage {
    forests: ForestSource,
}

impl PageHandler for TemplatePage {
    fn render<'a>(&'a self, mut cx: PageContext<'a>) -> BoxFuture<'a, Result<NodeId, BlockError>> {
        Box::pin(async move {
            let (tree, idx) = self.forests.resolve(cx.engine, cx.id).await?;
            let mut element = fetch_template(&mut cx, &tree, idx).await?;
            for section in tree.ancestors(idx).into_iter().rev() {
                // fragments fetched so far are detached; drop them on failure
                let wrapper = match fetch_template(&mut cx, &tree, section).await {
                    Ok(wrapper) => wrapper,
                    Err(err) => {
                        cx.document.remove(element);
                        return Err(err);
                    }
                };
                if let Err(err) = fill_section(cx.document, &tree, section, wrapper, element) {
                    cx.document.remove(wrapper);
                    cx.document.remove(element);
                    return Err(err);
                }
                element = wrapper;
            }
            Ok(element)
        })
    }
}

/// Fetch the template of `idx`, tagged with its type, id and level.
async fn fetch_template(
    cx: &mut PageContext<'_>,
    tree: &ContentTree,
    idx: usize,
) -> Result<NodeId, BlockError> {
    let node = tree.node(idx);
    let url = node
        .template
        .as_deref()
        .ok_or_else(|| BlockError::UnknownResource(node.id.to_string()))?;
    let element = cx.fetch_fragment(url).await?;
    cx.document.add_class(element, node.id.kind());
    cx.document
        .set_attr(element, "data-template-id", node.id.to_string());
    cx.document
        .set_attr(element, "data-template-level", tree.level(idx).to_string());
    Ok(element)
}

/// Put the section id into `section`'s id blocks and `inner` into its hole.
fn fill_section(
    document: &mut Document,
    tree: &ContentTree,
    idx: usize,
    section: NodeId,
    inner: NodeId,
) -> Result<(), BlockError> {
    let id = tree.node(idx).id.to_string();
    for block in document.find_by_class(section, ID_BLOCK) {
        let text = document.create_text(id.clone());
        document.replace_with(block, text);
    }
    let hole = document
        .find_by_class(section, HOLE_BLOCK)
        .into_iter()
        .next()
        .ok_or_else(|| BlockError::Content {
            url: tree.node(idx).template.clone().unwrap_or_default(),
            message: format!("section template of '{id}' has no {HOLE_BLOCK}"),
        })?;
    document.replace_with(hole, inner);
    Ok(())
}

#[cfg(test)]
mod tests {
    use lucid_blocks::{BlockEngine, EngineConfig, ErrorPolicy, HandlerRegistry, ResourceId};
    use lucid_config::{Config, ErrorMode, ModuleConfig};
    use lucid_storage::{MockStorage, Storage};
    use pretty_assertions::assert_eq;

    use super::*;

    const TEMPLATES: &str = r"<templates>
  <section>
    <name>site</name>
    <url>t/site.html</url>
    <content>
      <section>
        <name>docs</name>
        <url>t/docs.html</url>
        <content>
          <page><name>article</name><url>t/article.html</url></page>
        </content>
      </section>
      <page><name>home</name><title>Home</title><url>t/home.html</url></page>
    </content>
  </section>
  <page><name>bare</name><url>t/bare.html</url></page>
</templates>";

    const URL: &str = "templates.xml";

    fn id(s: &str) -> ResourceId {
        ResourceId::parse(s).unwrap()
    }

    fn storage() -> MockStorage {
        MockStorage::new()
            .with_file(URL, TEMPLATES)
            .with_file(
                "t/site.html",
                r#"<body><header><span class="template_id_block"/></header><div class="template_hole_block"/></body>"#,
            )
            .with_file(
                "t/docs.html",
                r#"<main><nav class="template_id_block"/><div class="template_hole_block"/></main>"#,
            )
            .with_file("t/article.html", "<article><p>text</p></article>")
            .with_file("t/home.html", "<section>home</section>")
            .with_file("t/bare.html", "<div>bare</div>")
    }

    async fn engine(storage: MockStorage, mode: ErrorMode) -> BlockEngine {
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let mut config = Config::default();
        config.error_mode = mode;
        let module = ModuleConfig {
            name: "template".to_owned(),
            enabled: true,
            url: Some(URL.to_owned()),
        };
        let policy = ErrorPolicy::new(mode);
        let mut registry = HandlerRegistry::new();
        TemplateModule::new(Arc::new(ForestCache::new()))
            .load(LoadContext {
                registry: &mut registry,
                storage: &storage,
                config: &config,
                module: &module,
                policy: &policy,
            })
            .await
            .unwrap();
        BlockEngine::new(registry, storage, EngineConfig::default().with_error_mode(mode))
    }

    async fn render(engine: &BlockEngine, page: &str) -> Result<String, BlockError> {
        let mut doc = Document::new();
        let element = engine.render_page(&mut doc, &id(page)).await?;
        Ok(doc.outer_html(element))
    }

    #[test]
    fn test_parse_templates() {
        let report = parse_templates(URL, TEMPLATES).unwrap();
        assert!(report.errors.is_empty());
        let forest = TemplateForest::new(Arc::new(report.tree));
        let templates = forest.templates();
        let ids: Vec<_> = templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "template_section/templates.xml/site",
                "template_section/templates.xml/site/docs",
                "template_page/templates.xml/site/docs/article",
                "template_page/templates.xml/site/home",
                "template_page/templates.xml/bare",
            ]
        );
        assert_eq!(templates[2].level, 3);
        assert_eq!(templates[3].title, "Home");
        assert_eq!(templates[4].title, "bare");
        assert_eq!(forest.tree().node(2).template.as_deref(), Some("t/article.html"));
    }

    #[test]
    fn test_template_without_url_is_skipped() {
        let report = parse_templates(
            URL,
            "<templates><page><name>a</name></page><page><name>b</name><url>b.html</url></page></templates>",
        )
        .unwrap();
        assert_eq!(report.tree.len(), 1);
        assert!(matches!(
            report.errors[0],
            ParseError::MissingField { field: "url", .. }
        ));
    }

    #[tokio::test]
    async fn test_page_folds_through_sections() {
        let engine = engine(storage(), ErrorMode::Strict).await;
        let html = render(&engine, "template_page/templates.xml/site/docs/article")
            .await
            .unwrap();
        assert_eq!(
            html,
            concat!(
                r#"<body class="template_section" data-template-id="template_section/templates.xml/site" data-template-level="1">"#,
                "<header>template_section/templates.xml/site</header>",
                r#"<main class="template_section" data-template-id="template_section/templates.xml/site/docs" data-template-level="2">"#,
                "template_section/templates.xml/site/docs",
                r#"<article class="template_page" data-template-id="template_page/templates.xml/site/docs/article" data-template-level="3"><p>text</p></article>"#,
                "</main></body>"
            )
        );
    }

    #[tokio::test]
    async fn test_top_level_page_is_not_wrapped() {
        let engine = engine(storage(), ErrorMode::Strict).await;
        let html = render(&engine, "template_page/templates.xml/bare").await.unwrap();
        assert_eq!(
            html,
            r#"<div class="template_page" data-template-id="template_page/templates.xml/bare" data-template-level="1">bare</div>"#
        );
    }

    #[tokio::test]
    async fn test_section_without_hole_fails() {
        let storage = storage().with_file("t/site.html", "<body><header/></body>");
        let engine = engine(storage, ErrorMode::Strict).await;
        let err = render(&engine, "template_page/templates.xml/site/home")
            .await
            .unwrap_err();
        assert!(matches!(err, BlockError::Content { ref url, .. } if url == "t/site.html"));
    }

    #[tokio::test]
    async fn test_failed_fold_leaves_no_fragments_behind() {
        let storage = storage().with_file("t/site.html", "<body><header/></body>");
        let engine = engine(storage, ErrorMode::Strict).await;
        let mut doc = Document::parse("<div><p>kept</p></div>").unwrap();
        let before = doc.len();

        let result = engine
            .render_page(&mut doc, &id("template_page/templates.xml/site/docs/article"))
            .await;

        assert!(matches!(result, Err(BlockError::Content { .. })));
        assert_eq!(doc.len(), before);
        assert_eq!(doc.outer_html(doc.root()), "<div><p>kept</p></div>");
    }

    #[tokio::test]
    async fn test_missing_section_template_drops_fetched_page() {
        let storage = MockStorage::new()
            .with_file(URL, TEMPLATES)
            .with_file("t/article.html", "<article><p>text</p></article>");
        let engine = engine(storage, ErrorMode::Strict).await;
        let mut doc = Document::new();
        let before = doc.len();

        let err = engine
            .render_page(&mut doc, &id("template_page/templates.xml/site/docs/article"))
            .await
            .unwrap_err();

        assert!(matches!(err, BlockError::Fetch { ref url, .. } if url == "t/docs.html"));
        assert_eq!(doc.len(), before);
    }

    #[tokio::test]
    async fn test_missing_page_template_is_fetch_error() {
        let storage = MockStorage::new().with_file(URL, TEMPLATES);
        let engine = engine(storage, ErrorMode::Strict).await;
        let err = render(&engine, "template_page/templates.xml/bare")
            .await
            .unwrap_err();
        assert!(matches!(err, BlockError::Fetch { ref url, .. } if url == "t/bare.html"));
    }

    #[tokio::test]
    async fn test_unknown_template_id() {
        let engine = engine(storage(), ErrorMode::Strict).await;
        let err = render(&engine, "template_page/templates.xml/site/nope")
            .await
            .unwrap_err();
        assert!(matches!(err, BlockError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_page_block_expands_template_page() {
        let engine = engine(storage(), ErrorMode::Strict).await;
        let mut doc = Document::parse(
            r#"<div><span class="core_page_block">template_page/templates.xml/bare</span></div>"#,
        )
        .unwrap();
        let root = doc.root();
        engine
            .expand(&mut doc, Some(root), &id("home_page"))
            .await
            .unwrap();
        assert_eq!(
            doc.outer_html(doc.root()),
            r#"<div><div class="template_page" data-template-id="template_page/templates.xml/bare" data-template-level="1" style="opacity:1">bare</div></div>"#
        );
    }
}
