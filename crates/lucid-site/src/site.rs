//! Site session: module loading, document load and page swaps.
//!
//! # Architecture
//!
//! [`SiteBuilder`] loads the enabled modules into one [`HandlerRegistry`]
//! and freezes it inside a [`BlockEngine`]. The resulting [`Site`] then:
//! - expands the whole document once ([`Site::load_document`])
//! - renders a new page into `#main_content` whenever the location changes
//!   ([`Site::on_location_changed`], driven by [`Site::run`])
//!
//! # Example
//!
//! ```ignore
//! let mut navigator = Navigator::default();
//! let mut site = Site::builder(&config).build(navigator.subscribe()).await?;
//!
//! let mut document = Document::parse(&index_html)?;
//! site.load_document(&mut document).await?;
//!
//! navigator.navigate(&ResourceId::parse("book_page_page/books.xml/guide/intro")?);
//! site.on_location_changed(&mut document).await?;
//! ```

use std::sync::Arc;

use lucid_blocks::{
    BlockEngine, BlockError, CoreModule, EngineConfig, ErrorPolicy, HandlerRegistry, LoadContext,
    Module, ResourceId,
};
use lucid_config::Config;
use lucid_content::{BookModule, ContentTree, ForestCache, MenuModule, TemplateModule};
use lucid_dom::Document;
use lucid_storage::{FsStorage, Storage};
use tokio::sync::watch;

/// Id of the element pages are swapped into.
pub const MAIN_CONTENT_ID: &str = "main_content";

/// Id of the loading overlay removed after the first expansion.
pub const OVERLAY_ID: &str = "overlay";

/// Error returned when loading or driving a site fails.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// A `[[modules]]` entry names no known module.
    #[error("unknown module '{0}'")]
    UnknownModule(String),
    /// Neither the location nor the settings name a page.
    #[error("no page to show: the location is empty and no default id is set")]
    NoPage,
    /// A required element is missing from the document.
    #[error("the document has no element with id '{0}'")]
    MissingElement(&'static str),
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// Builder for [`Site`].
pub struct SiteBuilder<'a> {
    config: &'a Config,
    storage: Option<Arc<dyn Storage>>,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            storage: None,
        }
    }

    /// Fetch fragments from `storage` instead of the configured directory.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Load every enabled module and create the site.
    ///
    /// Load failures are reported through the configured error mode. In
    /// lenient mode a handler whose name is taken is dropped while the rest
    /// of its module registers, and a module whose database fails to load
    /// runs without it.
    pub async fn build(self, location: watch::Receiver<String>) -> Result<Site, SiteError> {
        let config = self.config;
        let storage = self.storage.unwrap_or_else(|| {
            Arc::new(FsStorage::new(config.storage_resolved.root.clone())) as Arc<dyn Storage>
        });
        let default_id = config
            .default_id
            .as_deref()
            .map(ResourceId::parse)
            .transpose()?;

        let cache = Arc::new(ForestCache::new());
        let policy = ErrorPolicy::new(config.error_mode);
        let mut registry = HandlerRegistry::new();
        let mut modules = Vec::new();
        for entry in config.enabled_modules() {
            let module: Box<dyn Module> = match entry.name.as_str() {
                "core" => Box::new(CoreModule),
                "book" => Box::new(BookModule::new(Arc::clone(&cache))),
                "menu" => Box::new(MenuModule::new(Arc::clone(&cache))),
                "template" => Box::new(TemplateModule::new(Arc::clone(&cache))),
                other => return Err(SiteError::UnknownModule(other.to_owned())),
            };
            let loaded = module
                .load(LoadContext {
                    registry: &mut registry,
                    storage: &storage,
                    config,
                    module: &entry,
                    policy: &policy,
                })
                .await;
            match loaded {
                Ok(()) => modules.push(module.name()),
                Err(err) => policy.report(err)?,
            }
        }
        tracing::info!(?modules, "Loaded modules");

        let engine = BlockEngine::new(registry, storage, EngineConfig::from_config(config));
        Ok(Site {
            engine,
            cache,
            default_id,
            location,
            modules,
            load_warnings: policy.take_warnings(),
        })
    }
}

/// A loaded site bound to one location signal.
pub struct Site {
    engine: BlockEngine,
    cache: Arc<ForestCache>,
    default_id: Option<ResourceId>,
    location: watch::Receiver<String>,
    modules: Vec<&'static str>,
    load_warnings: Vec<String>,
}

impl Site {
    pub fn builder(config: &Config) -> SiteBuilder<'_> {
        SiteBuilder::new(config)
    }

    pub fn engine(&self) -> &BlockEngine {
        &self.engine
    }

    /// Names of the modules that loaded, in load order.
    pub fn modules(&self) -> &[&'static str] {
        &self.modules
    }

    /// Content forest loaded from `url`, if any module loaded it.
    pub fn forest(&self, url: &str) -> Option<Arc<ContentTree>> {
        self.cache.get(url)
    }

    /// Every failure reported in lenient mode, module loading first.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = self.load_warnings.clone();
        warnings.extend(self.engine.warnings());
        warnings
    }

    /// Page named by the location, or the default page when it is empty.
    pub fn current_id(&self) -> Result<ResourceId, SiteError> {
        let location = self.location.borrow();
        let fragment = location.trim().trim_start_matches('#');
        if fragment.is_empty() {
            return self.default_id.clone().ok_or(SiteError::NoPage);
        }
        Ok(ResourceId::parse(fragment)?)
    }

    /// Expand the whole document under the current page id.
    ///
    /// The loading overlay, if present, is removed afterwards.
    pub async fn load_document(&mut self, document: &mut Document) -> Result<(), SiteError> {
        self.location.mark_unchanged();
        let id = self.current_id()?;
        let root = document.root();
        self.engine.expand(document, Some(root), &id).await?;
        if let Some(overlay) = document.get_element_by_id(OVERLAY_ID) {
            document.remove(overlay);
        }
        tracing::info!(%id, "Loaded document");
        Ok(())
    }

    /// Render the page named by the location into `#main_content`.
    ///
    /// The page is rendered detached, attached hidden (`opacity:0`),
    /// expanded under its own id, followed by every page-load handler and
    /// then revealed with the scroll position reset. If the location holds
    /// no valid id, or the page cannot be rendered, the failure is reported
    /// and the current page stays.
    pub async fn on_location_changed(&mut self, document: &mut Document) -> Result<(), SiteError> {
        self.location.mark_unchanged();
        let id = match self.current_id() {
            Ok(id) => id,
            Err(SiteError::Block(err)) => {
                self.engine.report(err)?;
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let main = document
            .get_element_by_id(MAIN_CONTENT_ID)
            .ok_or(SiteError::MissingElement(MAIN_CONTENT_ID))?;

        let page = match self.engine.render_page(document, &id).await {
            Ok(page) => page,
            Err(err) => {
                self.engine.report(err)?;
                return Ok(());
            }
        };
        document.set_style(page, "opacity", "0");
        document.clear_children(main);
        document.append_child(main, page);

        self.engine.expand(document, Some(page), &id).await?;
        self.engine.run_page_load(document, &id).await?;

        document.set_style(page, "opacity", "1");
        document.set_scroll_top(0);
        tracing::info!(%id, "Loaded page");
        Ok(())
    }

    /// Render every location change until the navigator is dropped.
    ///
    /// Changes that arrive while a page renders are coalesced into the
    /// latest location.
    pub async fn run(&mut self, document: &mut Document) -> Result<(), SiteError> {
        while self.location.changed().await.is_ok() {
            self.on_location_changed(document).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("modules", &self.modules)
            .field("default_id", &self.default_id)
            .field("location", &*self.location.borrow())
            .finish_non_exhaustive()
    }
}
