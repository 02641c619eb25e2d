//! Module loading contract.
//!
//! A module registers its block, page and page-load handlers while the site
//! starts, and may preload its source database.

use std::sync::Arc;

use lucid_config::{Config, ModuleConfig};
use lucid_storage::Storage;

use crate::error::BlockError;
use crate::handler::{BlockHandler, BoxFuture, Handler, PageHandler};
use crate::policy::ErrorPolicy;
use crate::registry::HandlerRegistry;

/// Everything a module may touch while loading.
pub struct LoadContext<'a> {
    pub registry: &'a mut HandlerRegistry,
    pub storage: &'a Arc<dyn Storage>,
    pub config: &'a Config,
    /// This module's `[[modules]]` entry.
    pub module: &'a ModuleConfig,
    /// Where failures that need not abort the load are reported.
    pub policy: &'a ErrorPolicy,
}

impl LoadContext<'_> {
    /// Register a block handler, reporting a rejected name through the
    /// policy. In lenient mode the module goes on with its other handlers.
    pub fn register_block(
        &mut self,
        name: &str,
        handler: Handler<dyn BlockHandler>,
    ) -> Result<(), BlockError> {
        match self.registry.register_block(name, handler) {
            Ok(()) => Ok(()),
            Err(err) => self.policy.report(err),
        }
    }

    /// Register a page handler, reporting a rejected name through the policy.
    pub fn register_page(
        &mut self,
        name: &str,
        handler: Handler<dyn PageHandler>,
    ) -> Result<(), BlockError> {
        match self.registry.register_page(name, handler) {
            Ok(()) => Ok(()),
            Err(err) => self.policy.report(err),
        }
    }
}

pub trait Module {
    /// Name matched against `[[modules]] name`.
    fn name(&self) -> &'static str;

    fn load<'a>(&'a self, cx: LoadContext<'a>) -> BoxFuture<'a, Result<(), BlockError>>;
}
