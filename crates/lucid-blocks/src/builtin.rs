//! Core blocks: internal links and template includes.

use lucid_dom::NodeId;

use crate::context::BlockContext;
use crate::error::BlockError;
use crate::handler::{BlockHandler, BoxFuture, Handler};
use crate::id::ResourceId;
use crate::module::{LoadContext, Module};

/// Class added to links that navigate inside the site.
pub const LINK_CLASS: &str = "core_link";

/// Registers `core_link_block` and `core_template_block`.
#[derive(Debug, Default)]
pub struct CoreModule;

impl Module for CoreModule {
    fn name(&self) -> &'static str {
        "core"
    }

    fn load<'a>(&'a self, mut cx: LoadContext<'a>) -> BoxFuture<'a, Result<(), BlockError>> {
        Box::pin(async move {
            cx.register_block("core_link_block", Handler::block(LinkBlock))?;
            cx.register_block("core_template_block", Handler::block(TemplateBlock))?;
            Ok(())
        })
    }
}

/// Turns an element into an internal link.
///
/// The target comes from an existing `#id` href or, without one, from the
/// element text. The element stays in place and is expanded again so further
/// block classes on it still apply.
struct LinkBlock;

impl BlockHandler for LinkBlock {
    fn expand<'a>(
        &'a self,
        mut cx: BlockContext<'a>,
    ) -> BoxFuture<'a, Result<Option<NodeId>, BlockError>> {
        Box::pin(async move {
            let target = match cx.document.attr(cx.element, "href") {
                Some(href) if !href.starts_with('#') => {
                    return Err(BlockError::InvalidId(href.to_owned()));
                }
                Some(href) => ResourceId::parse(href)?,
                None => ResourceId::parse(&cx.text())?,
            };
            cx.document
                .set_attr(cx.element, "href", target.content_url());
            cx.document.add_class(cx.element, LINK_CLASS);
            Ok(Some(cx.element))
        })
    }
}

/// Replaces the element with the template whose URL is its text.
struct TemplateBlock;

impl BlockHandler for TemplateBlock {
    fn expand<'a>(
        &'a self,
        mut cx: BlockContext<'a>,
    ) -> BoxFuture<'a, Result<Option<NodeId>, BlockError>> {
        Box::pin(async move {
            let url = cx.text();
            if url.is_empty() {
                return Err(BlockError::InvalidArgument {
                    name: "core_template_block".to_owned(),
                    message: "template URL is empty".to_owned(),
                });
            }
            cx.replace_with_template(&url).await.map(Some)
        })
    }
}
