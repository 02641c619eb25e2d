//! Table of contents block shared by the Book and Menu modules.

use std::rc::Rc;

use lucid_blocks::{ArgSpec, BlockContext, BlockError, BlockHandler, BoxFuture, ResourceId};
use lucid_dom::NodeId;

use crate::forest::{ForestSource, Reselect};
use crate::views::{ContentsOptions, Family, contents_view};

/// Argument class names of a contents block.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContentsArgs {
    pub id: &'static str,
    pub num_columns: &'static str,
    pub max_level: &'static str,
    pub expand_level: &'static str,
    pub expandable: &'static str,
    pub selected: &'static str,
}

impl ContentsArgs {
    fn schema(&self) -> [ArgSpec; 6] {
        [
            ArgSpec::required(self.id),
            ArgSpec::optional(self.num_columns),
            ArgSpec::optional(self.max_level),
            ArgSpec::optional(self.expand_level),
            ArgSpec::optional(self.expandable),
            ArgSpec::optional(self.selected),
        ]
    }
}

/// Replaces the block with the table of contents of the node named by its
/// id argument.
///
/// Without a selected-id argument the ambient page is selected. The table
/// follows later page loads through a [`Reselect`] handler.
pub(crate) struct ContentsBlock {
    pub forests: ForestSource,
    pub family: Family,
    pub args: ContentsArgs,
}

impl BlockHandler for ContentsBlock {
    fn expand<'a>(
        &'a self,
        mut cx: BlockContext<'a>,
    ) -> BoxFuture<'a, Result<Option<NodeId>, BlockError>> {
        Box::pin(async move {
            let names = self.args;
            let args = cx.arguments(&names.schema())?;
            let id = ResourceId::parse(args.text(names.id).unwrap_or_default())?;
            let columns = args.parsed::<usize>(names.num_columns)?;
            if columns == Some(0) {
                return Err(BlockError::InvalidArgument {
                    name: names.num_columns.to_owned(),
                    message: "must be at least 1".to_owned(),
                });
            }
            let selected = match args.text(names.selected) {
                Some(text) if !text.is_empty() => ResourceId::parse(text)?,
                _ => cx.id.clone(),
            };
            let options = ContentsOptions {
                expand_depth: args.parsed(names.expand_level)?.unwrap_or(usize::MAX),
                max_depth: args.parsed(names.max_level)?.unwrap_or(usize::MAX),
                expandable: args.flag(names.expandable),
                selected: Some(selected),
                columns: columns.unwrap_or(1),
            };

            let (tree, idx) = self.forests.resolve(cx.engine, &id).await?;
            let contents = contents_view(cx.document, &tree, &self.family, idx, &options);
            cx.replace_with(contents);
            cx.on_page_load(Rc::new(Reselect {
                contents,
                tree,
                family: self.family,
            }));
            Ok(Some(contents))
        })
    }
}
