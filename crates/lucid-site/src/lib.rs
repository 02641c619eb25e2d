//! Site loading, page resolution and navigation for Lucid.
//!
//! This crate provides:
//! - [`Site`]: the loaded modules plus the expansion engine, rendering the
//!   page named by the current location into `#main_content`
//! - [`Navigator`]: the location signal with back/forward history
//!
//! # Quick Start
//!
//! ```ignore
//! use lucid_site::{Navigator, Site};
//!
//! let config = Config::load(None, None)?;
//! let mut navigator = Navigator::default();
//! let mut site = Site::builder(&config).build(navigator.subscribe()).await?;
//!
//! site.load_document(&mut document).await?;
//! navigator.follow("#book_page_page/books.xml/guide/intro")?;
//! site.on_location_changed(&mut document).await?;
//! ```

mod navigation;
mod site;

pub use navigation::Navigator;
pub use site::{MAIN_CONTENT_ID, OVERLAY_ID, Site, SiteBuilder, SiteError};
