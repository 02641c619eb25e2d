//! Location signal and navigation history.
//!
//! The location is the URL fragment of the current page (`#type/seg/...`),
//! held in a [`tokio::sync::watch`] channel. [`Navigator`] is the only writer;
//! a [`Site`](crate::Site) subscribes and renders whenever it changes.
//! Navigating never renders directly, so programmatic navigation and
//! back/forward share one render path.

use lucid_blocks::{BlockError, ResourceId};
use tokio::sync::watch;

/// Writes the location and keeps the back/forward history.
#[derive(Debug)]
pub struct Navigator {
    location: watch::Sender<String>,
    back: Vec<String>,
    forward: Vec<String>,
}

impl Navigator {
    /// Navigator starting at `initial` (a fragment, possibly empty).
    pub fn new(initial: impl Into<String>) -> Self {
        let (location, _) = watch::channel(initial.into());
        Self {
            location,
            back: Vec::new(),
            forward: Vec::new(),
        }
    }

    /// Receiver of location changes. The current location counts as seen.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.location.subscribe()
    }

    /// Current location.
    pub fn location(&self) -> String {
        self.location.borrow().clone()
    }

    /// Move to `id`. Returns `false` if it is already the current page.
    ///
    /// The forward history is discarded.
    pub fn navigate(&mut self, id: &ResourceId) -> bool {
        let url = id.content_url();
        if *self.location.borrow() == url {
            return false;
        }
        tracing::debug!(%id, "Navigating");
        let previous = self.location.send_replace(url);
        self.back.push(previous);
        self.forward.clear();
        true
    }

    /// Navigate to the target of an internal link.
    pub fn follow(&mut self, href: &str) -> Result<bool, BlockError> {
        if !href.starts_with('#') {
            return Err(BlockError::InvalidId(href.to_owned()));
        }
        let id = ResourceId::parse(href)?;
        Ok(self.navigate(&id))
    }

    /// Return to the previous location, if any.
    pub fn back(&mut self) -> bool {
        let Some(previous) = self.back.pop() else {
            return false;
        };
        let current = self.location.send_replace(previous);
        self.forward.push(current);
        true
    }

    /// Undo the last [`back`](Self::back), if any.
    pub fn forward(&mut self) -> bool {
        let Some(next) = self.forward.pop() else {
            return false;
        };
        let current = self.location.send_replace(next);
        self.back.push(current);
        true
    }

    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn id(s: &str) -> ResourceId {
        ResourceId::parse(s).unwrap()
    }

    #[test]
    fn test_navigate_updates_location() {
        let mut nav = Navigator::default();
        let rx = nav.subscribe();

        assert!(nav.navigate(&id("book_page_page/a/b")));

        assert_eq!(nav.location(), "#book_page_page/a/b");
        assert!(rx.has_changed().unwrap());
        assert!(nav.can_go_back());
    }

    #[test]
    fn test_navigate_to_current_page_is_inert() {
        let mut nav = Navigator::new("#home_page");
        let rx = nav.subscribe();

        assert!(!nav.navigate(&id("home_page")));

        assert!(!rx.has_changed().unwrap());
        assert!(!nav.can_go_back());
    }

    #[test]
    fn test_back_and_forward() {
        let mut nav = Navigator::new("#home_page");
        nav.navigate(&id("a_page"));
        nav.navigate(&id("b_page"));

        assert!(nav.back());
        assert_eq!(nav.location(), "#a_page");
        assert!(nav.back());
        assert_eq!(nav.location(), "#home_page");
        assert!(!nav.back());

        assert!(nav.forward());
        assert_eq!(nav.location(), "#a_page");
        assert!(nav.can_go_forward());
    }

    #[test]
    fn test_navigate_discards_forward_history() {
        let mut nav = Navigator::new("#home_page");
        nav.navigate(&id("a_page"));
        nav.back();

        nav.navigate(&id("c_page"));

        assert!(!nav.can_go_forward());
        assert!(!nav.forward());
        assert_eq!(nav.location(), "#c_page");
    }

    #[test]
    fn test_follow_internal_link() {
        let mut nav = Navigator::default();
        assert!(nav.follow("#menu_leaf_page/menu.xml/x").unwrap());
        assert_eq!(nav.location(), "#menu_leaf_page/menu.xml/x");
    }

    #[test]
    fn test_follow_rejects_external_link() {
        let mut nav = Navigator::default();
        let err = nav.follow("https://example.com/").unwrap_err();
        assert!(matches!(err, BlockError::InvalidId(_)));
        assert_eq!(nav.location(), "");
    }

    #[test]
    fn test_receiver_closes_when_navigator_dropped() {
        let nav = Navigator::default();
        let rx = nav.subscribe();
        drop(nav);
        assert!(rx.has_changed().is_err());
    }
}
