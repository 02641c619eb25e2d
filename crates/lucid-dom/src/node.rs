//! Node types: `NodeId`, `Node`, `Element`.

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a node in a [`Document`](crate::Document). Copy, stale after removal.
    pub struct NodeId;
}

/// Content stored for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element: tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::add_class`].
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(pos).1)
    }

    /// Class names in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attr("class", joined);
    }

    /// Remove `class`; returns whether it was present.
    pub fn remove_class(&mut self, class: &str) -> bool {
        if !self.has_class(class) {
            return false;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        let remaining = remaining.join(" ");
        if remaining.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", remaining);
        }
        true
    }

    /// Value of one inline style property.
    pub fn style(&self, property: &str) -> Option<&str> {
        self.attr("style")?
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .find(|(name, _)| name.trim() == property)
            .map(|(_, value)| value.trim())
    }

    /// Set one inline style property, leaving the others untouched.
    pub fn set_style(&mut self, property: &str, value: &str) {
        let mut decls = self.style_decls();
        decls.retain(|(name, _)| name != property);
        decls.push((property.to_owned(), value.to_owned()));
        self.write_style(&decls);
    }

    /// Remove one inline style property; the attribute goes when it empties.
    pub fn remove_style(&mut self, property: &str) {
        if self.style(property).is_none() {
            return;
        }
        let mut decls = self.style_decls();
        decls.retain(|(name, _)| name != property);
        self.write_style(&decls);
    }

    fn style_decls(&self) -> Vec<(String, String)> {
        self.attr("style")
            .unwrap_or_default()
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .map(|(name, v)| (name.trim().to_owned(), v.trim().to_owned()))
            .collect()
    }

    fn write_style(&mut self, decls: &[(String, String)]) {
        if decls.is_empty() {
            self.remove_attr("style");
            return;
        }
        let style = decls
            .iter()
            .map(|(name, v)| format!("{name}:{v}"))
            .collect::<Vec<_>>()
            .join(";");
        self.set_attr("style", style);
    }
}
