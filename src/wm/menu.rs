//! Client Menu Model
//!
//! The per-workspace window-list menu as a plain model: a label plus the
//! member titles in window-number order. The widget that draws it lives
//! outside the core and repaints whenever `update` is called.

use tracing::debug;

#[derive(Debug, Default)]
pub struct ClientMenu {
    label: String,
    items: Vec<String>,
    dirty: bool,
}

impl ClientMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a window title. Entries track window numbers, so insertion
    /// order is membership order.
    pub fn insert(&mut self, title: &str) {
        self.items.push(title.to_owned());
        self.dirty = true;
    }

    /// Remove the entry at `index` (the departing window's number).
    pub fn remove(&mut self, index: usize) {
        assert!(
            index < self.items.len(),
            "menu index {} out of range ({} entries)",
            index,
            self.items.len()
        );
        self.items.remove(index);
        self.dirty = true;
    }

    /// Refresh hook for the rendering layer.
    pub fn update(&mut self) {
        if self.dirty {
            debug!("Menu '{}' refreshed with {} entries", self.label, self.items.len());
        }
        self.dirty = false;
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_owned();
        self.dirty = true;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn needs_update(&self) -> bool {
        self.dirty
    }
}
