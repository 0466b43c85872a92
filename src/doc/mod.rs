//! The in-memory todo document.
//!
//! A `Document` is an ordered list of named sections, each holding ordered
//! checklist items. It is ephemeral: rebuilt from the persisted Markdown on
//! every read and every mutation, never cached across requests.
//!
//! Mutations are pure in-memory transformations. Each returns the commit
//! message for the change when it applied, and `None` when the addressed
//! section or item does not exist. Addressing errors are silent no-ops and
//! leave the document untouched.

pub mod markdown;

use serde::{Deserialize, Serialize};

/// Name of the section that always exists.
pub const DEFAULT_SECTION: &str = "General";

/// A single todo entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub done: bool,
    pub text: String,
}

/// A named, ordered group of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub items: Vec<Item>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }
}

/// The full todo list: ordered sections, at least one at all times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            sections: vec![Section::new(DEFAULT_SECTION)],
        }
    }
}

impl Document {
    /// First section with the given name. Duplicate names are possible when
    /// the underlying text is malformed; the first match wins.
    fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    fn item_mut(&mut self, section: &str, index: usize) -> Option<&mut Item> {
        self.section_mut(section)?.items.get_mut(index)
    }

    /// Append a new open item to the named section.
    pub fn add_item(&mut self, section: &str, text: &str) -> Option<String> {
        let section = self.section_mut(section)?;
        section.items.push(Item {
            done: false,
            text: text.to_string(),
        });
        Some(format!("Add: {text}"))
    }

    /// Flip completion on the item at `index`.
    pub fn toggle_item(&mut self, section: &str, index: usize) -> Option<String> {
        let item = self.item_mut(section, index)?;
        item.done = !item.done;
        Some(if item.done {
            format!("Complete: {}", item.text)
        } else {
            format!("Reopen: {}", item.text)
        })
    }

    /// Replace the text of the item at `index`.
    pub fn edit_item(&mut self, section: &str, index: usize, text: &str) -> Option<String> {
        let item = self.item_mut(section, index)?;
        let old = std::mem::replace(&mut item.text, text.to_string());
        Some(format!("Edit: \"{old}\" → \"{text}\""))
    }

    /// Remove the item at `index`; later items shift down.
    pub fn remove_item(&mut self, section: &str, index: usize) -> Option<String> {
        let section = self.section_mut(section)?;
        if index >= section.items.len() {
            return None;
        }
        let removed = section.items.remove(index);
        Some(format!("Remove: {}", removed.text))
    }

    /// Append a new empty section unless the name is already taken.
    pub fn add_section(&mut self, name: &str) -> Option<String> {
        if self.sections.iter().any(|s| s.name == name) {
            return None;
        }
        self.sections.push(Section::new(name));
        Some(format!("Add section: {name}"))
    }

    /// Remove every section matching `name`. If nothing is left afterwards,
    /// the default section is reinserted so the document never goes empty.
    pub fn remove_section(&mut self, name: &str) -> Option<String> {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != name);
        if self.sections.len() == before {
            return None;
        }
        if self.sections.is_empty() {
            self.sections.push(Section::new(DEFAULT_SECTION));
        }
        Some(format!("Remove section: {name}"))
    }
}
