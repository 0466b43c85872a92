//! Markdown codec for the persisted document.
//!
//! The grammar is line-oriented and two-token: `## <name>` opens a section,
//! `- [ ] <text>` / `- [x] <text>` appends an item to the current section.
//! Every other line is insignificant. The parser never fails: malformed
//! input degrades to whatever sections and items it can recognize, and an
//! input with no recognizable section yields the default one.
//!
//! Known fidelity boundary: item text that itself matches the checklist or
//! heading syntax (say, an item whose text starts with `[ ] `) will not
//! survive a round trip intact. That is inherent to the grammar, not
//! something the codec tries to repair.

use super::{DEFAULT_SECTION, Document, Item, Section};

const TITLE_LINE: &str = "# Todo List";

/// One line of source text, classified.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    /// `## <name>` with a non-empty trimmed name.
    Heading(&'a str),
    /// `- [ ] <text>` or `- [x] <text>`, marker case-insensitive.
    Entry { done: bool, text: &'a str },
    /// Anything else, ignored.
    Other,
}

fn classify(line: &str) -> Line<'_> {
    if let Some(rest) = line.strip_prefix("## ") {
        let name = rest.trim();
        if !name.is_empty() {
            return Line::Heading(name);
        }
        return Line::Other;
    }

    if let Some(rest) = line.strip_prefix("- [")
        && let Some((marker, tail)) = split_first_char(rest)
        && matches!(marker, ' ' | 'x' | 'X')
        && let Some(text) = tail.strip_prefix("] ")
    {
        return Line::Entry {
            done: marker != ' ',
            text: text.trim(),
        };
    }

    Line::Other
}

fn split_first_char(s: &str) -> Option<(char, &str)> {
    let mut chars = s.chars();
    let first = chars.next()?;
    Some((first, chars.as_str()))
}

/// Parse source text into a document.
///
/// Items before the first heading are dropped. A scan that produces no
/// sections at all yields a single empty default section.
pub fn parse(text: &str) -> Document {
    let mut sections: Vec<Section> = Vec::new();

    for line in text.lines() {
        match classify(line) {
            Line::Heading(name) => sections.push(Section::new(name)),
            Line::Entry { done, text } => {
                if let Some(current) = sections.last_mut() {
                    current.items.push(Item {
                        done,
                        text: text.to_string(),
                    });
                }
            }
            Line::Other => {}
        }
    }

    if sections.is_empty() {
        sections.push(Section::new(DEFAULT_SECTION));
    }

    Document { sections }
}

/// Render a document back to its persisted text form.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::from(TITLE_LINE);
    out.push('\n');

    for section in &doc.sections {
        out.push('\n');
        out.push_str("## ");
        out.push_str(&section.name);
        out.push_str("\n\n");
        for item in &section.items {
            out.push_str(if item.done { "- [x] " } else { "- [ ] " });
            out.push_str(&item.text);
            out.push('\n');
        }
    }

    out
}
