//! Section navigation: active section, chapter-relative position and
//! linear previous/next traversal over the flattened document order.

use std::fmt;

use super::content::{Book, Section};

/// Reserved identifier for the table-of-contents view
pub const TOC_ID: &str = "toc";

/// What the reader is looking at
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    TableOfContents,
    Section(String),
}

impl Location {
    pub fn from_id(id: &str) -> Self {
        if id == TOC_ID {
            Self::TableOfContents
        } else {
            Self::Section(id.to_string())
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::TableOfContents => TOC_ID,
            Self::Section(id) => id,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Position of the active section inside its chapter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterPosition {
    pub chapter_index: usize,
    pub chapter_title: String,
    /// 0-based index within the chapter
    pub index: usize,
    pub sibling_count: usize,
}

/// Result of resolving a location against the book
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub active: Option<&'a Section>,
    pub position: Option<ChapterPosition>,
    pub previous: Option<Location>,
    pub next: Option<Location>,
}

pub struct Navigation;

impl Navigation {
    /// Resolve `location` to the active section and its neighbours.
    ///
    /// Unknown ids fall back to the first section of the book. The first
    /// section's predecessor is the table of contents; the last section
    /// has no successor.
    pub fn resolve<'a>(book: &'a Book, location: &Location) -> Resolved<'a> {
        let id = match location {
            Location::TableOfContents => {
                return Resolved {
                    active: None,
                    position: None,
                    previous: None,
                    next: book.first_section().map(|s| Location::Section(s.id.clone())),
                };
            }
            Location::Section(id) => id,
        };

        let flat: Vec<&Section> = book.sections().collect();
        let index = match flat.iter().position(|section| section.id == *id) {
            Some(index) => index,
            None => {
                tracing::debug!(section_id = %id, "Unknown section, falling back to first section");
                0
            }
        };

        let Some(active) = flat.get(index).copied() else {
            return Resolved { active: None, position: None, previous: None, next: None };
        };

        let position = book.locate(&active.id).map(|(chapter_index, index)| {
            let chapter = &book.chapters[chapter_index];
            ChapterPosition {
                chapter_index,
                chapter_title: chapter.title.clone(),
                index,
                sibling_count: chapter.sections.len(),
            }
        });

        let previous = if index == 0 {
            Some(Location::TableOfContents)
        } else {
            Some(Location::Section(flat[index - 1].id.clone()))
        };
        let next = flat.get(index + 1).map(|s| Location::Section(s.id.clone()));

        Resolved { active: Some(active), position, previous, next }
    }

    pub fn previous(book: &Book, location: &Location) -> Option<Location> {
        Self::resolve(book, location).previous
    }

    pub fn next(book: &Book, location: &Location) -> Option<Location> {
        Self::resolve(book, location).next
    }
}
