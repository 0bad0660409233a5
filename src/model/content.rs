//! Book content model: chapters, sections and typed content blocks
//!
//! The tree is loaded once at startup and never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::navigation::TOC_ID;

const EMBEDDED_BOOK: &str = include_str!("../../assets/book.json");

/// Errors raised while loading or validating a book
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to read book file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed book: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Book has no sections")]
    Empty,

    #[error("Section in chapter '{0}' has an empty id")]
    EmptySectionId(String),

    #[error("Duplicate section id '{0}'")]
    DuplicateSectionId(String),

    #[error("Section id '{0}' is reserved")]
    ReservedSectionId(String),
}

/// One typed unit of a section body
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "RawBlock")]
pub enum ContentBlock {
    Plain(String),
    Header { text: String },
    List { items: Vec<String> },
    Quote { text: String, source: Option<String> },
    Footnote { text: String },
}

/// On-disk shape: a bare string is a paragraph, anything else is tagged by `type`
#[derive(Clone, Deserialize)]
#[serde(untagged)]
enum RawBlock {
    Plain(String),
    Tagged(TaggedBlock),
}

#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedBlock {
    Header {
        text: String,
    },
    List {
        items: Vec<String>,
    },
    Quote {
        text: String,
        #[serde(default)]
        source: Option<String>,
    },
    Footnote {
        text: String,
    },
}

impl From<RawBlock> for ContentBlock {
    fn from(raw: RawBlock) -> Self {
        match raw {
            RawBlock::Plain(text) => Self::Plain(text),
            RawBlock::Tagged(TaggedBlock::Header { text }) => Self::Header { text },
            RawBlock::Tagged(TaggedBlock::List { items }) => Self::List { items },
            RawBlock::Tagged(TaggedBlock::Quote { text, source }) => Self::Quote { text, source },
            RawBlock::Tagged(TaggedBlock::Footnote { text }) => Self::Footnote { text },
        }
    }
}

/// Smallest navigable unit of the book
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(rename = "content", default)]
    pub blocks: Vec<ContentBlock>,
}

impl Section {
    /// Script handed to the narrator. Footnotes are not read aloud and
    /// every list item becomes its own line.
    pub fn narration_text(&self) -> String {
        let mut text = format!("{}. \n\n", self.title);
        for block in &self.blocks {
            match block {
                ContentBlock::Plain(body) => {
                    text.push_str(&format!("{} \n", body));
                }
                ContentBlock::Header { text: header } => {
                    text.push_str(&format!("{}. \n", header));
                }
                ContentBlock::List { items } => {
                    for item in items {
                        text.push_str(&format!("{}. \n", item));
                    }
                }
                ContentBlock::Quote { text: quote, source } => {
                    text.push_str(&format!("{} \n", quote));
                    if let Some(source) = source {
                        text.push_str(&format!("{}. \n", source));
                    }
                }
                ContentBlock::Footnote { .. } => {}
            }
        }
        text
    }

    /// Readable plain-text rendering used for the clipboard
    pub fn plain_text(&self) -> String {
        let mut parts = vec![self.title.clone()];
        for block in &self.blocks {
            let part = match block {
                ContentBlock::Plain(body) => body.clone(),
                ContentBlock::Header { text } => text.clone(),
                ContentBlock::List { items } => items
                    .iter()
                    .map(|item| format!("- {}", item))
                    .collect::<Vec<_>>()
                    .join("\n"),
                ContentBlock::Quote { text, source: Some(source) } => {
                    format!("\"{}\"\n-- {}", text, source)
                }
                ContentBlock::Quote { text, source: None } => format!("\"{}\"", text),
                ContentBlock::Footnote { text } => format!("Note: {}", text),
            };
            parts.push(part);
        }
        parts.join("\n\n")
    }
}

/// Ordered grouping of sections
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// The complete, read-only document tree
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub title: String,
    pub chapters: Vec<Chapter>,
}

impl Book {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let book: Book = serde_json::from_str(json)?;
        book.validate()?;
        Ok(book)
    }

    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The sample book compiled into the binary
    pub fn embedded() -> Result<Self, ContentError> {
        Self::from_json(EMBEDDED_BOOK)
    }

    fn validate(&self) -> Result<(), ContentError> {
        let mut seen = HashSet::new();
        for chapter in &self.chapters {
            for section in &chapter.sections {
                if section.id.is_empty() {
                    return Err(ContentError::EmptySectionId(chapter.title.clone()));
                }
                if section.id == TOC_ID {
                    return Err(ContentError::ReservedSectionId(section.id.clone()));
                }
                if !seen.insert(section.id.as_str()) {
                    return Err(ContentError::DuplicateSectionId(section.id.clone()));
                }
            }
        }
        if seen.is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(())
    }

    /// All sections in document order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.chapters.iter().flat_map(|chapter| chapter.sections.iter())
    }

    pub fn section_count(&self) -> usize {
        self.chapters.iter().map(|chapter| chapter.sections.len()).sum()
    }

    pub fn find_section(&self, id: &str) -> Option<&Section> {
        self.sections().find(|section| section.id == id)
    }

    pub fn first_section(&self) -> Option<&Section> {
        self.sections().next()
    }

    /// Chapter index and in-chapter index of a section
    pub fn locate(&self, id: &str) -> Option<(usize, usize)> {
        self.chapters.iter().enumerate().find_map(|(chapter_index, chapter)| {
            chapter
                .sections
                .iter()
                .position(|section| section.id == id)
                .map(|section_index| (chapter_index, section_index))
        })
    }
}
