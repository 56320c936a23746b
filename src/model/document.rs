//! Document-level types.

use super::{Paragraph, Section, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed word-processing document.
///
/// A `Document` is exclusively owned by one pipeline invocation: created on
/// load, mutated in place by successive stages, persisted once, discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Content blocks in document order
    pub blocks: Vec<Block>,

    /// Section records (margins, page size, footer)
    pub sections: Vec<Section>,
}

impl Document {
    /// Create a new empty document with a single default section.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            blocks: Vec::new(),
            sections: vec![Section::default()],
        }
    }

    /// Get the number of blocks in the document.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has any blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Append a paragraph block.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Append a table block.
    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Insert a block at the given index, shifting later blocks.
    pub fn insert_block(&mut self, index: usize, block: Block) {
        self.blocks.insert(index, block);
    }

    /// Remove and return the block at the given index.
    pub fn remove_block(&mut self, index: usize) -> Block {
        self.blocks.remove(index)
    }

    /// Get the paragraph at a block index, if that block is a paragraph.
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        match self.blocks.get(index) {
            Some(Block::Paragraph(p)) => Some(p),
            _ => None,
        }
    }

    /// Mutable access to the paragraph at a block index.
    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        match self.blocks.get_mut(index) {
            Some(Block::Paragraph(p)) => Some(p),
            _ => None,
        }
    }

    /// Iterate over all top-level paragraphs in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Iterate over all tables in order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Paragraph(p) => p.plain_text(),
                Block::Table(t) => t.plain_text(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A content block: the document is an ordered sequence of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A table
    Table(Table),
}

impl Block {
    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// The paragraph inside this block, if any.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Mutable paragraph access.
    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }
}

/// Document metadata from docProps/core.xml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author (dc:creator)
    pub author: Option<String>,

    /// Last modifier (cp:lastModifiedBy)
    pub last_modified_by: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}
