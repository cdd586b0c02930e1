//! Declarative page content.
//!
//! An outline is a JSON array of block specs such as
//! `{"type": "heading", "text": "Summary", "level": 2}`. Omitted fields take
//! the same defaults as the builder functions.

use serde::{Deserialize, Serialize};

use crate::block::{Block, DEFAULT_COLOR};
use crate::builders::{
    self, TextPart, DEFAULT_CALLOUT_COLOR, DEFAULT_CALLOUT_ICON, DEFAULT_CODE_LANGUAGE,
};
use crate::error::BlockError;

fn default_level() -> i64 {
    1
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_callout_icon() -> String {
    DEFAULT_CALLOUT_ICON.to_string()
}

fn default_callout_color() -> String {
    DEFAULT_CALLOUT_COLOR.to_string()
}

fn default_language() -> String {
    DEFAULT_CODE_LANGUAGE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockSpec {
    Heading {
        text: String,
        #[serde(default = "default_level")]
        level: i64,
        #[serde(default)]
        bold: bool,
    },
    Paragraph {
        text: String,
        #[serde(default)]
        bold: bool,
        #[serde(default)]
        italic: bool,
        #[serde(default = "default_color")]
        color: String,
    },
    ParagraphWithFormatting {
        #[serde(default)]
        parts: Vec<TextPart>,
    },
    BulletedListItem {
        text: String,
    },
    NumberedListItem {
        text: String,
    },
    #[serde(alias = "to_do")]
    Todo {
        text: String,
        #[serde(default)]
        checked: bool,
    },
    Toggle {
        text: String,
        #[serde(default)]
        children: Vec<BlockSpec>,
    },
    Divider,
    Callout {
        text: String,
        #[serde(default = "default_callout_icon")]
        icon: String,
        #[serde(default = "default_callout_color")]
        color: String,
    },
    Quote {
        text: String,
    },
    Code {
        content: String,
        #[serde(default = "default_language")]
        language: String,
    },
    TableOfContents,
    Bookmark {
        url: String,
        #[serde(default)]
        caption: Option<String>,
    },
    Image {
        url: String,
        #[serde(default)]
        caption: Option<String>,
    },
}

impl BlockSpec {
    /// Builds the block this spec describes.
    ///
    /// # Errors
    ///
    /// Fails when a heading, possibly nested inside a toggle, has a level
    /// outside 1..=3.
    pub fn build(&self) -> Result<Block, BlockError> {
        let block = match self {
            BlockSpec::Heading { text, level, bold } => {
                let level =
                    u8::try_from(*level).map_err(|_| builders::invalid_heading_level(level))?;
                builders::heading(text, level, *bold)?
            }
            BlockSpec::Paragraph {
                text,
                bold,
                italic,
                color,
            } => builders::paragraph(text, *bold, *italic, color),
            BlockSpec::ParagraphWithFormatting { parts } => {
                builders::paragraph_with_formatting(parts)
            }
            BlockSpec::BulletedListItem { text } => builders::bulleted_list_item(text),
            BlockSpec::NumberedListItem { text } => builders::numbered_list_item(text),
            BlockSpec::Todo { text, checked } => builders::todo(text, *checked),
            BlockSpec::Toggle { text, children } => {
                builders::toggle(text, build_outline(children)?)
            }
            BlockSpec::Divider => builders::divider(),
            BlockSpec::Callout { text, icon, color } => builders::callout(text, icon, color),
            BlockSpec::Quote { text } => builders::quote(text),
            BlockSpec::Code { content, language } => builders::code(content, language),
            BlockSpec::TableOfContents => builders::table_of_contents(),
            BlockSpec::Bookmark { url, caption } => builders::bookmark(url, caption.as_deref()),
            BlockSpec::Image { url, caption } => builders::image(url, caption.as_deref()),
        };
        Ok(block)
    }
}

/// Builds every spec in order, stopping at the first failure.
///
/// # Errors
///
/// Propagates the first [`BlockError`] raised by [`BlockSpec::build`].
pub fn build_outline(specs: &[BlockSpec]) -> Result<Vec<Block>, BlockError> {
    specs.iter().map(BlockSpec::build).collect()
}

/// Parses a JSON array of block specs.
///
/// # Errors
///
/// Returns [`BlockError::Outline`] when the input is not a valid outline.
pub fn parse_outline(input: &str) -> Result<Vec<BlockSpec>, BlockError> {
    Ok(serde_json::from_str(input)?)
}
