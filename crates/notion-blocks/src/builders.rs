//! Constructors for every supported block kind.
//!
//! Each function returns a fresh [`Block`] whose JSON form is accepted
//! as-is by the Notion API. Inputs are passed through unchecked apart from
//! the heading level.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::{
    Annotations, Block, BookmarkPayload, CalloutPayload, CodePayload, EmptyPayload,
    ExternalFile, FileSource, Icon, ImagePayload, ParagraphPayload, RichText,
    TableOfContentsPayload, TextPayload, ToDoPayload, TogglePayload, DEFAULT_COLOR,
};
use crate::error::BlockError;

pub const DEFAULT_CALLOUT_ICON: &str = "💡";
pub const DEFAULT_CALLOUT_COLOR: &str = "gray_background";
pub const DEFAULT_CODE_LANGUAGE: &str = "python";

/// One run of a multi-part paragraph.
///
/// `color` is only read from the first part and applies to the whole
/// paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TextPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    #[must_use]
    pub fn code(mut self) -> Self {
        self.code = true;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    fn annotations(&self) -> Annotations {
        Annotations {
            bold: self.bold,
            italic: self.italic,
            code: self.code,
        }
    }
}

fn single_span(text: impl Into<String>) -> Vec<RichText> {
    vec![RichText::plain(text)]
}

fn caption_spans(caption: Option<&str>) -> Vec<RichText> {
    match caption {
        Some(caption) if !caption.is_empty() => single_span(caption),
        _ => Vec::new(),
    }
}

/// Heading block of `level` 1, 2 or 3.
///
/// # Errors
///
/// Returns [`BlockError::InvalidArgument`] for any other level.
pub fn heading(text: impl Into<String>, level: u8, bold: bool) -> Result<Block, BlockError> {
    let payload = TextPayload {
        rich_text: vec![RichText::styled(
            text,
            Annotations {
                bold,
                ..Annotations::default()
            },
        )],
    };

    match level {
        1 => Ok(Block::Heading1(payload)),
        2 => Ok(Block::Heading2(payload)),
        3 => Ok(Block::Heading3(payload)),
        _ => Err(invalid_heading_level(level)),
    }
}

pub(crate) fn invalid_heading_level(level: impl fmt::Display) -> BlockError {
    BlockError::InvalidArgument(format!("heading level must be 1, 2, or 3 (got {level})"))
}

pub fn paragraph(
    text: impl Into<String>,
    bold: bool,
    italic: bool,
    color: impl Into<String>,
) -> Block {
    Block::Paragraph(ParagraphPayload {
        rich_text: vec![RichText::styled(
            text,
            Annotations {
                bold,
                italic,
                code: false,
            },
        )],
        color: color.into(),
    })
}

/// Paragraph made of several differently styled runs, kept in input order.
///
/// The paragraph color comes from the first part, falling back to
/// [`DEFAULT_COLOR`]; colors on later parts are ignored.
#[must_use]
pub fn paragraph_with_formatting(parts: &[TextPart]) -> Block {
    let rich_text = parts
        .iter()
        .map(|part| RichText::styled(part.text.clone(), part.annotations()))
        .collect();
    let color = parts
        .first()
        .and_then(|part| part.color.clone())
        .unwrap_or_else(|| DEFAULT_COLOR.to_string());

    Block::Paragraph(ParagraphPayload { rich_text, color })
}

pub fn bulleted_list_item(text: impl Into<String>) -> Block {
    Block::BulletedListItem(TextPayload {
        rich_text: single_span(text),
    })
}

pub fn numbered_list_item(text: impl Into<String>) -> Block {
    Block::NumberedListItem(TextPayload {
        rich_text: single_span(text),
    })
}

pub fn todo(text: impl Into<String>, checked: bool) -> Block {
    Block::ToDo(ToDoPayload {
        rich_text: single_span(text),
        checked,
    })
}

/// Collapsible block; `children` are only emitted when there are any.
pub fn toggle(text: impl Into<String>, children: Vec<Block>) -> Block {
    Block::Toggle(TogglePayload {
        rich_text: single_span(text),
        children,
    })
}

#[must_use]
pub fn divider() -> Block {
    Block::Divider(EmptyPayload {})
}

pub fn callout(
    text: impl Into<String>,
    icon: impl Into<String>,
    color: impl Into<String>,
) -> Block {
    Block::Callout(CalloutPayload {
        rich_text: single_span(text),
        icon: Icon::Emoji { emoji: icon.into() },
        color: color.into(),
    })
}

pub fn quote(text: impl Into<String>) -> Block {
    Block::Quote(TextPayload {
        rich_text: single_span(text),
    })
}

pub fn code(content: impl Into<String>, language: impl Into<String>) -> Block {
    Block::Code(CodePayload {
        rich_text: single_span(content),
        language: language.into(),
    })
}

#[must_use]
pub fn table_of_contents() -> Block {
    Block::TableOfContents(TableOfContentsPayload {
        color: DEFAULT_COLOR.to_string(),
    })
}

pub fn bookmark(url: impl Into<String>, caption: Option<&str>) -> Block {
    Block::Bookmark(BookmarkPayload {
        url: url.into(),
        caption: caption_spans(caption),
    })
}

/// Image hosted at an external `url`.
pub fn image(url: impl Into<String>, caption: Option<&str>) -> Block {
    Block::Image(ImagePayload {
        file: FileSource::External {
            external: ExternalFile { url: url.into() },
        },
        caption: caption_spans(caption),
    })
}
