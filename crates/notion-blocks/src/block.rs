use std::fmt;

use serde::{ser::SerializeMap, Serialize, Serializer};

/// Color value the Notion API uses when no color is requested.
pub const DEFAULT_COLOR: &str = "default";

/// Type tags of every block kind this crate can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BlockKind {
    #[serde(rename = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    Heading3,
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "bulleted_list_item")]
    BulletedListItem,
    #[serde(rename = "numbered_list_item")]
    NumberedListItem,
    #[serde(rename = "to_do")]
    ToDo,
    #[serde(rename = "toggle")]
    Toggle,
    #[serde(rename = "divider")]
    Divider,
    #[serde(rename = "callout")]
    Callout,
    #[serde(rename = "quote")]
    Quote,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "table_of_contents")]
    TableOfContents,
    #[serde(rename = "bookmark")]
    Bookmark,
    #[serde(rename = "image")]
    Image,
}

impl BlockKind {
    pub const ALL: [BlockKind; 15] = [
        BlockKind::Heading1,
        BlockKind::Heading2,
        BlockKind::Heading3,
        BlockKind::Paragraph,
        BlockKind::BulletedListItem,
        BlockKind::NumberedListItem,
        BlockKind::ToDo,
        BlockKind::Toggle,
        BlockKind::Divider,
        BlockKind::Callout,
        BlockKind::Quote,
        BlockKind::Code,
        BlockKind::TableOfContents,
        BlockKind::Bookmark,
        BlockKind::Image,
    ];

    /// The `type` tag used on the wire, which is also the payload key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Heading1 => "heading_1",
            BlockKind::Heading2 => "heading_2",
            BlockKind::Heading3 => "heading_3",
            BlockKind::Paragraph => "paragraph",
            BlockKind::BulletedListItem => "bulleted_list_item",
            BlockKind::NumberedListItem => "numbered_list_item",
            BlockKind::ToDo => "to_do",
            BlockKind::Toggle => "toggle",
            BlockKind::Divider => "divider",
            BlockKind::Callout => "callout",
            BlockKind::Quote => "quote",
            BlockKind::Code => "code",
            BlockKind::TableOfContents => "table_of_contents",
            BlockKind::Bookmark => "bookmark",
            BlockKind::Image => "image",
        }
    }

    /// Heading kind for `level`, or `None` outside 1..=3.
    #[must_use]
    pub fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(BlockKind::Heading1),
            2 => Some(BlockKind::Heading2),
            3 => Some(BlockKind::Heading3),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Style flags of a rich text span. Only flags that are set are serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub code: bool,
}

impl Annotations {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.bold || self.italic || self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
}

/// One run of text, serialized as `{"type": "text", "text": {"content": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "text")]
pub struct RichText {
    pub text: TextContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            text: TextContent {
                content: content.into(),
            },
            annotations: None,
        }
    }

    /// Span with `annotations`; an empty flag set leaves the key off entirely.
    pub fn styled(content: impl Into<String>, annotations: Annotations) -> Self {
        let mut span = Self::plain(content);
        if !annotations.is_empty() {
            span.annotations = Some(annotations);
        }
        span
    }

    pub fn content(&self) -> &str {
        &self.text.content
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileSource {
    External { external: ExternalFile },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextPayload {
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParagraphPayload {
    pub rich_text: Vec<RichText>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToDoPayload {
    pub rich_text: Vec<RichText>,
    pub checked: bool,
}

/// Toggle text plus the nested blocks revealed when it is expanded.
///
/// The children live next to the payload on the wire (`block.children`),
/// so they are skipped here and written by [`Block`]'s serializer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TogglePayload {
    pub rich_text: Vec<RichText>,
    #[serde(skip)]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmptyPayload {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalloutPayload {
    pub rich_text: Vec<RichText>,
    pub icon: Icon,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodePayload {
    pub rich_text: Vec<RichText>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOfContentsPayload {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkPayload {
    pub url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePayload {
    #[serde(flatten)]
    pub file: FileSource,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<RichText>,
}

/// A single Notion content block.
///
/// Serializes to `{"type": <kind>, <kind>: <payload>}`, with a top-level
/// `children` array for toggles that have nested blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading1(TextPayload),
    Heading2(TextPayload),
    Heading3(TextPayload),
    Paragraph(ParagraphPayload),
    BulletedListItem(TextPayload),
    NumberedListItem(TextPayload),
    ToDo(ToDoPayload),
    Toggle(TogglePayload),
    Divider(EmptyPayload),
    Callout(CalloutPayload),
    Quote(TextPayload),
    Code(CodePayload),
    TableOfContents(TableOfContentsPayload),
    Bookmark(BookmarkPayload),
    Image(ImagePayload),
}

impl Block {
    #[must_use]
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Heading1(_) => BlockKind::Heading1,
            Block::Heading2(_) => BlockKind::Heading2,
            Block::Heading3(_) => BlockKind::Heading3,
            Block::Paragraph(_) => BlockKind::Paragraph,
            Block::BulletedListItem(_) => BlockKind::BulletedListItem,
            Block::NumberedListItem(_) => BlockKind::NumberedListItem,
            Block::ToDo(_) => BlockKind::ToDo,
            Block::Toggle(_) => BlockKind::Toggle,
            Block::Divider(_) => BlockKind::Divider,
            Block::Callout(_) => BlockKind::Callout,
            Block::Quote(_) => BlockKind::Quote,
            Block::Code(_) => BlockKind::Code,
            Block::TableOfContents(_) => BlockKind::TableOfContents,
            Block::Bookmark(_) => BlockKind::Bookmark,
            Block::Image(_) => BlockKind::Image,
        }
    }

    /// Nested blocks; only toggles carry any.
    #[must_use]
    pub fn children(&self) -> &[Block] {
        match self {
            Block::Toggle(payload) => &payload.children,
            _ => &[],
        }
    }

    /// Spans that make up the block's main text (captions for media blocks).
    #[must_use]
    pub fn rich_text(&self) -> &[RichText] {
        match self {
            Block::Heading1(payload)
            | Block::Heading2(payload)
            | Block::Heading3(payload)
            | Block::BulletedListItem(payload)
            | Block::NumberedListItem(payload)
            | Block::Quote(payload) => &payload.rich_text,
            Block::Paragraph(payload) => &payload.rich_text,
            Block::ToDo(payload) => &payload.rich_text,
            Block::Toggle(payload) => &payload.rich_text,
            Block::Callout(payload) => &payload.rich_text,
            Block::Code(payload) => &payload.rich_text,
            Block::Bookmark(payload) => &payload.caption,
            Block::Image(payload) => &payload.caption,
            Block::Divider(_) | Block::TableOfContents(_) => &[],
        }
    }

    /// Unstyled text of the block, used for previews.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Block::Bookmark(payload) => payload.url.clone(),
            Block::Image(ImagePayload {
                file: FileSource::External { external },
                ..
            }) => external.url.clone(),
            _ => self.rich_text().iter().map(RichText::content).collect(),
        }
    }
}

impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let key = self.kind().as_str();
        let children = self.children();
        let len = if children.is_empty() { 2 } else { 3 };

        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", key)?;
        match self {
            Block::Heading1(payload)
            | Block::Heading2(payload)
            | Block::Heading3(payload)
            | Block::BulletedListItem(payload)
            | Block::NumberedListItem(payload)
            | Block::Quote(payload) => map.serialize_entry(key, payload)?,
            Block::Paragraph(payload) => map.serialize_entry(key, payload)?,
            Block::ToDo(payload) => map.serialize_entry(key, payload)?,
            Block::Toggle(payload) => map.serialize_entry(key, payload)?,
            Block::Divider(payload) => map.serialize_entry(key, payload)?,
            Block::Callout(payload) => map.serialize_entry(key, payload)?,
            Block::Code(payload) => map.serialize_entry(key, payload)?,
            Block::TableOfContents(payload) => map.serialize_entry(key, payload)?,
            Block::Bookmark(payload) => map.serialize_entry(key, payload)?,
            Block::Image(payload) => map.serialize_entry(key, payload)?,
        }
        if !children.is_empty() {
            map.serialize_entry("children", children)?;
        }
        map.end()
    }
}
