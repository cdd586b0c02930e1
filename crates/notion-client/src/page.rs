use notion_blocks::{Block, Icon};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

use crate::ClientError;

/// Where a new page is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    PageId(String),
    DatabaseId(String),
    Workspace,
}

impl Parent {
    /// Resolves a parent from its API name (`page_id`, `database_id`,
    /// `workspace`) or the short forms `page` and `database`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidParent`] for any other name.
    pub fn from_type(parent_type: &str, id: impl Into<String>) -> Result<Self, ClientError> {
        match parent_type {
            "page_id" | "page" => Ok(Parent::PageId(id.into())),
            "database_id" | "database" => Ok(Parent::DatabaseId(id.into())),
            "workspace" => Ok(Parent::Workspace),
            other => Err(ClientError::InvalidParent(other.to_string())),
        }
    }
}

impl Serialize for Parent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Parent::PageId(id) => map.serialize_entry("page_id", id)?,
            Parent::DatabaseId(id) => map.serialize_entry("database_id", id)?,
            Parent::Workspace => map.serialize_entry("workspace", &true)?,
        }
        map.end()
    }
}

/// A page waiting to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDraft {
    pub title: String,
    pub parent: Parent,
    /// Raw page properties; a title property is generated when absent.
    pub properties: Option<Value>,
    pub children: Vec<Block>,
    pub icon: Option<Icon>,
    pub cover: Option<Value>,
}

impl PageDraft {
    pub fn new(title: impl Into<String>, parent: Parent) -> Self {
        Self {
            title: title.into(),
            parent,
            properties: None,
            children: Vec::new(),
            icon: None,
            cover: None,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = Some(properties);
        self
    }

    #[must_use]
    pub fn with_cover(mut self, cover: Value) -> Self {
        self.cover = Some(cover);
        self
    }

    /// Body of `POST /pages` carrying every child block.
    #[must_use]
    pub fn request_body(&self) -> CreatePageBody<'_> {
        self.request_body_with(&self.children)
    }

    pub(crate) fn request_body_with<'a>(&'a self, children: &'a [Block]) -> CreatePageBody<'a> {
        CreatePageBody {
            parent: &self.parent,
            properties: self.properties(),
            icon: self.icon.as_ref(),
            cover: self.cover.as_ref(),
            children,
        }
    }

    fn properties(&self) -> Value {
        match &self.properties {
            Some(Value::Object(map)) if !map.is_empty() => Value::Object(map.clone()),
            _ => json!({
                "title": {
                    "title": [{"text": {"content": self.title}}]
                }
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatePageBody<'a> {
    pub parent: &'a Parent,
    pub properties: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'a Icon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<&'a Value>,
    #[serde(skip_serializing_if = "<[Block]>::is_empty")]
    pub children: &'a [Block],
}

#[derive(Debug, Serialize)]
pub(crate) struct AppendBlocksBody<'a> {
    pub children: &'a [Block],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPage {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockList {
    #[serde(default)]
    pub results: Vec<BlockRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockRef {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use notion_blocks::{divider, heading};

    fn body(draft: &PageDraft) -> Value {
        serde_json::to_value(draft.request_body()).expect("serialize body")
    }

    #[test]
    fn parent_shapes() {
        let page = Parent::from_type("page_id", "abc").expect("page parent");
        assert_eq!(serde_json::to_value(&page).unwrap(), json!({"page_id": "abc"}));

        let database = Parent::from_type("database", "db").expect("database parent");
        assert_eq!(
            serde_json::to_value(&database).unwrap(),
            json!({"database_id": "db"})
        );

        let workspace = Parent::from_type("workspace", "ignored").expect("workspace parent");
        assert_eq!(
            serde_json::to_value(&workspace).unwrap(),
            json!({"workspace": true})
        );
    }

    #[test]
    fn unknown_parent_type_is_rejected() {
        let error = Parent::from_type("block_id", "x").expect_err("rejected");
        assert!(matches!(error, ClientError::InvalidParent(kind) if kind == "block_id"));
    }

    #[test]
    fn minimal_draft_gets_title_property_only() {
        let draft = PageDraft::new("Balance", Parent::PageId("p1".to_string()));
        assert_eq!(
            body(&draft),
            json!({
                "parent": {"page_id": "p1"},
                "properties": {
                    "title": {"title": [{"text": {"content": "Balance"}}]}
                }
            })
        );
    }

    #[test]
    fn empty_properties_fall_back_to_title() {
        let draft = PageDraft::new("Balance", Parent::Workspace).with_properties(json!({}));
        assert_eq!(
            body(&draft)["properties"]["title"]["title"][0]["text"]["content"],
            "Balance"
        );
    }

    #[test]
    fn explicit_properties_and_optional_fields_are_kept() {
        let draft = PageDraft::new("Ignored", Parent::DatabaseId("db".to_string()))
            .with_properties(json!({"Name": {"title": [{"text": {"content": "Row"}}]}}))
            .with_icon(Icon::Emoji {
                emoji: "📒".to_string(),
            })
            .with_cover(json!({
                "type": "external",
                "external": {"url": "https://example.com/c.png"}
            }))
            .with_children(vec![heading("Title", 1, false).unwrap(), divider()]);

        let value = body(&draft);
        assert_eq!(value["parent"], json!({"database_id": "db"}));
        assert!(value["properties"].get("title").is_none());
        assert_eq!(value["properties"]["Name"]["title"][0]["text"]["content"], "Row");
        assert_eq!(value["icon"], json!({"type": "emoji", "emoji": "📒"}));
        assert_eq!(value["cover"]["external"]["url"], "https://example.com/c.png");
        assert_eq!(value["children"][0]["type"], "heading_1");
        assert_eq!(value["children"][1], json!({"type": "divider", "divider": {}}));
    }
}
