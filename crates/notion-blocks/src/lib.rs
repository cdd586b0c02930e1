//! Typed builders for Notion API content blocks.
//!
//! ```
//! use notion_blocks::{divider, heading, paragraph_with_formatting, TextPart};
//!
//! let blocks = vec![
//!     heading("Balance", 1, false).unwrap(),
//!     paragraph_with_formatting(&[TextPart::new("Total: "), TextPart::new("42 €").bold()]),
//!     divider(),
//! ];
//! let json = serde_json::to_value(&blocks).unwrap();
//! assert_eq!(json[0]["type"], "heading_1");
//! ```

pub mod block;
pub mod builders;
pub mod error;
pub mod outline;

pub use block::{Annotations, Block, BlockKind, Icon, RichText, DEFAULT_COLOR};
pub use builders::{
    bookmark, bulleted_list_item, callout, code, divider, heading, image, numbered_list_item,
    paragraph, paragraph_with_formatting, quote, table_of_contents, todo, toggle, TextPart,
    DEFAULT_CALLOUT_COLOR, DEFAULT_CALLOUT_ICON, DEFAULT_CODE_LANGUAGE,
};
pub use error::BlockError;
pub use outline::{build_outline, parse_outline, BlockSpec};
