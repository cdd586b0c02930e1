use notion_blocks::{
    heading, paragraph, paragraph_with_formatting, Block, BlockError, TextPart, DEFAULT_COLOR,
};

pub const BALANCE_PAGE_TITLE: &str = "Balance as of Today";

/// Content of the sample balance page: headings, plain paragraphs and
/// paragraphs with a bold amount.
pub fn balance_page_blocks() -> Result<Vec<Block>, BlockError> {
    Ok(vec![
        heading("Balance Sheet", 1, false)?,
        paragraph("Date: December 29, 2025", false, false, DEFAULT_COLOR),
        heading("Treasury Accounts", 2, false)?,
        paragraph(
            "Main Account (ES91 2100 0418 4502 0005 1332)",
            false,
            false,
            DEFAULT_COLOR,
        ),
        paragraph_with_formatting(&[
            TextPart::new("Balance: "),
            TextPart::new("50,964.18 €").bold(),
        ]),
        heading("Summary", 2, false)?,
        paragraph_with_formatting(&[
            TextPart::new("Total Balance: "),
            TextPart::new("50,964.18 €").bold(),
        ]),
    ])
}
