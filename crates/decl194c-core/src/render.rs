//! Rendering of the fixed declaration text.
//!
//! The same [`Declaration`] feeds the interactive preview and every export
//! format, so the wording can only diverge through [`RenderOptions`].

use serde::Serialize;

use crate::record::{Capacity, DeclarationRecord};

pub const TITLE: &str = "Declaration";
pub const VERIFICATION_HEADING: &str = "Verification";
pub const SEAL_LINE: &str = "(Seal / Stamp of Firm, if any)";
/// Lines of the signature block before the optional seal line.
pub const SIGNATURE_ROWS: usize = 5;
pub const SIGNATURE_RULE: &str = "_________________________";

const VERIFICATION_TEXT: &str = "I, the above-named Declarant, do hereby verify that the contents of paragraphs (1) to (5) above are true and correct to the best of my knowledge and belief, and that nothing material has been concealed therein.";
const POINT_2: &str = "That the Contractor has been engaged by the payer for hiring or leasing of goods carriage(s) for its business.";
const POINT_3: &str =
    "That the Contractor does not own more than ten (10) goods carriage vehicles as on date.";

/// Switches that change what the renderer emits.
///
/// The seal line is printed on exported documents but left out of the
/// on-screen preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub include_seal_line: bool,
}

impl RenderOptions {
    pub fn preview() -> Self {
        Self {
            include_seal_line: false,
        }
    }

    pub fn export() -> Self {
        Self {
            include_seal_line: true,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::preview()
    }
}

/// Semantic role of a block, used by layout surfaces to pick style and
/// placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Salutation,
    Title,
    Paragraph,
    Point,
    Heading,
    PlaceDate,
    Signature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub lines: Vec<String>,
}

impl TextBlock {
    fn new(kind: BlockKind, lines: Vec<String>) -> Self {
        Self { kind, lines }
    }

    fn single(kind: BlockKind, line: impl Into<String>) -> Self {
        Self::new(kind, vec![line.into()])
    }
}

/// Fully substituted declaration text as an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub blocks: Vec<TextBlock>,
}

impl Declaration {
    /// Plain text with a blank line between blocks.
    pub fn to_plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.blocks
            .iter()
            .flat_map(|block| block.lines.iter())
            .any(|line| line.contains(needle))
    }

    pub fn blocks_of(&self, kind: BlockKind) -> impl Iterator<Item = &TextBlock> {
        self.blocks.iter().filter(move |block| block.kind == kind)
    }
}

/// Honorific placed before the firm name: none for a proprietor, `M/s `
/// for every other capacity, including an unset one.
pub fn firm_prefix(capacity: Option<Capacity>) -> &'static str {
    match capacity {
        Some(Capacity::Proprietor) => "",
        _ => "M/s ",
    }
}

/// Render a record of any completeness into the declaration text.
///
/// Empty fields are replaced by a bracketed placeholder such as
/// `[Company Name]`.
pub fn render_declaration(record: &DeclarationRecord, options: RenderOptions) -> Declaration {
    let company = or_placeholder(&record.payer_company_name, "[Company Name]");
    let name = or_placeholder(&record.declarant_name, "[Declarant Name]");
    let capacity = record
        .declarant_capacity
        .map(|c| c.as_str())
        .unwrap_or("[Capacity]");
    let firm = format!(
        "{}{}",
        firm_prefix(record.declarant_capacity),
        or_placeholder(&record.contractor_firm_name, "[Firm Name]")
    );
    let firm_address = if is_blank(&record.contractor_firm_address) {
        "[Firm Address]".to_string()
    } else {
        inline_lines(&record.contractor_firm_address)
    };
    let pan = if is_blank(&record.contractor_pan) {
        "[PAN Number]".to_string()
    } else {
        record.contractor_pan.to_uppercase()
    };
    let financial_year = or_placeholder(&record.financial_year, "[Financial Year]");
    let place = or_placeholder(&record.place, "[Place]");
    let date = or_placeholder(&record.declaration_date, "[Date]");

    let mut salutation = vec!["To".to_string(), company.to_string()];
    if is_blank(&record.payer_company_address) {
        salutation.push("[Company Address]".to_string());
    } else {
        salutation.extend(address_lines(&record.payer_company_address));
    }

    let mut blocks = vec![
        TextBlock::new(BlockKind::Salutation, salutation),
        TextBlock::single(BlockKind::Title, TITLE),
        TextBlock::single(
            BlockKind::Paragraph,
            format!(
                "I, {name}, {capacity} of {firm}, having its registered address at {firm_address}, (hereinafter referred to as \"The Contractor\"), do hereby solemnly declare as under, in compliance with Section 194C(6) of the Income-tax Act, 1961:"
            ),
        ),
    ];

    let points = [
        format!(
            "That I, {name}, am duly authorized to make this declaration in the capacity of {capacity} of the said concern."
        ),
        POINT_2.to_string(),
        POINT_3.to_string(),
        format!(
            "That in case the number of goods carriages owned by the Contractor exceeds ten (10) at any time during the previous year {financial_year}, the Contractor shall immediately, in writing, intimate the payer of this fact."
        ),
        format!(
            "That the Permanent Account Number (PAN) of the Contractor is {pan}. A self-attested copy of the PAN card is enclosed herewith."
        ),
    ];
    for (idx, point) in points.iter().enumerate() {
        blocks.push(TextBlock::single(
            BlockKind::Point,
            format!("{}. {}", idx + 1, point),
        ));
    }

    blocks.push(TextBlock::single(BlockKind::Heading, VERIFICATION_HEADING));
    blocks.push(TextBlock::single(BlockKind::Paragraph, VERIFICATION_TEXT));
    blocks.push(TextBlock::new(
        BlockKind::PlaceDate,
        vec![format!("Place: {place}"), format!("Date: {date}")],
    ));

    let mut signature = vec![
        SIGNATURE_RULE.to_string(),
        "Signature of Declarant".to_string(),
        format!("({name})"),
        format!("({capacity})"),
        firm,
    ];
    if options.include_seal_line {
        signature.push(SEAL_LINE.to_string());
    }
    blocks.push(TextBlock::new(BlockKind::Signature, signature));

    Declaration { blocks }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if is_blank(value) { placeholder } else { value }
}

fn address_lines(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// Addresses substituted into running text lose their line breaks.
fn inline_lines(value: &str) -> String {
    address_lines(value).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salutation_keeps_address_lines() {
        let record = DeclarationRecord {
            payer_company_name: "Acme".to_string(),
            payer_company_address: "12 MG Road\n\nPune".to_string(),
            ..DeclarationRecord::default()
        };
        let rendered = render_declaration(&record, RenderOptions::preview());
        assert_eq!(
            rendered.blocks[0].lines,
            vec!["To", "Acme", "12 MG Road", "Pune"]
        );
    }

    #[test]
    fn inline_address_is_joined_with_commas() {
        let record = DeclarationRecord {
            contractor_firm_address: "45 Station Road\nNagpur".to_string(),
            ..DeclarationRecord::default()
        };
        let rendered = render_declaration(&record, RenderOptions::preview());
        assert!(rendered.contains("registered address at 45 Station Road, Nagpur, (hereinafter"));
    }

    #[test]
    fn whitespace_only_values_use_placeholders() {
        let record = DeclarationRecord {
            place: "   ".to_string(),
            ..DeclarationRecord::default()
        };
        let rendered = render_declaration(&record, RenderOptions::preview());
        assert!(rendered.contains("Place: [Place]"));
    }

    #[test]
    fn seal_line_follows_option() {
        let record = DeclarationRecord::default();
        let preview = render_declaration(&record, RenderOptions::preview());
        let export = render_declaration(&record, RenderOptions::export());
        assert!(!preview.contains(SEAL_LINE));
        assert_eq!(
            export.blocks.last().and_then(|b| b.lines.last()).map(String::as_str),
            Some(SEAL_LINE)
        );
        assert_eq!(preview.blocks.len(), export.blocks.len());
    }

    #[test]
    fn block_order_is_fixed() {
        let rendered = render_declaration(&DeclarationRecord::default(), RenderOptions::export());
        let kinds: Vec<BlockKind> = rendered.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Salutation,
                BlockKind::Title,
                BlockKind::Paragraph,
                BlockKind::Point,
                BlockKind::Point,
                BlockKind::Point,
                BlockKind::Point,
                BlockKind::Point,
                BlockKind::Heading,
                BlockKind::Paragraph,
                BlockKind::PlaceDate,
                BlockKind::Signature,
            ]
        );
    }
}
