// src/services/parser.rs

//! Captured line parser.
//!
//! Lines arrive from the capture collaborator in the shape
//!
//! ```text
//! <Title> - SKU: <Code> - <Location> - Item: <ItemId>
//! ```
//!
//! Parsing locates the three delimiters first and only then slices fields,
//! so every field is bounded by an explicit pair of positions:
//!
//! ```text
//! title      = [0, code_marker)
//! code       = [code_marker + 8, location_sep)
//! location   = [location_sep + 3, item_marker)
//! item id    = trim([item_marker + 9, len))
//! ```
//!
//! The code field ends at the *last* `" - "` before the item marker. Codes
//! routinely contain the same separator (`SF - 111`), while the location is
//! always a single trailing segment.

use crate::error::{ParseError, RecordWarning};
use crate::models::ListingRecord;

const CODE_MARKER: &str = " - SKU: ";
const FIELD_SEPARATOR: &str = " - ";
const ITEM_MARKER: &str = " - Item: ";

/// Byte offsets of the delimiters within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldBounds {
    code_marker: usize,
    location_sep: usize,
    item_marker: usize,
}

impl FieldBounds {
    /// Scan a line for the three delimiters.
    ///
    /// Failures are reported in field order: code marker, code terminator,
    /// item marker.
    fn locate(line: &str) -> Result<Self, ParseError> {
        let code_marker = line
            .find(CODE_MARKER)
            .ok_or(ParseError::MissingCodeMarker)?;
        let code_start = code_marker + CODE_MARKER.len();
        let rest = &line[code_start..];

        let Some(item_rel) = rest.rfind(ITEM_MARKER) else {
            return Err(if rest.contains(FIELD_SEPARATOR) {
                ParseError::MissingItemMarker
            } else {
                ParseError::MalformedCodeField
            });
        };

        let location_rel = rest[..item_rel]
            .rfind(FIELD_SEPARATOR)
            .ok_or(ParseError::MalformedCodeField)?;

        Ok(Self {
            code_marker,
            location_sep: code_start + location_rel,
            item_marker: code_start + item_rel,
        })
    }

    fn title<'a>(&self, line: &'a str) -> &'a str {
        &line[..self.code_marker]
    }

    fn code<'a>(&self, line: &'a str) -> &'a str {
        &line[self.code_marker + CODE_MARKER.len()..self.location_sep]
    }

    fn location<'a>(&self, line: &'a str) -> &'a str {
        &line[self.location_sep + FIELD_SEPARATOR.len()..self.item_marker]
    }

    fn item_id<'a>(&self, line: &'a str) -> &'a str {
        line[self.item_marker + ITEM_MARKER.len()..].trim()
    }
}

/// Parse one captured line into a listing record.
pub fn parse_line(line: &str) -> Result<ListingRecord, ParseError> {
    let bounds = FieldBounds::locate(line)?;
    Ok(ListingRecord {
        title: bounds.title(line).to_string(),
        code: bounds.code(line).to_string(),
        location: bounds.location(line).to_string(),
        item_id: bounds.item_id(line).to_string(),
        source_line: line.to_string(),
    })
}

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    /// 1-based line number within the batch
    pub line_no: usize,
    pub line: String,
    pub error: ParseError,
}

/// Result of parsing a whole batch of lines.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub records: Vec<ListingRecord>,
    pub failures: Vec<LineFailure>,
    pub warnings: Vec<RecordWarning>,
    pub blank_lines: usize,
}

/// Parse every non-blank line, skipping and logging failures.
pub fn parse_lines<I, S>(lines: I) -> ParsedBatch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut batch = ParsedBatch::default();

    for (idx, raw) in lines.into_iter().enumerate() {
        let line = raw.as_ref();
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            batch.blank_lines += 1;
            continue;
        }

        match parse_line(line) {
            Ok(record) => {
                for warning in record.warnings() {
                    log::warn!("Line {}: {}", idx + 1, warning);
                    batch.warnings.push(warning);
                }
                batch.records.push(record);
            }
            Err(error) => {
                log::warn!("Skipping line {}: {} ({:?})", idx + 1, error, line);
                batch.failures.push(LineFailure {
                    line_no: idx + 1,
                    line: line.to_string(),
                    error,
                });
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGET: &str = "Widget A - SKU: SF - 111 - Warehouse1 - Item: 111111111111";

    fn reassemble(record: &ListingRecord) -> String {
        format!(
            "{}{}{}{}{}{}{}",
            record.title,
            CODE_MARKER,
            record.code,
            FIELD_SEPARATOR,
            record.location,
            ITEM_MARKER,
            record.item_id
        )
    }

    #[test]
    fn test_parse_well_formed_line() {
        let record = parse_line(WIDGET).unwrap();
        assert_eq!(record.title, "Widget A");
        assert_eq!(record.code, "SF - 111");
        assert_eq!(record.location, "Warehouse1");
        assert_eq!(record.item_id, "111111111111");
        assert_eq!(record.source_line, WIDGET);
    }

    #[test]
    fn test_reassembly_reproduces_line() {
        let lines = [
            WIDGET,
            "Dell Latitude 5490 i5 - SKU: DD - 4145 - G4 (lot of 2) - Item: 123456789012",
            "Lenovo T480 - Parts Only - SKU: KG-7769-HDD - Shelf C - Item: 987654321098",
            "Cable - SKU:  - Bin 4 - Item: 000000000001",
        ];
        for line in lines {
            let record = parse_line(line).unwrap();
            assert_eq!(reassemble(&record), line);
        }
    }

    #[test]
    fn test_location_passes_through_unmodified() {
        let record =
            parse_line("Mouse - SKU: JW - 3809 -   Shelf  C (top) - Item: 123456789012").unwrap();
        assert_eq!(record.location, "  Shelf  C (top)");
        assert_eq!(record.code, "JW - 3809");
    }

    #[test]
    fn test_title_may_contain_separator() {
        let record =
            parse_line("HP 840 - Grade B - SKU: MC - 2923 - C4 - Item: 111122223333").unwrap();
        assert_eq!(record.title, "HP 840 - Grade B");
        assert_eq!(record.code, "MC - 2923");
    }

    #[test]
    fn test_item_id_is_trimmed() {
        let record = parse_line("Pad - SKU: SF - 12 - A1 - Item:  123456789012  ").unwrap();
        assert_eq!(record.item_id, "123456789012");
    }

    #[test]
    fn test_missing_code_marker() {
        assert_eq!(
            parse_line("Widget A - Warehouse1 - Item: 111111111111"),
            Err(ParseError::MissingCodeMarker)
        );
    }

    #[test]
    fn test_malformed_code_field() {
        assert_eq!(
            parse_line("Widget A - SKU: SF111"),
            Err(ParseError::MalformedCodeField)
        );
        assert_eq!(
            parse_line("Widget A - SKU: SF111 - Item: 111111111111"),
            Err(ParseError::MalformedCodeField)
        );
    }

    #[test]
    fn test_missing_item_marker() {
        assert_eq!(
            parse_line("Widget A - SKU: SF - 111 - Warehouse1"),
            Err(ParseError::MissingItemMarker)
        );
    }

    #[test]
    fn test_malformed_item_id_is_kept() {
        let record = parse_line("Widget A - SKU: SF - 111 - W1 - Item: 12-34").unwrap();
        assert_eq!(record.item_id, "12-34");
        assert!(!record.has_well_formed_item_id());
    }

    #[test]
    fn test_parse_lines_skips_blank_and_bad_lines() {
        let input = format!(
            "{WIDGET}\n\n   \nno markers here\r\nWidget B - SKU: SF - 222 - W2 - Item: 42\r\n"
        );
        let batch = parse_lines(input.lines());

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.blank_lines, 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].line_no, 4);
        assert_eq!(batch.failures[0].error, ParseError::MissingCodeMarker);
        assert_eq!(batch.warnings.len(), 1);
        assert_eq!(batch.records[1].item_id, "42");
    }
}
