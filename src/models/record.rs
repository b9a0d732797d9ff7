//! Listing record data structure.

use serde::{Deserialize, Serialize};

use crate::error::RecordWarning;
use crate::models::CodeAnalysis;

/// Expected length of a platform item id.
pub const ITEM_ID_LEN: usize = 12;

/// One parsed listing row.
///
/// Every field is a verbatim slice of `source_line`; nothing is trimmed except
/// the item id, which is taken as the trimmed tail of the line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingRecord {
    /// Listing title
    pub title: String,

    /// Seller code (SKU) as entered by the operator
    pub code: String,

    /// Storage location segment
    pub location: String,

    /// Platform item id
    pub item_id: String,

    /// The captured line this record was parsed from
    pub source_line: String,
}

impl ListingRecord {
    /// Whether the item id is exactly 12 ASCII digits.
    pub fn has_well_formed_item_id(&self) -> bool {
        self.item_id.len() == ITEM_ID_LEN && self.item_id.bytes().all(|b| b.is_ascii_digit())
    }

    /// Collect non-fatal findings about this record.
    pub fn warnings(&self) -> Vec<RecordWarning> {
        let mut warnings = Vec::new();
        if !self.has_well_formed_item_id() {
            warnings.push(RecordWarning::ItemIdFormatMismatch {
                item_id: self.item_id.clone(),
            });
        }
        warnings
    }
}

/// A record together with the classification of its code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRecord {
    pub record: ListingRecord,
    pub analysis: CodeAnalysis,
}

impl ClassifiedRecord {
    pub fn new(record: ListingRecord, analysis: CodeAnalysis) -> Self {
        Self { record, analysis }
    }

    /// Key for fragment-based grouping, if the code carries one.
    pub fn digit_fragment(&self) -> Option<&str> {
        self.analysis.digit_fragment()
    }
}
