/*!
# Tree Document & Recipient CSV Schemas

The JSON tree document is the contract between whoever generates a campaign
and every client that later proves claims against it. Index, amount and root
values are strings: amounts routinely exceed what a JSON number survives.
*/

use airdrop_merkle::LeafEncoding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current tree document format version
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

// ================================================================================================
// Tree Document
// ================================================================================================

/// Serialized tree: root, leaves in index order, optional metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeDocument {
    /// `0x`-prefixed 32-byte hex root
    pub root: String,

    pub leaves: Vec<LeafEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TreeMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeafEntry {
    /// Decimal claim index
    pub index: String,

    /// `0x`-prefixed hex address
    pub recipient: String,

    /// Decimal token amount in base units
    pub amount: String,

    /// Cached sibling path; checked against the rebuilt tree on load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TreeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_count: Option<usize>,

    /// Decimal sum of all amounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_allocation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_encoding: Option<LeafEncoding>,
}

// ================================================================================================
// Recipients CSV Schema
// ================================================================================================

/// Expected headers for recipients.csv in exact order
pub const RECIPIENTS_CSV_HEADERS: &[&str] = &["index", "recipient", "amount"];

/// Row structure for recipients.csv
///
/// **File**: `recipients.csv`
/// **Producer**: `generate-fixtures`, or the campaign operator
/// **Consumer**: `build-tree`
///
/// Fields stay strings here and are parsed with the engine's strict parsers,
/// so a malformed row is reported with its row number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipientRow {
    pub index: String,
    pub recipient: String,
    pub amount: String,
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_json_shape() {
        let document = TreeDocument {
            root: format!("0x{}", "ab".repeat(32)),
            leaves: vec![LeafEntry {
                index: "0".to_string(),
                recipient: "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1".to_string(),
                amount: "340282366920938463463374607431768211455".to_string(),
                proof: None,
            }],
            metadata: Some(TreeMetadata {
                recipient_count: Some(1),
                leaf_encoding: Some(LeafEncoding::DoubleHashed),
                format_version: Some(CURRENT_FORMAT_VERSION.to_string()),
                ..Default::default()
            }),
        };

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["leaves"][0]["amount"], "340282366920938463463374607431768211455");
        assert!(json["leaves"][0].get("proof").is_none());
        assert_eq!(json["metadata"]["recipientCount"], 1);
        assert_eq!(json["metadata"]["leafEncoding"], "double-hashed");
        assert!(json["metadata"].get("createdAt").is_none());

        let back: TreeDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, document);
    }

    #[test]
    fn test_numeric_amounts_are_rejected() {
        let json = r#"{"root":"0x00","leaves":[{"index":"0","recipient":"0x01","amount":1000}]}"#;
        assert!(serde_json::from_str::<TreeDocument>(json).is_err());
    }

    #[test]
    fn test_recipient_row_csv_roundtrip() {
        let row = RecipientRow {
            index: "4".to_string(),
            recipient: "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2".to_string(),
            amount: "2000".to_string(),
        };

        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(&row).unwrap();
        let csv_data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert!(csv_data.starts_with("index,recipient,amount"));

        let mut rdr = csv::Reader::from_reader(csv_data.as_bytes());
        let deserialized: RecipientRow = rdr.deserialize().next().unwrap().unwrap();
        assert_eq!(row, deserialized);
    }
}
