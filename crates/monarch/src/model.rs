use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub pending: bool,
    pub date: NaiveDate,
    pub hide_from_reports: bool,
    /// Raw description supplied by the bank-data aggregator.
    pub plaid_name: Option<String>,
    pub notes: Option<String>,
    pub is_recurring: bool,
    pub review_status: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub is_split_transaction: bool,
    pub category: Option<Category>,
    pub merchant: Option<Merchant>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Transaction {
    pub fn merchant_name(&self) -> Option<&str> {
        self.merchant.as_ref().map(|m| m.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub transactions_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub order: i64,
    /// Only populated when listing household tags.
    #[serde(default)]
    pub transaction_count: Option<u64>,
}
