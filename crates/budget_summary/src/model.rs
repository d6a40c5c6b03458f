use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::ContractError;

/// One account at the linked institution. Everything except the id is kept
/// as the provider sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "account_id")]
    pub id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// A posted or pending ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Signed amount, sign convention as set by the provider.
    #[serde(deserialize_with = "json_number")]
    pub amount: Decimal,
    /// Provider category labels, most general first.
    #[serde(rename = "category")]
    pub category_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Accounts and transactions returned by one provider query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchResult {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    /// Remaining top level fields (item, totals, request id).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A [`FetchResult`] with its accounts keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedFetchResult {
    pub accounts: BTreeMap<String, Account>,
    pub transactions: Vec<Transaction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads a decimal from a JSON number only. Numeric strings are rejected.
fn json_number<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    let text = number.to_string();

    Decimal::from_str_exact(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| de::Error::custom(format!("amount {} is out of range", text)))
}

#[derive(Deserialize)]
struct RawFetchResult {
    accounts: Vec<Value>,
    transactions: Vec<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl FetchResult {
    /// Parses a raw provider response, failing on the first record that is
    /// missing a required field.
    pub fn from_value(value: Value) -> Result<Self, ContractError> {
        let raw: RawFetchResult = serde_json::from_value(value).map_err(ContractError::Payload)?;

        let accounts = raw
            .accounts
            .into_iter()
            .enumerate()
            .map(|(index, account)| {
                serde_json::from_value(account)
                    .map_err(|source| ContractError::Account { index, source })
            })
            .collect::<Result<Vec<Account>, _>>()?;

        let transactions = raw
            .transactions
            .into_iter()
            .enumerate()
            .map(|(index, txn)| {
                serde_json::from_value(txn)
                    .map_err(|source| ContractError::Transaction { index, source })
            })
            .collect::<Result<Vec<Transaction>, _>>()?;

        Ok(Self {
            accounts,
            transactions,
            extra: raw.extra,
        })
    }
}

impl TryFrom<Value> for FetchResult {
    type Error = ContractError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}
