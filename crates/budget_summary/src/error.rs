use thiserror::Error;

use crate::Bucket;

/// A provider payload is missing a required field or carries one with the
/// wrong shape. Aggregation stops at the first violation.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("fetch result is malformed: {0}")]
    Payload(#[source] serde_json::Error),
    #[error("account at position {index} is malformed: {source}")]
    Account {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("transaction at position {index} is malformed: {source}")]
    Transaction {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("{bucket} total overflows after transaction at position {index}")]
    Overflow { bucket: Bucket, index: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("category label {label:?} is assigned to both {first} and {second}")]
    DuplicateLabel {
        label: String,
        first: Bucket,
        second: Bucket,
    },
    #[error("rules cannot target the {0} bucket")]
    ReservedBucket(Bucket),
    #[error("empty category label in {0} rules")]
    EmptyLabel(Bucket),
    #[error("unknown budget bucket {0:?}")]
    UnknownBucket(String),
}
