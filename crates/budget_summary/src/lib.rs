//! Classification and aggregation of provider transaction feeds into budget
//! buckets.
//!
//! The crate is synchronous and holds no state between calls: a
//! [`FetchResult`] goes in, an [`IndexedFetchResult`] or a [`Summary`] comes
//! out.

mod bucket;
mod classify;
mod error;
mod index;
mod model;
mod rules;
mod summary;

pub use bucket::Bucket;
pub use classify::Classifier;
pub use error::{ContractError, RuleError};
pub use index::index_accounts;
pub use model::{Account, FetchResult, IndexedFetchResult, Transaction};
pub use rules::RuleTable;
pub use summary::{reindex_and_return, summarize, ChartColors, ChartDataset, Dataset, Summary};
