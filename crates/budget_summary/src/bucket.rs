use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Budget bucket a transaction is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    Wants,
    Needs,
    Savings,
    NoCat,
}

impl Bucket {
    /// Every bucket in chart order. Consumers index datasets positionally, so
    /// this order must not change.
    pub const ALL: [Bucket; 4] = [Bucket::Wants, Bucket::Needs, Bucket::Savings, Bucket::NoCat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Wants => "wants",
            Bucket::Needs => "needs",
            Bucket::Savings => "savings",
            Bucket::NoCat => "no-cat",
        }
    }

    pub(crate) fn position(&self) -> usize {
        match self {
            Bucket::Wants => 0,
            Bucket::Needs => 1,
            Bucket::Savings => 2,
            Bucket::NoCat => 3,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wants" => Ok(Bucket::Wants),
            "needs" => Ok(Bucket::Needs),
            "savings" => Ok(Bucket::Savings),
            "no-cat" | "no_cat" => Ok(Bucket::NoCat),
            _ => Err(RuleError::UnknownBucket(s.to_string())),
        }
    }
}
