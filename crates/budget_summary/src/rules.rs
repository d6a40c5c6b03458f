use std::collections::HashMap;

use crate::error::RuleError;
use crate::Bucket;

// Nothing maps to savings yet, so that bucket always totals zero with the
// built-in table.
const STANDARD_RULES: [(Bucket, &[&str]); 2] = [
    (
        Bucket::Wants,
        &[
            "food and drink",
            "travel",
            "recreation",
            "shops",
            "entertainment",
            "restaurants",
        ],
    ),
    (
        Bucket::Needs,
        &[
            "transfer",
            "payment",
            "credit card",
            "rent",
            "utilities",
            "healthcare",
            "bank fees",
            "tax",
        ],
    ),
];

/// Maps provider category labels to budget buckets.
///
/// Labels are stored lowercase and each label belongs to at most one bucket,
/// so a lookup never depends on the order rules were declared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: HashMap<String, Bucket>,
}

impl RuleTable {
    /// Builds a table from `(bucket, labels)` pairs, rejecting labels that
    /// are empty, repeated across buckets, or aimed at [`Bucket::NoCat`].
    pub fn new<I, L, S>(rules: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (Bucket, L)>,
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = HashMap::new();

        for (bucket, labels) in rules {
            if bucket == Bucket::NoCat {
                return Err(RuleError::ReservedBucket(bucket));
            }

            for label in labels {
                let label = label.as_ref().to_lowercase();
                if label.is_empty() {
                    return Err(RuleError::EmptyLabel(bucket));
                }

                if let Some(first) = table.get(&label) {
                    return Err(RuleError::DuplicateLabel {
                        label,
                        first: *first,
                        second: bucket,
                    });
                }

                table.insert(label, bucket);
            }
        }

        Ok(Self { rules: table })
    }

    /// The built-in rule table.
    pub fn standard() -> Self {
        let rules = STANDARD_RULES
            .iter()
            .flat_map(|(bucket, labels)| labels.iter().map(move |l| (l.to_string(), *bucket)))
            .collect();

        Self { rules }
    }

    /// Returns the bucket a label maps to, if any rule matches.
    pub fn get(&self, label: &str) -> Option<Bucket> {
        self.rules.get(&label.to_lowercase()).copied()
    }

    /// Returns the bucket a label maps to, [`Bucket::NoCat`] when no rule
    /// matches.
    pub fn lookup(&self, label: &str) -> Bucket {
        self.get(label).unwrap_or(Bucket::NoCat)
    }

    /// Labels assigned to `bucket`, sorted.
    pub fn labels(&self, bucket: Bucket) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .rules
            .iter()
            .filter(|(_, b)| **b == bucket)
            .map(|(label, _)| label.as_str())
            .collect();
        labels.sort_unstable();
        labels
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_passes_validation() {
        let validated = RuleTable::new(STANDARD_RULES.iter().map(|(b, l)| (*b, l.iter())));
        assert_eq!(validated, Ok(RuleTable::standard()));
    }

    #[test]
    fn lookup_ignores_case() {
        let table = RuleTable::standard();
        let tests = vec![
            ("Travel", Bucket::Wants),
            ("TRAVEL", Bucket::Wants),
            ("Food and Drink", Bucket::Wants),
            ("Transfer", Bucket::Needs),
            ("credit card", Bucket::Needs),
            ("Unknown Thing", Bucket::NoCat),
            ("", Bucket::NoCat),
        ];

        for t in tests {
            assert_eq!(table.lookup(t.0), t.1, "label {:?}", t.0);
        }
    }

    #[test]
    fn lookup_is_exact_match() {
        let table = RuleTable::standard();
        assert_eq!(table.get("travel agency"), None);
        assert_eq!(table.get(" travel"), None);
    }

    #[test]
    fn standard_table_has_no_savings_rules() {
        assert!(RuleTable::standard().labels(Bucket::Savings).is_empty());
    }

    #[test]
    fn rejects_label_in_two_buckets() {
        let err = RuleTable::new(vec![
            (Bucket::Wants, vec!["Travel"]),
            (Bucket::Needs, vec!["travel"]),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            RuleError::DuplicateLabel {
                label: "travel".into(),
                first: Bucket::Wants,
                second: Bucket::Needs,
            }
        );
    }

    #[test]
    fn rejects_invalid_rules() {
        assert_eq!(
            RuleTable::new(vec![(Bucket::NoCat, vec!["misc"])]).unwrap_err(),
            RuleError::ReservedBucket(Bucket::NoCat)
        );
        assert_eq!(
            RuleTable::new(vec![(Bucket::Savings, vec![""])]).unwrap_err(),
            RuleError::EmptyLabel(Bucket::Savings)
        );
    }

    #[test]
    fn custom_table_replaces_standard_rules() {
        let table = RuleTable::new(vec![
            (Bucket::Savings, vec!["Investment", "Deposit"]),
            (Bucket::Wants, vec!["Travel"]),
        ])
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("deposit"), Bucket::Savings);
        assert_eq!(table.lookup("transfer"), Bucket::NoCat);
        assert_eq!(table.labels(Bucket::Savings), vec!["deposit", "investment"]);
    }
}
