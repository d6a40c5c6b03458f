use crate::{Bucket, RuleTable, Transaction};

/// Assigns each transaction exactly one bucket from a [`RuleTable`].
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    rules: &'a RuleTable,
}

impl<'a> Classifier<'a> {
    pub fn new(rules: &'a RuleTable) -> Self {
        Self { rules }
    }

    /// Returns the bucket of the first label that matches a rule, in the
    /// order the provider listed them. Later labels are never consulted once
    /// one matches, even if they map elsewhere.
    pub fn classify<S: AsRef<str>>(&self, labels: &[S]) -> Bucket {
        labels
            .iter()
            .find_map(|label| self.rules.get(label.as_ref()))
            .unwrap_or(Bucket::NoCat)
    }

    pub fn classify_transaction(&self, txn: &Transaction) -> Bucket {
        self.classify(&txn.category_labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_label_wins() {
        let rules = RuleTable::standard();
        let classifier = Classifier::new(&rules);

        let tests: Vec<(Vec<&str>, Bucket)> = vec![
            (vec!["Travel"], Bucket::Wants),
            (vec!["Transfer", "Travel"], Bucket::Needs),
            (vec!["Travel", "Transfer"], Bucket::Wants),
            (vec!["Unknown Thing", "Payment", "Credit Card"], Bucket::Needs),
            (vec!["Unknown Thing"], Bucket::NoCat),
            (vec![], Bucket::NoCat),
        ];

        for t in tests {
            assert_eq!(classifier.classify(&t.0), t.1, "labels {:?}", t.0);
        }
    }

    #[test]
    fn uses_the_supplied_table() {
        let rules = RuleTable::new(vec![(Bucket::Savings, vec!["Transfer"])]).unwrap();
        let classifier = Classifier::new(&rules);

        assert_eq!(classifier.classify(&["Transfer", "Travel"]), Bucket::Savings);
        assert_eq!(classifier.classify(&["Travel"]), Bucket::NoCat);
    }
}
