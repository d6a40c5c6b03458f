use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{index_accounts, Bucket, Classifier, ContractError, FetchResult, IndexedFetchResult};

const DATASET_LABEL: &str = "categories";

/// Display color per bucket. Passed through to the chart untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartColors {
    pub wants: String,
    pub needs: String,
    pub savings: String,
    pub no_cat: String,
}

impl ChartColors {
    fn in_order(&self) -> Vec<String> {
        Bucket::ALL
            .iter()
            .map(|bucket| match bucket {
                Bucket::Wants => self.wants.clone(),
                Bucket::Needs => self.needs.clone(),
                Bucket::Savings => self.savings.clone(),
                Bucket::NoCat => self.no_cat.clone(),
            })
            .collect()
    }
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            wants: "#FF6384".into(),
            needs: "#36A2EB".into(),
            savings: "#4BC0C0".into(),
            no_cat: "#C9CBCF".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub labels: Vec<Bucket>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Decimal>,
    pub background_color: Vec<String>,
}

/// Absolute transaction totals and counts per bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    totals: [Decimal; 4],
    counts: [usize; 4],
}

impl Summary {
    fn add(&mut self, bucket: Bucket, amount: Decimal) -> Option<()> {
        let total = &mut self.totals[bucket.position()];
        *total = total.checked_add(amount.abs())?;
        self.counts[bucket.position()] += 1;
        Some(())
    }

    pub fn total(&self, bucket: Bucket) -> Decimal {
        self.totals[bucket.position()]
    }

    pub fn count(&self, bucket: Bucket) -> usize {
        self.counts[bucket.position()]
    }

    /// Sum over every bucket, saturating at [`Decimal::MAX`].
    pub fn grand_total(&self) -> Decimal {
        self.totals
            .iter()
            .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(*t))
            .unwrap_or(Decimal::MAX)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, Decimal)> + '_ {
        Bucket::ALL.into_iter().map(move |b| (b, self.total(b)))
    }

    pub fn to_chart(&self, colors: &ChartColors) -> ChartDataset {
        ChartDataset {
            labels: Bucket::ALL.to_vec(),
            datasets: vec![Dataset {
                label: DATASET_LABEL.to_string(),
                data: self.totals.to_vec(),
                background_color: colors.in_order(),
            }],
        }
    }
}

/// Replaces the account list with an id keyed mapping.
pub fn reindex_and_return(result: FetchResult) -> IndexedFetchResult {
    IndexedFetchResult {
        accounts: index_accounts(result.accounts),
        transactions: result.transactions,
        extra: result.extra,
    }
}

/// Totals the absolute amount of every transaction under its bucket. Fails
/// when a bucket total no longer fits in a [`Decimal`].
#[instrument(skip_all, fields(transactions = result.transactions.len()))]
pub fn summarize(
    result: &FetchResult,
    classifier: &Classifier<'_>,
) -> Result<Summary, ContractError> {
    result
        .transactions
        .iter()
        .enumerate()
        .try_fold(Summary::default(), |mut summary, (index, txn)| {
            let bucket = classifier.classify_transaction(txn);
            if bucket == Bucket::NoCat {
                debug!(labels = ?txn.category_labels, "no rule matched transaction");
            }
            summary
                .add(bucket, txn.amount)
                .ok_or(ContractError::Overflow { bucket, index })?;
            Ok(summary)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::RuleTable;

    fn fetch(transactions: serde_json::Value) -> FetchResult {
        FetchResult::from_value(json!({
            "accounts": [{"account_id": "1"}],
            "transactions": transactions,
        }))
        .unwrap()
    }

    #[test]
    fn totals_absolute_amounts_per_bucket() {
        let rules = RuleTable::standard();
        let result = fetch(json!([
            {"amount": -10, "category": ["food and drink"]},
            {"amount": 5, "category": ["credit card"]},
        ]));

        let summary = summarize(&result, &Classifier::new(&rules)).unwrap();

        assert_eq!(
            summary.iter().collect::<Vec<_>>(),
            vec![
                (Bucket::Wants, dec!(10)),
                (Bucket::Needs, dec!(5)),
                (Bucket::Savings, dec!(0)),
                (Bucket::NoCat, dec!(0)),
            ]
        );
        assert_eq!(summary.count(Bucket::Wants), 1);
        assert_eq!(summary.count(Bucket::Savings), 0);
    }

    #[test]
    fn empty_feed_still_reports_every_bucket() {
        let rules = RuleTable::standard();
        let summary = summarize(&fetch(json!([])), &Classifier::new(&rules)).unwrap();
        let chart = summary.to_chart(&ChartColors::default());

        assert_eq!(chart.labels, Bucket::ALL.to_vec());
        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(chart.datasets[0].data, vec![Decimal::ZERO; 4]);
        assert_eq!(chart.datasets[0].background_color.len(), 4);
    }

    #[test]
    fn totals_are_conserved() {
        let rules = RuleTable::standard();
        let result = fetch(json!([
            {"amount": -42.5, "category": ["Travel"]},
            {"amount": 19.99, "category": ["Transfer", "Travel"]},
            {"amount": 0.01, "category": []},
            {"amount": -7, "category": ["Unknown Thing"]},
            {"amount": 100.10, "category": ["Shops", "Payment"]},
        ]));

        let summary = summarize(&result, &Classifier::new(&rules)).unwrap();
        let expected: Decimal = result.transactions.iter().map(|t| t.amount.abs()).sum();

        assert_eq!(summary.grand_total(), expected);
        assert_eq!(summary.total(Bucket::Wants), dec!(142.6));
        assert_eq!(summary.total(Bucket::Needs), dec!(19.99));
        assert_eq!(summary.total(Bucket::NoCat), dec!(7.01));
    }

    #[test]
    fn chart_serializes_in_fixed_order() {
        let rules = RuleTable::standard();
        let result = fetch(json!([{"amount": -3, "category": ["Rent"]}]));
        let chart = summarize(&result, &Classifier::new(&rules))
            .unwrap()
            .to_chart(&ChartColors::default());

        assert_eq!(
            serde_json::to_value(&chart).unwrap(),
            json!({
                "labels": ["wants", "needs", "savings", "no-cat"],
                "datasets": [{
                    "label": "categories",
                    "data": [0.0, 3.0, 0.0, 0.0],
                    "backgroundColor": ["#FF6384", "#36A2EB", "#4BC0C0", "#C9CBCF"],
                }],
            })
        );
    }

    #[test]
    fn bucket_overflow_is_an_error() {
        let rules = RuleTable::standard();
        let mut result = fetch(json!([
            {"amount": 1, "category": ["Rent"]},
            {"amount": 1, "category": ["Travel"]},
            {"amount": 1, "category": ["Travel"]},
        ]));
        result.transactions[1].amount = Decimal::MAX;
        result.transactions[2].amount = Decimal::MIN;

        match summarize(&result, &Classifier::new(&rules)) {
            Err(ContractError::Overflow { bucket, index }) => {
                assert_eq!(bucket, Bucket::Wants);
                assert_eq!(index, 2);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn reindex_keeps_everything_but_the_account_list() {
        let result = FetchResult::from_value(json!({
            "accounts": [
                {"account_id": "a", "v": 1},
                {"account_id": "b", "v": 1},
                {"account_id": "a", "v": 2},
            ],
            "transactions": [{"amount": 1, "category": [], "account_id": "missing"}],
            "item": {"item_id": "item-1"},
        }))
        .unwrap();

        let indexed = reindex_and_return(result.clone());

        assert_eq!(indexed.accounts.len(), 2);
        assert_eq!(indexed.accounts["a"].details["v"], 2);
        assert_eq!(indexed.transactions, result.transactions);
        assert_eq!(indexed.extra, result.extra);
    }
}
