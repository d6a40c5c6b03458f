use std::collections::BTreeMap;

use tracing::debug;

use crate::Account;

/// Keys accounts by id. When two accounts share an id the later one wins.
pub fn index_accounts<I>(accounts: I) -> BTreeMap<String, Account>
where
    I: IntoIterator<Item = Account>,
{
    accounts
        .into_iter()
        .fold(BTreeMap::new(), |mut index, account| {
            if let Some(previous) = index.insert(account.id.clone(), account) {
                debug!(account_id = %previous.id, "replacing account with duplicate id");
            }
            index
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{json, Map, Value};

    fn account(id: &str, v: i64) -> Account {
        let mut details = Map::new();
        details.insert("v".into(), Value::from(v));
        Account {
            id: id.into(),
            details,
        }
    }

    #[test]
    fn later_duplicate_wins() {
        let index = index_accounts(vec![account("a", 1), account("a", 2)]);

        assert_eq!(index.len(), 1);
        assert_eq!(index["a"], account("a", 2));
        assert_eq!(
            serde_json::to_value(&index).unwrap(),
            json!({"a": {"account_id": "a", "v": 2}})
        );
    }

    #[test]
    fn reindexing_values_is_idempotent() {
        let index = index_accounts(vec![account("b", 1), account("a", 2), account("c", 3)]);
        let again = index_accounts(index.values().cloned());

        assert_eq!(index, again);
    }

    #[test]
    fn empty_input_yields_empty_index() {
        assert!(index_accounts(Vec::new()).is_empty());
    }
}
