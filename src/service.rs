use budget_summary::{
    reindex_and_return, summarize, ChartColors, ChartDataset, Classifier, FetchResult,
    IndexedFetchResult, RuleTable, Summary,
};
use tracing::{info, instrument};

use crate::error::Error;
use crate::upstream::{DateRange, ProviderGateway};

/// Fetches a transaction feed for one access token and runs it through the
/// summary pipeline. Holds no per-request state.
pub struct BudgetService<G> {
    gateway: G,
    rules: RuleTable,
    colors: ChartColors,
}

impl<G: ProviderGateway> BudgetService<G> {
    pub fn new(gateway: G, rules: RuleTable, colors: ChartColors) -> Self {
        Self {
            gateway,
            rules,
            colors,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    async fn fetch(&self, access_token: &str, range: DateRange) -> Result<FetchResult, Error> {
        let raw = self.gateway.transactions(access_token, range).await?;
        let result = FetchResult::from_value(raw)?;
        info!(
            accounts = result.accounts.len(),
            transactions = result.transactions.len(),
            "fetched transaction feed"
        );

        Ok(result)
    }

    /// The raw feed with accounts keyed by id.
    #[instrument(skip(self, access_token))]
    pub async fn transactions(
        &self,
        access_token: &str,
        range: DateRange,
    ) -> Result<IndexedFetchResult, Error> {
        Ok(reindex_and_return(self.fetch(access_token, range).await?))
    }

    #[instrument(skip(self, access_token))]
    pub async fn totals(&self, access_token: &str, range: DateRange) -> Result<Summary, Error> {
        let result = self.fetch(access_token, range).await?;
        summarize(&result, &Classifier::new(&self.rules)).map_err(Error::Contract)
    }

    /// Per bucket totals shaped for the summary chart.
    pub async fn summary(&self, access_token: &str, range: DateRange) -> Result<ChartDataset, Error> {
        Ok(self.totals(access_token, range).await?.to_chart(&self.colors))
    }
}
