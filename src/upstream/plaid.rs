use axum::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::settings;
use crate::upstream::{DateRange, ProviderGateway, UpstreamError};

const PLAID_VERSION: &str = "2020-09-14";

const LINK_TOKEN_CREATE: &str = "/link/token/create";
const PUBLIC_TOKEN_EXCHANGE: &str = "/item/public_token/exchange";
const ACCOUNTS_GET: &str = "/accounts/get";
const TRANSACTIONS_GET: &str = "/transactions/get";

/// Every Plaid request carries the client credentials next to its own
/// fields.
#[derive(Serialize)]
struct Authenticated<'a, T> {
    client_id: &'a str,
    secret: &'a str,
    #[serde(flatten)]
    request: T,
}

#[derive(Serialize)]
struct LinkUser<'a> {
    client_user_id: &'a str,
}

#[derive(Serialize)]
struct CreateLinkTokenRequest<'a> {
    client_name: &'a str,
    language: &'a str,
    country_codes: &'a [String],
    products: &'a [String],
    user: LinkUser<'a>,
}

#[derive(Serialize)]
struct ExchangePublicTokenRequest<'a> {
    public_token: &'a str,
}

#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    access_token: &'a str,
}

#[derive(Serialize)]
struct GetTransactionsRequest<'a> {
    access_token: &'a str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    options: GetTransactionsOptions,
}

#[derive(Serialize)]
struct GetTransactionsOptions {
    count: u32,
    offset: usize,
}

pub struct PlaidGateway {
    http: reqwest::Client,
    settings: settings::Plaid,
}

impl PlaidGateway {
    pub fn new(settings: settings::Plaid) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, settings })
    }

    async fn post<T: Serialize>(&self, endpoint: &'static str, request: T) -> Result<Value, UpstreamError> {
        let body = Authenticated {
            client_id: &self.settings.client_id,
            secret: &self.settings.secret,
            request,
        };

        let res = self
            .http
            .post(format!("{}{}", self.settings.base_url(), endpoint))
            .header("Plaid-Version", PLAID_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let payload: Value = res.json().await?;
        debug!(endpoint, status = status.as_u16(), "provider responded");

        if !status.is_success() {
            return Err(UpstreamError::Provider {
                endpoint,
                status: status.as_u16(),
                body: payload,
            });
        }

        Ok(payload)
    }

    async fn transactions_page(
        &self,
        access_token: &str,
        range: DateRange,
        offset: usize,
    ) -> Result<Value, UpstreamError> {
        self.post(
            TRANSACTIONS_GET,
            GetTransactionsRequest {
                access_token,
                start_date: range.start,
                end_date: range.end,
                options: GetTransactionsOptions {
                    count: self.settings.page_size,
                    offset,
                },
            },
        )
        .await
    }
}

fn page_len(page: &Value) -> Option<usize> {
    page.get("transactions").and_then(Value::as_array).map(Vec::len)
}

#[async_trait]
impl ProviderGateway for PlaidGateway {
    #[instrument(skip(self))]
    async fn create_link_token(&self, client_user_id: &str) -> Result<Value, UpstreamError> {
        self.post(
            LINK_TOKEN_CREATE,
            CreateLinkTokenRequest {
                client_name: &self.settings.client_name,
                language: &self.settings.language,
                country_codes: &self.settings.country_codes,
                products: &self.settings.products,
                user: LinkUser { client_user_id },
            },
        )
        .await
    }

    #[instrument(skip_all)]
    async fn exchange_public_token(&self, public_token: &str) -> Result<Value, UpstreamError> {
        self.post(PUBLIC_TOKEN_EXCHANGE, ExchangePublicTokenRequest { public_token })
            .await
    }

    #[instrument(skip_all)]
    async fn accounts(&self, access_token: &str) -> Result<Value, UpstreamError> {
        self.post(ACCOUNTS_GET, AccessTokenRequest { access_token })
            .await
    }

    #[instrument(skip(self, access_token), fields(start = %range.start, end = %range.end))]
    async fn transactions(
        &self,
        access_token: &str,
        range: DateRange,
    ) -> Result<Value, UpstreamError> {
        let mut response = self.transactions_page(access_token, range, 0).await?;

        // Malformed pages are returned as is for the caller to reject.
        let mut fetched = match page_len(&response) {
            Some(len) => len,
            None => return Ok(response),
        };
        let total = response
            .get("total_transactions")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize;

        while fetched < total {
            let mut page = self.transactions_page(access_token, range, fetched).await?;
            let records = match page.get_mut("transactions").and_then(Value::as_array_mut) {
                Some(records) if !records.is_empty() => std::mem::take(records),
                _ => break,
            };

            debug!(offset = fetched, count = records.len(), total, "fetched transaction page");
            fetched += records.len();

            if let Some(list) = response
                .get_mut("transactions")
                .and_then(Value::as_array_mut)
            {
                list.extend(records);
            }
        }

        Ok(response)
    }
}
