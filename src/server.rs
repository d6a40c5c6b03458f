use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{self, InvalidHeaderValue},
        HeaderValue, Method,
    },
    routing::{get, post},
    Json, Router,
};
use budget_summary::{ChartDataset, IndexedFetchResult};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use ulid::Ulid;

use crate::error::Error;
use crate::service::BudgetService;
use crate::upstream::{DateRange, ProviderGateway};

/// Immutable state shared by every request.
pub struct AppState<G> {
    pub service: BudgetService<G>,
    /// Length of the default transaction window.
    pub lookback_days: u32,
}

#[derive(Debug, Deserialize)]
struct LinkTokenBody {
    client_user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PublicTokenBody {
    public_token: String,
}

#[derive(Debug, Deserialize)]
struct AccessTokenBody {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FeedBody {
    access_token: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl FeedBody {
    fn range(&self, today: NaiveDate, lookback_days: u32) -> Result<DateRange, Error> {
        let end = self.end_date.unwrap_or(today);
        let start = self
            .start_date
            .unwrap_or_else(|| DateRange::ending(end, lookback_days).start);

        DateRange::new(start, end).ok_or_else(|| {
            Error::BadRequest(format!("start_date {} is after end_date {}", start, end))
        })
    }
}

/// Builds the HTTP routes. `allowed_origins` may contain `*` to allow any
/// origin, in which case credentials are not allowed.
pub fn router<G: ProviderGateway + 'static>(
    state: AppState<G>,
    allowed_origins: &[String],
) -> Result<Router, InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    let cors = if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins = allowed_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        cors.allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    };

    Ok(Router::new()
        .route("/health", get(health))
        .route("/api/create_link_token", post(create_link_token::<G>))
        .route("/api/set_access_token", post(set_access_token::<G>))
        .route("/api/accounts", post(accounts::<G>))
        .route("/api/transactions", post(transactions::<G>))
        .route("/api/chart/summary", post(chart_summary::<G>))
        .layer(Extension(Arc::new(state)))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn create_link_token<G: ProviderGateway + 'static>(
    Extension(state): Extension<Arc<AppState<G>>>,
    body: Option<Json<LinkTokenBody>>,
) -> Result<Json<Value>, Error> {
    let user_id = body
        .and_then(|Json(body)| body.client_user_id)
        .unwrap_or_else(|| Ulid::new().to_string());

    Ok(Json(
        state.service.gateway().create_link_token(&user_id).await?,
    ))
}

async fn set_access_token<G: ProviderGateway + 'static>(
    Extension(state): Extension<Arc<AppState<G>>>,
    Json(body): Json<PublicTokenBody>,
) -> Result<Json<Value>, Error> {
    Ok(Json(
        state
            .service
            .gateway()
            .exchange_public_token(&body.public_token)
            .await?,
    ))
}

async fn accounts<G: ProviderGateway + 'static>(
    Extension(state): Extension<Arc<AppState<G>>>,
    Json(body): Json<AccessTokenBody>,
) -> Result<Json<Value>, Error> {
    Ok(Json(
        state.service.gateway().accounts(&body.access_token).await?,
    ))
}

async fn transactions<G: ProviderGateway + 'static>(
    Extension(state): Extension<Arc<AppState<G>>>,
    Json(body): Json<FeedBody>,
) -> Result<Json<IndexedFetchResult>, Error> {
    let range = body.range(Local::now().date_naive(), state.lookback_days)?;

    Ok(Json(
        state.service.transactions(&body.access_token, range).await?,
    ))
}

async fn chart_summary<G: ProviderGateway + 'static>(
    Extension(state): Extension<Arc<AppState<G>>>,
    Json(body): Json<FeedBody>,
) -> Result<Json<ChartDataset>, Error> {
    let range = body.range(Local::now().date_naive(), state.lookback_days)?;

    Ok(Json(state.service.summary(&body.access_token, range).await?))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}

/// Serves `router` on `addr` until Ctrl+C or SIGTERM.
pub async fn serve(addr: SocketAddr, router: Router) -> anyhow::Result<()> {
    let server = axum::Server::bind(&addr).serve(router.into_make_service());
    info!(addr = %server.local_addr(), "listening");

    server.with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn body(start: Option<NaiveDate>, end: Option<NaiveDate>) -> FeedBody {
        FeedBody {
            access_token: "access-sandbox-123".into(),
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn feed_range_defaults_to_lookback_window() {
        let today = date(2022, 12, 30);
        let tests = vec![
            (body(None, None), date(2022, 12, 20), today),
            (body(Some(date(2021, 1, 1)), None), date(2021, 1, 1), today),
            (
                body(None, Some(date(2022, 6, 10))),
                date(2022, 5, 31),
                date(2022, 6, 10),
            ),
        ];

        for t in tests {
            let range = t.0.range(today, 10).unwrap();
            assert_eq!((range.start, range.end), (t.1, t.2));
        }
    }

    #[test]
    fn feed_range_rejects_inverted_dates() {
        let err = body(Some(date(2022, 12, 30)), Some(date(2021, 1, 1)))
            .range(date(2023, 1, 1), 10)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "start_date 2022-12-30 is after end_date 2021-01-01"
        );
    }
}
