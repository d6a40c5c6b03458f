use std::io::stdout;
use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::ArgMatches;
use plaid_budget::display::{print_rules, print_summary};
use plaid_budget::server::{self, AppState};
use plaid_budget::service::BudgetService;
use plaid_budget::settings::Settings;
use plaid_budget::upstream::{DateRange, PlaidGateway};

fn budget_service(settings: &Settings) -> Result<BudgetService<PlaidGateway>> {
    settings.plaid.validate()?;
    let gateway = PlaidGateway::new(settings.plaid.clone())?;

    Ok(BudgetService::new(
        gateway,
        settings.rule_table()?,
        settings.chart.colors.clone(),
    ))
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .with_context(|| format!("invalid date {:?}, expected YYYY-MM-DD", v))
        })
        .transpose()
}

fn date_range(matches: &ArgMatches, lookback_days: u32) -> Result<DateRange> {
    let end = parse_date(matches.value_of("until"))?.unwrap_or_else(|| Local::now().date_naive());
    let start = parse_date(matches.value_of("begin"))?
        .unwrap_or_else(|| DateRange::ending(end, lookback_days).start);

    DateRange::new(start, end).ok_or_else(|| anyhow!("begin {} is after until {}", start, end))
}

pub(crate) async fn serve(settings: Settings) -> Result<()> {
    let state = AppState {
        service: budget_service(&settings)?,
        lookback_days: settings.transactions.lookback_days,
    };
    let router = server::router(state, &settings.server.allowed_origins)
        .context("invalid allowed origin")?;

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;

    server::serve(addr, router).await
}

pub(crate) async fn summary(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let token = matches
        .value_of("token")
        .expect("access token is required by clap");
    let range = date_range(matches, settings.transactions.lookback_days)?;
    let currency = rusty_money::iso::find(&settings.display.currency)
        .ok_or_else(|| anyhow!("unknown currency {}", settings.display.currency))?;

    let totals = budget_service(&settings)?.totals(token, range).await?;
    print_summary(stdout(), &totals, currency)
}

pub(crate) async fn transactions(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let token = matches
        .value_of("token")
        .expect("access token is required by clap");
    let range = date_range(matches, settings.transactions.lookback_days)?;

    let feed = budget_service(&settings)?.transactions(token, range).await?;
    println!("{}", serde_json::to_string_pretty(&feed)?);

    Ok(())
}

pub(crate) fn rules(settings: Settings) -> Result<()> {
    print_rules(stdout(), &settings.rule_table()?)
}
