mod commands;

use anyhow::Result;
use clap::{arg, Command};
use plaid_budget::settings::Settings;
use plaid_budget::CLIENT_NAME;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

fn cli() -> Command<'static> {
    Command::new(CLIENT_NAME)
        .about("Links a Plaid item and summarizes its transactions into wants, needs, and savings.")
        .version("0.1.0")
        .subcommand_required(true)
        .allow_external_subcommands(false)
        .arg(arg!(CONFIG: -c --config [FILE] "Sets a custom config file"))
        .arg(arg!(verbose: -v --verbose "Logs debug output"))
        .subcommand(Command::new("serve").about("Serves the link, account, transaction, and chart endpoints."))
        .subcommand(Command::new("summary")
            .about("Prints per bucket totals for the transactions of a linked item.")
            .arg(arg!(token: -t --token <ACCESS_TOKEN> "Access token of the linked item."))
            .arg(arg!(begin: --begin [DATE] "The first day of transactions to pull, defaults to the configured lookback. Start date is inclusive."))
            .arg(arg!(until: --until [DATE] "The last day of transactions to pull, defaults to today. End date is inclusive.")))
        .subcommand(Command::new("transactions")
            .about("Prints the transaction feed of a linked item as JSON, accounts keyed by ID.")
            .arg(arg!(token: -t --token <ACCESS_TOKEN> "Access token of the linked item."))
            .arg(arg!(begin: --begin [DATE] "The first day of transactions to pull."))
            .arg(arg!(until: --until [DATE] "The last day of transactions to pull.")))
        .subcommand(Command::new("rules").about("Prints the active category rules."))
}

async fn run() -> Result<()> {
    let matches = cli().get_matches();

    let level = if matches.is_present("verbose") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new(matches.value_of("CONFIG"))?;

    match matches.subcommand() {
        Some(("serve", _)) => commands::serve(settings).await?,
        Some(("summary", summary_matches)) => commands::summary(summary_matches, settings).await?,
        Some(("transactions", txn_matches)) => {
            commands::transactions(txn_matches, settings).await?
        }
        Some(("rules", _)) => commands::rules(settings)?,
        None => unreachable!("subcommand is required"),
        _ => unreachable!(),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        println!("{:#}", err);
        std::process::exit(1);
    }
}
