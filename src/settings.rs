use std::fmt;
use std::str::FromStr;

use budget_summary::{Bucket, ChartColors, RuleTable};
use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;

use crate::CLIENT_NAME;

const CONFIG_NAME: &str = "config.toml";
const ENV_PREFIX: &str = "PLAID_BUDGET";
const MAX_PAGE_SIZE: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub plaid: Plaid,
    pub transactions: Transactions,
    pub chart: Chart,
    pub rules: Option<Rules>,
    pub display: Display,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Plaid {
    pub client_id: String,
    pub secret: String,
    pub env: PlaidEnvironment,
    pub client_name: String,
    pub language: String,
    pub country_codes: Vec<String>,
    pub products: Vec<String>,
    /// Overrides the environment host, e.g. for a local mock.
    pub base_url: Option<String>,
    pub page_size: u32,
}

#[derive(Debug, Deserialize)]
pub struct Transactions {
    pub lookback_days: u32,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub colors: ChartColors,
}

/// Replaces the built-in rule table when present.
#[derive(Debug, Default, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub wants: Vec<String>,
    #[serde(default)]
    pub needs: Vec<String>,
    #[serde(default)]
    pub savings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Display {
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum PlaidEnvironment {
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    pub fn host(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Development => "https://development.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }
}

impl FromStr for PlaidEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sandbox" => Ok(PlaidEnvironment::Sandbox),
            "development" => Ok(PlaidEnvironment::Development),
            "production" => Ok(PlaidEnvironment::Production),
            _ => Err(format!(
                "Plaid environment must be one of SANDBOX, DEVELOPMENT, or PRODUCTION, got {:?}",
                s
            )),
        }
    }
}

impl TryFrom<String> for PlaidEnvironment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PlaidEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaidEnvironment::Sandbox => "sandbox",
            PlaidEnvironment::Development => "development",
            PlaidEnvironment::Production => "production",
        };
        f.write_str(name)
    }
}

impl Settings {
    /// Loads defaults, then the config file, then `PLAID_BUDGET__*`
    /// environment variables. An explicitly named file must exist.
    pub fn new(config_path: Option<&str>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load(File::with_name(path)),
            None => Self::load(File::with_name(&default_config_path()).required(false)),
        }
    }

    pub(crate) fn load<S>(file: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let colors = ChartColors::default();
        let settings: Settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000_i64)?
            .set_default("server.allowed_origins", vec!["http://localhost:3000"])?
            .set_default("plaid.client_id", "")?
            .set_default("plaid.secret", "")?
            .set_default("plaid.env", "sandbox")?
            .set_default("plaid.client_name", CLIENT_NAME)?
            .set_default("plaid.language", "en")?
            .set_default("plaid.country_codes", vec!["US"])?
            .set_default("plaid.products", vec!["auth", "transactions"])?
            .set_default("plaid.page_size", i64::from(MAX_PAGE_SIZE))?
            .set_default("transactions.lookback_days", 730_i64)?
            .set_default("chart.colors.wants", colors.wants)?
            .set_default("chart.colors.needs", colors.needs)?
            .set_default("chart.colors.savings", colors.savings)?
            .set_default("chart.colors.no_cat", colors.no_cat)?
            .set_default("display.currency", "USD")?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.rule_table()?;

        if rusty_money::iso::find(&self.display.currency).is_none() {
            return Err(ConfigError::Message(format!(
                "unknown display currency {:?}",
                self.display.currency
            )));
        }

        Ok(())
    }

    /// The configured rule table, or the built-in one when no `[rules]`
    /// section is present.
    pub fn rule_table(&self) -> Result<RuleTable, ConfigError> {
        match &self.rules {
            Some(rules) => RuleTable::new([
                (Bucket::Wants, &rules.wants),
                (Bucket::Needs, &rules.needs),
                (Bucket::Savings, &rules.savings),
            ])
            .map_err(|e| ConfigError::Message(format!("invalid category rules: {}", e))),
            None => Ok(RuleTable::standard()),
        }
    }
}

impl Plaid {
    /// Checks the options needed to talk to Plaid at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.is_empty() {
            return Err(ConfigError::Message(
                "Plaid client ID must not be empty".into(),
            ));
        }

        if self.secret.is_empty() {
            return Err(ConfigError::Message(
                "Plaid client secret must not be empty".into(),
            ));
        }

        if self.country_codes.is_empty() || self.products.is_empty() {
            return Err(ConfigError::Message(
                "Plaid country codes and products must not be empty".into(),
            ));
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Message(format!(
                "Plaid page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.env.host())
            .trim_end_matches('/')
    }
}

pub(crate) fn default_config_path() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(CLIENT_NAME)
        .join(CONFIG_NAME)
        .display()
        .to_string()
}
