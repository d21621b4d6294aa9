use std::{env, fmt, str::FromStr};

use thiserror::Error;

/// Default table holding subscriptions.
pub const SUBSCRIPTIONS_DEFAULT_TABLE_NAME: &str = "subscriptions";

/// Default table holding confirmation codes.
pub const CONFIRMATIONS_DEFAULT_TABLE_NAME: &str = "confirmations";

/// Capacity used for provisioned tables when none is given.
pub const DEFAULT_CAPACITY_UNITS: i64 = 5;

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown billing mode: {0}")]
    UnknownBillingMode(String),

    #[error("Invalid DSN pair '{0}', expected key=value")]
    MalformedPair(String),

    #[error("Unknown DSN key: {0}")]
    UnknownKey(String),

    #[error("Empty value for DSN key: {0}")]
    EmptyValue(String),
}

/// How the table is billed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BillingMode {
    #[default]
    PayPerRequest,
    Provisioned {
        read_capacity_units: i64,
        write_capacity_units: i64,
    },
}

impl fmt::Display for BillingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingMode::PayPerRequest => write!(f, "PAY_PER_REQUEST"),
            BillingMode::Provisioned { .. } => write!(f, "PROVISIONED"),
        }
    }
}

impl FromStr for BillingMode {
    type Err = ConfigError;

    /// Accepts the DynamoDB names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PAY_PER_REQUEST" => Ok(BillingMode::PayPerRequest),
            "PROVISIONED" => Ok(BillingMode::Provisioned {
                read_capacity_units: DEFAULT_CAPACITY_UNITS,
                write_capacity_units: DEFAULT_CAPACITY_UNITS,
            }),
            _ => Err(ConfigError::UnknownBillingMode(s.to_string())),
        }
    }
}

/// Options for a single table-backed database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseOptions {
    pub table_name: String,
    pub billing_mode: BillingMode,
    /// Ensure the table exists when the database is constructed.
    pub create_table: bool,
    /// Most items a single scan request examines. `None` leaves paging to
    /// the service's 1 MB page size.
    pub scan_limit: Option<i32>,
}

impl DatabaseOptions {
    /// Defaults for the subscriptions table.
    pub fn subscriptions() -> Self {
        Self::for_table(SUBSCRIPTIONS_DEFAULT_TABLE_NAME)
    }

    /// Defaults for the confirmations table.
    pub fn confirmations() -> Self {
        Self::for_table(CONFIRMATIONS_DEFAULT_TABLE_NAME)
    }

    fn for_table(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            billing_mode: BillingMode::PayPerRequest,
            create_table: false,
            scan_limit: None,
        }
    }

    /// Sets the table name.
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Sets the billing mode.
    pub fn with_billing_mode(mut self, billing_mode: BillingMode) -> Self {
        self.billing_mode = billing_mode;
        self
    }

    /// Sets whether the table is created on construction.
    pub fn with_create_table(mut self, create_table: bool) -> Self {
        self.create_table = create_table;
        self
    }

    /// Caps the items examined per scan request. Values below one are raised to one.
    pub fn with_scan_limit(mut self, limit: i32) -> Self {
        self.scan_limit = Some(limit.max(1));
        self
    }
}

/// Where AWS credentials come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// The SDK's default provider chain (environment, profile, instance role).
    Default,
    /// Placeholder static credentials, enough for DynamoDB Local.
    Anonymous,
    /// A named profile from the shared AWS config files.
    Profile(String),
}

/// AWS client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
    pub credentials: Credentials,
}

impl Default for AwsConfig {
    /// Reads `AWS_ENDPOINT_URL` and `AWS_REGION` (default: "us-east-1").
    fn default() -> Self {
        Self {
            endpoint_url: env::var("AWS_ENDPOINT_URL").ok(),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            credentials: Credentials::Default,
        }
    }
}

impl AwsConfig {
    /// Builds a configuration from a connection string, falling back to the
    /// environment for anything the string leaves out.
    pub fn from_dsn(dsn: &str) -> Result<Self, ConfigError> {
        parse_dsn(dsn, Self::default())
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Parses a DSN of space-separated `key=value` pairs on top of `base`.
///
/// Recognized keys:
/// - `region` - AWS region
/// - `endpoint` - custom endpoint URL
/// - `credentials` - `env:` or `iam:` for the default chain, `anon:` for
///   placeholder credentials, anything else names a profile
pub fn parse_dsn(dsn: &str, base: AwsConfig) -> Result<AwsConfig, ConfigError> {
    let mut config = base;

    for pair in dsn.split_whitespace() {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedPair(pair.to_string()))?;

        if value.is_empty() {
            return Err(ConfigError::EmptyValue(key.to_string()));
        }

        match key {
            "region" => config.region = value.to_string(),
            "endpoint" => config.endpoint_url = Some(value.to_string()),
            "credentials" => config.credentials = parse_credentials(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    Ok(config)
}

fn parse_credentials(value: &str) -> Credentials {
    match value {
        "env:" | "iam:" => Credentials::Default,
        "anon:" => Credentials::Anonymous,
        profile => Credentials::Profile(profile.to_string()),
    }
}
