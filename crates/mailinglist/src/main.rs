//! Creates the DynamoDB tables the mailing list stores its data in.

use anyhow::bail;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailinglist::config::{
    AwsConfig, BillingMode, DatabaseOptions, CONFIRMATIONS_DEFAULT_TABLE_NAME,
    SUBSCRIPTIONS_DEFAULT_TABLE_NAME,
};
use mailinglist::storage::dynamodb::setup::{
    calculate_setup_plan, confirmations_table_config, format_setup_plan,
    subscriptions_table_config, SetupPlan,
};
use mailinglist::storage::dynamodb::{create_client, get_table_state};
use mailinglist::storage::{DynamoDbConfirmationsDatabase, DynamoDbSubscriptionsDatabase};

mod prelude;

use crate::prelude::*;

/// Ensure the mailing list tables exist
#[derive(Debug, Parser)]
#[command(name = "setup-tables")]
#[command(version, about, long_about = "Ensure the mailing list tables exist.

Missing tables are created; existing tables are left untouched.

Connection string (space-separated key=value pairs):
  region=<region>        AWS region (defaults to AWS_REGION, then us-east-1)
  endpoint=<url>         Custom endpoint (defaults to AWS_ENDPOINT_URL)
  credentials=<source>   env: or iam: (default chain), anon: (DynamoDB Local),
                         or a profile name")]
struct Cli {
    #[command(flatten)]
    global: Global,

    /// Subscriptions table name
    #[arg(long, default_value = SUBSCRIPTIONS_DEFAULT_TABLE_NAME)]
    subscriptions_table: String,

    /// Confirmations table name
    #[arg(long, default_value = CONFIRMATIONS_DEFAULT_TABLE_NAME)]
    confirmations_table: String,

    /// Database connection string
    #[arg(long, env = "MAILINGLIST_DSN", default_value = "")]
    dsn: String,

    /// Billing mode for new tables (PAY_PER_REQUEST or PROVISIONED)
    #[arg(long, default_value = "PAY_PER_REQUEST")]
    billing_mode: BillingMode,

    /// Print the plan without creating anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Silence the command output
    #[clap(long, global = true)]
    pub silent: bool,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Debug, Clone, Copy)]
enum Table {
    Subscriptions,
    Confirmations,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.global.is_verbose() {
        "mailinglist=debug,setup_tables=debug"
    } else {
        "mailinglist=info,setup_tables=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let aws_config = AwsConfig::from_dsn(&cli.dsn)?;

    if !cli.global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), aws_config.target_display());
        aprintln!();
    }

    let client = create_client(&aws_config).await;

    let tables = [
        (
            Table::Subscriptions,
            DatabaseOptions::subscriptions().with_table_name(&cli.subscriptions_table),
        ),
        (
            Table::Confirmations,
            DatabaseOptions::confirmations().with_table_name(&cli.confirmations_table),
        ),
    ];

    let mut failed = Vec::new();
    for (table, options) in tables {
        let options = options
            .with_billing_mode(cli.billing_mode)
            .with_create_table(true);

        if let Err(e) = setup_table(&client, table, options.clone(), &cli).await {
            tracing::error!(table = %options.table_name, error = %e, "Failed to set up table");
            failed.push(options.table_name);
        }
    }

    if !failed.is_empty() {
        bail!("Failed to set up tables: {}", failed.join(", "));
    }

    if !cli.global.is_silent() {
        aprintln!("{}", p_g("Tables are ready."));
    }

    Ok(())
}

async fn setup_table(
    client: &aws_sdk_dynamodb::Client,
    table: Table,
    options: DatabaseOptions,
    cli: &Cli,
) -> anyhow::Result<()> {
    let config = match table {
        Table::Subscriptions => subscriptions_table_config(&options),
        Table::Confirmations => confirmations_table_config(&options),
    };

    let current_state = get_table_state(client, &config.table_name).await?;
    let plan = calculate_setup_plan(current_state.as_ref(), &config);

    if !cli.global.is_silent() {
        aprintln!("{}", p_c("Setup Plan:"));
        for line in format_setup_plan(&plan) {
            aprintln!("  {}", p_plan(&line));
        }
        aprintln!();
    }

    match &plan {
        SetupPlan::Deleting { table_name } => {
            bail!("Table '{}' is being deleted, try again once it is gone", table_name)
        }
        SetupPlan::Unusable { table_name, status } => {
            bail!("Table '{}' is not usable (status: {})", table_name, status)
        }
        _ => {}
    }

    if cli.dry_run || matches!(plan, SetupPlan::NoChanges { .. }) {
        return Ok(());
    }

    match table {
        Table::Subscriptions => {
            DynamoDbSubscriptionsDatabase::new(client.clone(), options).await?;
        }
        Table::Confirmations => {
            DynamoDbConfirmationsDatabase::new(client.clone(), options).await?;
        }
    }

    tracing::info!(table = %config.table_name, "Table is active");
    Ok(())
}
