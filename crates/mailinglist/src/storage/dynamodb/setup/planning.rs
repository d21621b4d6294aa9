//! Pure functions for calculating setup plans.

use crate::config::{BillingMode, DatabaseOptions};

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub billing_mode: BillingMode,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

/// DynamoDB attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
}

impl TableConfig {
    /// A table keyed by a single string attribute.
    pub fn with_string_key(options: &DatabaseOptions, key: &str) -> Self {
        Self {
            table_name: options.table_name.clone(),
            partition_key: KeyAttribute {
                name: key.to_string(),
                attribute_type: AttributeType::String,
            },
            billing_mode: options.billing_mode,
        }
    }
}

/// The subscriptions table, keyed by `address`.
pub fn subscriptions_table_config(options: &DatabaseOptions) -> TableConfig {
    TableConfig::with_string_key(options, "address")
}

/// The confirmations table, keyed by `code`.
pub fn confirmations_table_config(options: &DatabaseOptions) -> TableConfig {
    TableConfig::with_string_key(options, "code")
}

/// Represents the current state of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub status: TableStatus,
}

/// Table status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
    /// Archived, locked out by its encryption key, or a status this crate
    /// does not know. Carries the status as DynamoDB reported it.
    Unusable(String),
}

/// Planned changes for setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupPlan {
    /// Table doesn't exist, needs to be created.
    CreateTable { config: TableConfig },
    /// Table exists but is still settling.
    AwaitActive { table_name: String },
    /// Table is being deleted and cannot be used.
    Deleting { table_name: String },
    /// Table exists but cannot serve requests.
    Unusable { table_name: String, status: String },
    /// Table is ready, no changes needed.
    NoChanges { table_name: String },
}

/// Calculate what is needed to reach the desired state.
///
/// An existing table is never altered, even if its billing mode differs.
pub fn calculate_setup_plan(current: Option<&TableState>, desired: &TableConfig) -> SetupPlan {
    let table_name = desired.table_name.clone();
    match current.map(|state| &state.status) {
        None => SetupPlan::CreateTable {
            config: desired.clone(),
        },
        Some(TableStatus::Active) => SetupPlan::NoChanges { table_name },
        Some(TableStatus::Creating | TableStatus::Updating) => {
            SetupPlan::AwaitActive { table_name }
        }
        Some(TableStatus::Deleting) => SetupPlan::Deleting { table_name },
        Some(TableStatus::Unusable(status)) => SetupPlan::Unusable {
            table_name,
            status: status.clone(),
        },
    }
}

/// Format a setup plan for display.
pub fn format_setup_plan(plan: &SetupPlan) -> Vec<String> {
    match plan {
        SetupPlan::CreateTable { config } => {
            let mut lines = vec![
                format!("+ Create table: {}", config.table_name),
                format!("  Partition key: {} (S)", config.partition_key.name),
            ];
            match config.billing_mode {
                BillingMode::PayPerRequest => lines.push("  Billing: PAY_PER_REQUEST".to_string()),
                BillingMode::Provisioned {
                    read_capacity_units,
                    write_capacity_units,
                } => lines.push(format!(
                    "  Billing: PROVISIONED (read: {}, write: {})",
                    read_capacity_units, write_capacity_units
                )),
            }
            lines
        }
        SetupPlan::AwaitActive { table_name } => {
            vec![format!("~ Wait for table '{}' to become active", table_name)]
        }
        SetupPlan::Deleting { table_name } => {
            vec![format!("- Table '{}' is being deleted", table_name)]
        }
        SetupPlan::Unusable { table_name, status } => {
            vec![format!("- Table '{}' is not usable (status: {})", table_name, status)]
        }
        SetupPlan::NoChanges { table_name } => {
            vec![format!("= Table '{}' is up to date", table_name)]
        }
    }
}
