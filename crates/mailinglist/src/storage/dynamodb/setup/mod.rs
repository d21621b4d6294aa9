//! Idempotent table creation.
//!
//! Planning is pure (`planning`); `deploy` talks to DynamoDB.

mod deploy;
mod error;
mod planning;

pub use deploy::{ensure_table, execute_setup_plan};
pub use error::{Result, SetupError};
pub use planning::{
    calculate_setup_plan, confirmations_table_config, format_setup_plan,
    subscriptions_table_config, AttributeType, KeyAttribute, SetupPlan, TableConfig, TableState,
    TableStatus,
};
