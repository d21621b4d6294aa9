mod error;
mod filter;
mod pages;
mod traits;

pub use error::{DatabaseError, Result};
pub use filter::ConfirmationFilter;
pub use pages::{drain_pages, Page};
pub use traits::{
    ConfirmationsDatabase, ListConfirmationsFn, ListSubscriptionsFn, SubscriptionsDatabase,
};
