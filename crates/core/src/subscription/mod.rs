mod confirmation;
mod error;
mod types;

pub use confirmation::{Confirmation, ConfirmationAction};
pub use error::SubscriptionError;
pub use types::{Subscription, SubscriptionStatus};
