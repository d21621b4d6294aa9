use crate::subscription::Subscription;

/// Which side of the confirmation split a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationFilter {
    Confirmed,
    Unconfirmed,
}

impl ConfirmationFilter {
    pub fn matches(self, subscription: &Subscription) -> bool {
        match self {
            ConfirmationFilter::Confirmed => subscription.is_confirmed(),
            ConfirmationFilter::Unconfirmed => !subscription.is_confirmed(),
        }
    }
}
