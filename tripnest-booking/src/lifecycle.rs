use crate::models::BookingStatus;
use crate::BookingError;

impl BookingStatus {
    /// `cancelled` and `completed` are final.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    /// Allowed moves:
    /// pending → confirmed | cancelled | completed,
    /// confirmed → completed | cancelled.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Pending, Completed)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }
}

/// A requested status change, checked against the booking's current status
/// by whichever store holds the booking row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// `PATCH /status`: any legal transition; re-setting the current status is a no-op.
    Set(BookingStatus),
    /// `DELETE`: only a pending booking can be cancelled.
    Cancel,
}

impl StatusChange {
    /// The status the booking ends up in, or why the change is refused.
    pub fn resolve(&self, current: BookingStatus) -> Result<BookingStatus, BookingError> {
        match *self {
            StatusChange::Cancel => {
                if current != BookingStatus::Pending {
                    return Err(BookingError::NotCancellable(current));
                }
                Ok(BookingStatus::Cancelled)
            }
            StatusChange::Set(next) => {
                if next == current || current.can_transition_to(next) {
                    Ok(next)
                } else {
                    Err(BookingError::InvalidTransition { from: current, to: next })
                }
            }
        }
    }
}

/// Whether moving `from → to` gives the reserved unit back to the product.
pub fn releases_inventory(from: BookingStatus, to: BookingStatus) -> bool {
    to == BookingStatus::Cancelled && from != BookingStatus::Cancelled
}
