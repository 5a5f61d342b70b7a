pub mod booking;
pub mod conflict;

pub use booking::{BookingService, SlotLease, SlotLocks};
pub use conflict::{find_conflict, ConflictGuard};
