//! Shared primitive identifiers and amounts.

/// Catalog flight identifier.
pub type FlightId = i64;
/// Per-user reservation number, starting at 1 and never reused.
pub type ReservationId = i64;
/// Amount in the smallest currency unit.
pub type Money = i64;
/// Calendar day of month a flight departs on.
pub type DayOfMonth = u8;
