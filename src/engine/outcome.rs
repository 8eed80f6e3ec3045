//! Terminal outcomes of the user-facing transactions.
//!
//! Every operation resolves to exactly one variant; rendering them as text
//! is the caller's concern. Store faults and exhausted conflict retries
//! collapse into each operation's generic failure variant.

use serde::{Deserialize, Serialize};

use crate::{
    flight::Itinerary,
    reservation::ReservationView,
    types::{Money, ReservationId},
};

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginOutcome {
    /// Authenticated; carries the username as the caller typed it.
    LoggedIn(String),
    /// The session already has an identity; credentials were not checked.
    AlreadyLoggedIn,
    /// Unknown user, bad password, or a store fault — indistinguishable.
    AuthFailed,
}

/// Why an account creation request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Username longer than the credential bound.
    UsernameTooLong,
    /// Password longer than the credential bound.
    PasswordTooLong,
    /// Initial balance below zero.
    NegativeBalance,
    /// The case-folded username is already taken.
    AlreadyExists,
    /// Store fault or exhausted conflict retries.
    Failed,
}

/// Result of an account creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateAccountOutcome {
    /// Account created; carries the username as the caller typed it.
    Created(String),
    /// Request rejected; nothing was written.
    Rejected(RejectReason),
}

/// Result of a search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// Ranked itineraries; index equals the bookable itinerary number.
    Results(Vec<Itinerary>),
    /// No flight matches the request; the itinerary cache stays empty.
    Empty,
    /// Store fault.
    Failed,
}

/// Result of a booking attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookOutcome {
    /// Reservation created with this per-user id.
    Booked(ReservationId),
    /// The session is not logged in; nothing was read or written.
    NotLoggedIn,
    /// The index does not resolve in the current itinerary cache.
    UnknownItinerary(usize),
    /// Some leg has no seat left; the whole unit was rolled back.
    CapacityExhausted,
    /// The user already holds a non-cancelled reservation departing the
    /// same day; the whole unit was rolled back.
    SameDayConflict,
    /// Store fault or exhausted conflict retries.
    Failed,
}

/// Result of a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayOutcome {
    /// Payment collected.
    Paid {
        /// Balance left after the payment.
        remaining: Money,
    },
    /// The session is not logged in.
    NotLoggedIn,
    /// No non-cancelled reservation with this id belongs to the user.
    NoSuchUnpaidReservation(ReservationId),
    /// The itinerary costs more than the account holds; nothing changed.
    InsufficientFunds {
        /// Current balance.
        balance: Money,
        /// Total itinerary price.
        cost: Money,
    },
    /// Already paid, store fault, or exhausted conflict retries.
    Failed,
}

/// Result of a cancellation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelOutcome {
    /// Reservation cancelled; a paid reservation was refunded in full.
    Cancelled(ReservationId),
    /// The session is not logged in.
    NotLoggedIn,
    /// Missing, foreign, or already-cancelled reservation, or a store
    /// fault. A refund is never applied twice.
    Failed,
}

/// Result of listing the session user's reservations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationsOutcome {
    /// Non-cancelled reservations in creation order with resolved legs.
    Reservations(Vec<ReservationView>),
    /// The session is not logged in.
    NotLoggedIn,
    /// The user holds no non-cancelled reservations.
    Empty,
    /// Store fault.
    Failed,
}
