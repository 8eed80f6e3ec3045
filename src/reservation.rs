//! Durable reservation ledger rows and resolved views.

use serde::{Deserialize, Serialize};

use crate::{
    flight::Flight,
    types::{FlightId, ReservationId},
};

/// One row of the reservation ledger.
///
/// The chosen itinerary's flight ids are embedded at booking time, so a
/// reservation remains resolvable after the session's search cache is gone.
/// Rows are never deleted; cancellation only sets the flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Per-owner reservation number, starting at 1 and never reused.
    pub id: ReservationId,
    /// Case-folded username of the owner.
    pub owner: String,
    /// First leg flight id.
    pub fid1: FlightId,
    /// Second leg flight id for one-hop itineraries.
    pub fid2: Option<FlightId>,
    /// True once payment was collected. Set at most once.
    pub paid: bool,
    /// True once cancelled. Irreversible.
    pub cancelled: bool,
}

/// A reservation with its legs resolved from the catalog, as returned by
/// [`Session::reservations`](crate::engine::Session::reservations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationView {
    /// Per-owner reservation number.
    pub id: ReservationId,
    /// Whether the reservation has been paid.
    pub paid: bool,
    /// Resolved legs in travel order.
    pub legs: Vec<Flight>,
}
