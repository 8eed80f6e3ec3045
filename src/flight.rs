//! Flight catalog records and bookable itineraries.

use serde::{Deserialize, Serialize};

use crate::types::{DayOfMonth, FlightId, Money};

/// One scheduled flight segment from the catalog.
///
/// The catalog is externally owned; the engine reads every field and only
/// ever mutates `capacity` (decremented when a leg is booked).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Stable catalog identifier.
    pub id: FlightId,
    /// Departure day of month.
    pub day: DayOfMonth,
    /// Operating carrier code.
    pub carrier: String,
    /// Carrier flight number.
    pub number: String,
    /// Origin city.
    pub origin: String,
    /// Destination city.
    pub destination: String,
    /// Scheduled duration in minutes.
    pub duration_minutes: u32,
    /// Remaining seats. Never negative.
    pub capacity: u32,
    /// Ticket price for this leg.
    pub price: Money,
    /// True when the carrier cancelled the flight; excluded from search.
    pub cancelled: bool,
}

/// A bookable trip of one leg, or two legs joined at a connection city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    /// First (or only) leg.
    pub first: Flight,
    /// Second leg for one-hop connections.
    pub second: Option<Flight>,
}

impl Itinerary {
    /// Number of legs, 1 or 2.
    pub fn leg_count(&self) -> usize {
        if self.second.is_some() { 2 } else { 1 }
    }

    /// Sum of leg durations in minutes.
    pub fn total_duration(&self) -> u32 {
        self.first.duration_minutes
            + self
                .second
                .as_ref()
                .map(|f| f.duration_minutes)
                .unwrap_or(0)
    }

    /// Sum of leg prices.
    pub fn price(&self) -> Money {
        self.first.price + self.second.as_ref().map(|f| f.price).unwrap_or(0)
    }

    /// Departure day of the first leg; the same-day rule keys on this.
    pub fn first_leg_day(&self) -> DayOfMonth {
        self.first.day
    }

    /// Flight ids of both legs, second absent for direct trips.
    pub fn flight_ids(&self) -> (FlightId, Option<FlightId>) {
        (self.first.id, self.second.as_ref().map(|f| f.id))
    }
}

/// Parameters for one search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Origin city of the whole trip.
    pub origin: String,
    /// Destination city of the whole trip.
    pub destination: String,
    /// When true, one-hop connections are excluded.
    pub direct_only: bool,
    /// Departure day of month; both legs of a connection must match it.
    pub day: DayOfMonth,
    /// Maximum number of itineraries to return.
    pub limit: usize,
}
