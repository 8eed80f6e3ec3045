//! Per-session itinerary cache.

use crate::flight::Itinerary;

/// Versioned snapshot of the most recent search results for one session.
///
/// Indices are only meaningful within the generation that produced them:
/// every [`clear`](ItineraryCache::clear) and
/// [`populate`](ItineraryCache::populate) bumps the generation and discards
/// the previous entries, so a booking can never read itineraries computed
/// by an earlier search.
#[derive(Debug, Default)]
pub struct ItineraryCache {
    generation: u64,
    entries: Vec<Itinerary>,
}

impl ItineraryCache {
    /// Creates an empty cache at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all cached itineraries.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.entries.clear();
    }

    /// Replaces the cache content; entry order is the externally visible
    /// ranked search order, so index equals rank.
    pub fn populate(&mut self, entries: Vec<Itinerary>) {
        self.generation += 1;
        self.entries = entries;
    }

    /// Looks up an itinerary by its rank in the current generation.
    pub fn lookup(&self, index: usize) -> Option<&Itinerary> {
        self.entries.get(index)
    }

    /// Snapshot version, bumped on every clear and populate.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of cached itineraries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no search results are cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::Flight;

    fn leg(id: i64) -> Itinerary {
        Itinerary {
            first: Flight {
                id,
                day: 1,
                carrier: "AS".to_string(),
                number: "17".to_string(),
                origin: "A".to_string(),
                destination: "B".to_string(),
                duration_minutes: 60,
                capacity: 1,
                price: 10,
                cancelled: false,
            },
            second: None,
        }
    }

    #[test]
    fn populate_assigns_rank_order_and_bumps_generation() {
        let mut cache = ItineraryCache::new();
        let g0 = cache.generation();
        cache.populate(vec![leg(7), leg(3)]);
        assert!(cache.generation() > g0);
        assert_eq!(cache.lookup(0).map(|i| i.first.id), Some(7));
        assert_eq!(cache.lookup(1).map(|i| i.first.id), Some(3));
        assert!(cache.lookup(2).is_none());
    }

    #[test]
    fn clear_invalidates_previous_indices() {
        let mut cache = ItineraryCache::new();
        cache.populate(vec![leg(1)]);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.lookup(0).is_none());
    }
}
