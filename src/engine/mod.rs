//! Booking engine: sessions and the six user-facing transactions.
//!
//! Each mutating operation (create-account, book, pay, cancel) runs as one
//! `BEGIN IMMEDIATE` SQLite transaction, which is serializable; when the
//! store reports its conflict class (busy/locked) the whole unit is re-run
//! from scratch up to a bounded budget. Search and view-reservations only
//! need a consistent read snapshot and are never retried.

/// Generation-counted per-session itinerary cache.
pub mod cache;
/// Structured terminal outcomes per operation.
pub mod outcome;

mod search;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, error, warn};

use crate::{
    auth,
    flight::{Flight, SearchRequest},
    reservation::ReservationView,
    store::{StoreError, StoreResult, sqlite, sqlite::BookingDb},
    types::{FlightId, Money, ReservationId},
};

use cache::ItineraryCache;
use outcome::{
    BookOutcome, CancelOutcome, CreateAccountOutcome, LoginOutcome, PayOutcome, RejectReason,
    ReservationsOutcome, SearchOutcome,
};

/// How many times one atomic unit is re-run after store conflicts before
/// the operation reports its generic failure.
const MAX_CONFLICT_RETRIES: u32 = 16;

/// How an atomic unit's body wants the transaction finished. `Abort`
/// still carries a terminal outcome, but every write is rolled back.
enum Verdict<T> {
    Commit(T),
    Abort(T),
}

/// One client session: its own store connection, login identity, and
/// itinerary cache.
///
/// Sessions are independent values. A deployment serving several clients
/// opens one session per connection (see [`crate::runtime`]); they share
/// the database file, and the store's locking keeps their transactions
/// serializable.
pub struct Session {
    db: BookingDb,
    identity: Option<String>,
    cache: ItineraryCache,
}

impl Session {
    /// Wraps a store connection into a logged-out session.
    pub fn new(db: BookingDb) -> Self {
        Self {
            db,
            identity: None,
            cache: ItineraryCache::new(),
        }
    }

    /// Case-folded username of the logged-in user, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Drops the login identity and the itinerary cache.
    pub fn logout(&mut self) {
        self.identity = None;
        self.cache.clear();
    }

    /// Creates an account with a fresh random salt and an initial balance.
    ///
    /// Validation happens before any store access; the existence check and
    /// insert share one atomic unit so two racing sessions cannot both
    /// claim a username.
    pub fn create_account(
        &mut self,
        username: &str,
        password: &str,
        initial_balance: Money,
    ) -> CreateAccountOutcome {
        if username.chars().count() > auth::MAX_CREDENTIAL_LEN {
            return CreateAccountOutcome::Rejected(RejectReason::UsernameTooLong);
        }
        if password.chars().count() > auth::MAX_CREDENTIAL_LEN {
            return CreateAccountOutcome::Rejected(RejectReason::PasswordTooLong);
        }
        if initial_balance < 0 {
            return CreateAccountOutcome::Rejected(RejectReason::NegativeBalance);
        }

        let folded = username.to_lowercase();
        let salt = auth::generate_salt();
        let hash = match auth::derive_hash(password, &salt) {
            Ok(hash) => hash,
            Err(err) => {
                error!(error = %err, "key derivation failed");
                return CreateAccountOutcome::Rejected(RejectReason::Failed);
            }
        };

        let result = run_serializable(&mut self.db.conn, "create_account", |tx| {
            if sqlite::user_exists(tx, &folded)? {
                return Ok(Verdict::Abort(CreateAccountOutcome::Rejected(
                    RejectReason::AlreadyExists,
                )));
            }
            sqlite::insert_user(tx, &folded, &hash, &salt, initial_balance)?;
            Ok(Verdict::Commit(CreateAccountOutcome::Created(
                username.to_string(),
            )))
        });
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "create_account transaction failed");
                CreateAccountOutcome::Rejected(RejectReason::Failed)
            }
        }
    }

    /// Attempts to log the session in.
    ///
    /// The itinerary cache is cleared before anything else so results from
    /// a previous identity can never be booked, even when the attempt
    /// fails. Unknown users and wrong passwords report identically.
    pub fn login(&mut self, username: &str, password: &str) -> LoginOutcome {
        self.cache.clear();
        if self.identity.is_some() {
            return LoginOutcome::AlreadyLoggedIn;
        }

        let folded = username.to_lowercase();
        let row = match sqlite::user_auth_row(&self.db.conn, &folded) {
            Ok(row) => row,
            Err(err) => {
                error!(error = %err, "credential lookup failed");
                return LoginOutcome::AuthFailed;
            }
        };
        let Some((stored, salt)) = row else {
            return LoginOutcome::AuthFailed;
        };
        match auth::verify(password, &salt, &stored) {
            Ok(true) => {
                self.identity = Some(folded);
                LoginOutcome::LoggedIn(username.to_string())
            }
            Ok(false) => LoginOutcome::AuthFailed,
            Err(err) => {
                error!(error = %err, "key derivation failed");
                LoginOutcome::AuthFailed
            }
        }
    }

    /// Searches for itineraries and repopulates the session's cache.
    ///
    /// Both queries run inside one read transaction for a consistent
    /// snapshot. An empty result leaves the cache cleared.
    pub fn search(&mut self, req: &SearchRequest) -> SearchOutcome {
        self.cache.clear();
        let found = {
            let tx = match self.db.conn.transaction() {
                Ok(tx) => tx,
                Err(err) => {
                    error!(error = %err, "search snapshot failed");
                    return SearchOutcome::Failed;
                }
            };
            match search::run_search(&tx, req) {
                Ok(found) => found,
                Err(err) => {
                    error!(error = %err, "search failed");
                    return SearchOutcome::Failed;
                }
            }
        };
        if found.is_empty() {
            return SearchOutcome::Empty;
        }
        self.cache.populate(found.clone());
        SearchOutcome::Results(found)
    }

    /// Books the itinerary at `index` in the current search results.
    ///
    /// Outcome checks are strictly ordered: not-logged-in, unknown
    /// itinerary (cache only), capacity exhausted, same-day conflict,
    /// then generic failure. A same-day abort rolls back the capacity
    /// decrements performed earlier in the unit.
    pub fn book(&mut self, index: usize) -> BookOutcome {
        let Some(owner) = self.identity.clone() else {
            return BookOutcome::NotLoggedIn;
        };
        let Some(itinerary) = self.cache.lookup(index).cloned() else {
            return BookOutcome::UnknownItinerary(index);
        };
        let (fid1, fid2) = itinerary.flight_ids();

        let result = run_serializable(&mut self.db.conn, "book", |tx| {
            for fid in std::iter::once(fid1).chain(fid2) {
                let Some(capacity) = sqlite::flight_capacity(tx, fid)? else {
                    // Catalog changed under a stale cache entry.
                    return Ok(Verdict::Abort(BookOutcome::Failed));
                };
                if capacity == 0 {
                    return Ok(Verdict::Abort(BookOutcome::CapacityExhausted));
                }
                sqlite::decrement_capacity(tx, fid)?;
            }

            let first = resolve_flight(tx, fid1)?;
            if sqlite::active_first_leg_days(tx, &owner)?.contains(&first.day) {
                return Ok(Verdict::Abort(BookOutcome::SameDayConflict));
            }

            let id = sqlite::reservation_count(tx, &owner)? + 1;
            sqlite::insert_reservation(tx, &owner, id, fid1, fid2)?;
            Ok(Verdict::Commit(BookOutcome::Booked(id)))
        });
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "booking transaction failed");
                BookOutcome::Failed
            }
        }
    }

    /// Pays for one of the user's unpaid, non-cancelled reservations.
    ///
    /// Paying twice fails without touching the balance; insufficient funds
    /// report both the balance and the itinerary cost.
    pub fn pay(&mut self, reservation: ReservationId) -> PayOutcome {
        let Some(owner) = self.identity.clone() else {
            return PayOutcome::NotLoggedIn;
        };

        let result = run_serializable(&mut self.db.conn, "pay", |tx| {
            let Some(row) = sqlite::active_reservation(tx, &owner, reservation)? else {
                return Ok(Verdict::Abort(PayOutcome::NoSuchUnpaidReservation(
                    reservation,
                )));
            };
            if row.paid {
                return Ok(Verdict::Abort(PayOutcome::Failed));
            }
            let cost = itinerary_price(tx, row.fid1, row.fid2)?;
            let balance = sqlite::user_balance(tx, &owner)?
                .ok_or_else(|| StoreError::Corrupt(format!("no account row for {owner}")))?;
            if cost > balance {
                return Ok(Verdict::Abort(PayOutcome::InsufficientFunds { balance, cost }));
            }
            let remaining = balance - cost;
            sqlite::set_balance(tx, &owner, remaining)?;
            sqlite::mark_paid(tx, &owner, reservation)?;
            Ok(Verdict::Commit(PayOutcome::Paid { remaining }))
        });
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "payment transaction failed");
                PayOutcome::Failed
            }
        }
    }

    /// Cancels one of the user's non-cancelled reservations.
    ///
    /// A paid reservation is refunded exactly the price paid at booking
    /// time before the flag is set. Flight capacity is intentionally not
    /// restored. Cancelling an already-cancelled reservation fails, so a
    /// refund can never be applied twice.
    pub fn cancel(&mut self, reservation: ReservationId) -> CancelOutcome {
        let Some(owner) = self.identity.clone() else {
            return CancelOutcome::NotLoggedIn;
        };

        let result = run_serializable(&mut self.db.conn, "cancel", |tx| {
            let Some(row) = sqlite::active_reservation(tx, &owner, reservation)? else {
                return Ok(Verdict::Abort(CancelOutcome::Failed));
            };
            if row.paid {
                let refund = itinerary_price(tx, row.fid1, row.fid2)?;
                let balance = sqlite::user_balance(tx, &owner)?
                    .ok_or_else(|| StoreError::Corrupt(format!("no account row for {owner}")))?;
                sqlite::set_balance(tx, &owner, balance + refund)?;
            }
            sqlite::mark_cancelled(tx, &owner, reservation)?;
            Ok(Verdict::Commit(CancelOutcome::Cancelled(reservation)))
        });
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "cancel transaction failed");
                CancelOutcome::Failed
            }
        }
    }

    /// Lists the user's non-cancelled reservations in creation order with
    /// their legs resolved from the catalog.
    pub fn reservations(&mut self) -> ReservationsOutcome {
        let Some(owner) = self.identity.clone() else {
            return ReservationsOutcome::NotLoggedIn;
        };
        match self.reservations_inner(&owner) {
            Ok(views) if views.is_empty() => ReservationsOutcome::Empty,
            Ok(views) => ReservationsOutcome::Reservations(views),
            Err(err) => {
                error!(error = %err, "reservation listing failed");
                ReservationsOutcome::Failed
            }
        }
    }

    fn reservations_inner(&mut self, owner: &str) -> StoreResult<Vec<ReservationView>> {
        let tx = self.db.conn.transaction()?;
        let rows = sqlite::active_reservations(&tx, owner)?;
        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let mut legs = vec![resolve_flight(&tx, row.fid1)?];
            if let Some(fid) = row.fid2 {
                legs.push(resolve_flight(&tx, fid)?);
            }
            views.push(ReservationView {
                id: row.id,
                paid: row.paid,
                legs,
            });
        }
        Ok(views)
    }
}

/// Runs `body` as one serializable atomic unit, re-running it from scratch
/// when the store reports its conflict class, up to the retry budget.
fn run_serializable<T>(
    conn: &mut Connection,
    op: &'static str,
    mut body: impl FnMut(&Transaction<'_>) -> StoreResult<Verdict<T>>,
) -> StoreResult<T> {
    for attempt in 1..=MAX_CONFLICT_RETRIES {
        let tx = match conn.transaction_with_behavior(TransactionBehavior::Immediate) {
            Ok(tx) => tx,
            Err(err) if crate::store::is_sqlite_conflict(&err) => {
                warn!(op, attempt, "write lock busy, retrying transaction");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        match body(&tx) {
            Ok(Verdict::Commit(value)) => match tx.commit() {
                Ok(()) => {
                    debug!(op, attempt, "transaction committed");
                    return Ok(value);
                }
                Err(err) if crate::store::is_sqlite_conflict(&err) => {
                    warn!(op, attempt, "conflict at commit, retrying transaction");
                    continue;
                }
                Err(err) => return Err(err.into()),
            },
            Ok(Verdict::Abort(value)) => {
                tx.rollback()?;
                return Ok(value);
            }
            Err(err) if err.is_conflict() => {
                warn!(op, attempt, "conflict mid-transaction, retrying");
                continue;
            }
            Err(err) => return Err(err),
        }
    }
    Err(StoreError::RetriesExhausted(MAX_CONFLICT_RETRIES))
}

fn resolve_flight(conn: &Connection, fid: FlightId) -> StoreResult<Flight> {
    sqlite::flight_by_id(conn, fid)?
        .ok_or_else(|| StoreError::Corrupt(format!("reservation references missing flight {fid}")))
}

fn itinerary_price(
    conn: &Connection,
    fid1: FlightId,
    fid2: Option<FlightId>,
) -> StoreResult<Money> {
    let mut total = resolve_flight(conn, fid1)?.price;
    if let Some(fid) = fid2 {
        total += resolve_flight(conn, fid)?.price;
    }
    Ok(total)
}
