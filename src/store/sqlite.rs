//! SQLite-backed booking store.
//!
//! [`BookingDb`] owns one connection per session. Schema creation is
//! idempotent, so any number of sessions can open the same database file;
//! SQLite's own locking makes their write transactions serializable.
//!
//! The free functions are the per-statement building blocks the engine
//! composes into atomic units. Each takes a plain connection handle so it
//! works equally inside and outside an explicit transaction.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::{
    flight::Flight,
    reservation::Reservation,
    store::StoreResult,
    types::{DayOfMonth, FlightId, Money, ReservationId},
};

/// How long one statement waits on a competing writer before reporting the
/// conflict to the retry loop.
const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

/// A session-owned connection to the booking database.
pub struct BookingDb {
    pub(crate) conn: Connection,
}

impl BookingDb {
    /// Opens or creates the booking database at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens a private in-memory database, useful for tests and demos.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Bulk-loads catalog rows, replacing any flight with the same id.
    ///
    /// The flight catalog is owned by an external loader; this is its entry
    /// point into the store (and the test fixtures').
    pub fn load_flights(&self, flights: &[Flight]) -> StoreResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT OR REPLACE INTO flights \
             (fid, day_of_month, carrier, flight_num, origin, destination, \
              duration_minutes, capacity, price, cancelled) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for f in flights {
            stmt.execute(params![
                f.id,
                f.day,
                f.carrier,
                f.number,
                f.origin,
                f.destination,
                f.duration_minutes,
                f.capacity,
                f.price,
                f.cancelled,
            ])?;
        }
        Ok(())
    }

    /// Deletes every user and reservation while leaving the flight catalog
    /// untouched.
    pub fn clear_bookings(&self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM reservations", [])?;
        self.conn.execute("DELETE FROM users", [])?;
        Ok(())
    }
}

/// Reads a [`Flight`] from `row` starting at column `base`.
pub(crate) fn flight_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<Flight> {
    Ok(Flight {
        id: row.get(base)?,
        day: row.get(base + 1)?,
        carrier: row.get(base + 2)?,
        number: row.get(base + 3)?,
        origin: row.get(base + 4)?,
        destination: row.get(base + 5)?,
        duration_minutes: row.get(base + 6)?,
        capacity: row.get(base + 7)?,
        price: row.get(base + 8)?,
        cancelled: row.get(base + 9)?,
    })
}

/// Column list matching [`flight_from_row`].
pub(crate) const FLIGHT_COLUMNS: &str =
    "fid, day_of_month, carrier, flight_num, origin, destination, \
     duration_minutes, capacity, price, cancelled";

/// Looks up the stored digest and salt for a case-folded username.
pub(crate) fn user_auth_row(
    conn: &Connection,
    username: &str,
) -> StoreResult<Option<(Vec<u8>, Vec<u8>)>> {
    let row = conn
        .query_row(
            "SELECT password_hash, salt FROM users WHERE username = ?1",
            params![username],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(row)
}

/// True when an account with this case-folded username exists.
pub(crate) fn user_exists(conn: &Connection, username: &str) -> StoreResult<bool> {
    let row: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )
        .optional()?;
    Ok(row.is_some())
}

/// Inserts a new account row.
pub(crate) fn insert_user(
    conn: &Connection,
    username: &str,
    password_hash: &[u8],
    salt: &[u8],
    balance: Money,
) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO users (username, password_hash, salt, balance) VALUES (?1, ?2, ?3, ?4)",
        params![username, password_hash, salt, balance],
    )?;
    Ok(())
}

/// Reads the current balance of an account.
pub(crate) fn user_balance(conn: &Connection, username: &str) -> StoreResult<Option<Money>> {
    let balance = conn
        .query_row(
            "SELECT balance FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )
        .optional()?;
    Ok(balance)
}

/// Overwrites an account balance.
pub(crate) fn set_balance(conn: &Connection, username: &str, balance: Money) -> StoreResult<()> {
    conn.execute(
        "UPDATE users SET balance = ?1 WHERE username = ?2",
        params![balance, username],
    )?;
    Ok(())
}

/// Reads one catalog flight by id.
pub(crate) fn flight_by_id(conn: &Connection, fid: FlightId) -> StoreResult<Option<Flight>> {
    let flight = conn
        .query_row(
            &format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE fid = ?1"),
            params![fid],
            |row| flight_from_row(row, 0),
        )
        .optional()?;
    Ok(flight)
}

/// Reads the remaining capacity of a flight.
pub(crate) fn flight_capacity(conn: &Connection, fid: FlightId) -> StoreResult<Option<u32>> {
    let capacity = conn
        .query_row(
            "SELECT capacity FROM flights WHERE fid = ?1",
            params![fid],
            |row| row.get(0),
        )
        .optional()?;
    Ok(capacity)
}

/// Takes one seat from a flight. The caller checks capacity first, inside
/// the same transaction.
pub(crate) fn decrement_capacity(conn: &Connection, fid: FlightId) -> StoreResult<()> {
    conn.execute(
        "UPDATE flights SET capacity = capacity - 1 WHERE fid = ?1",
        params![fid],
    )?;
    Ok(())
}

/// Number of reservations this owner has ever made, cancelled included.
/// The next reservation id is this plus one.
pub(crate) fn reservation_count(conn: &Connection, owner: &str) -> StoreResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM reservations WHERE owner = ?1",
        params![owner],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// First-leg departure days of the owner's non-cancelled reservations.
pub(crate) fn active_first_leg_days(conn: &Connection, owner: &str) -> StoreResult<Vec<DayOfMonth>> {
    let mut stmt = conn.prepare(
        "SELECT f.day_of_month FROM reservations r \
         JOIN flights f ON f.fid = r.fid1 \
         WHERE r.owner = ?1 AND r.cancelled = 0",
    )?;
    let rows = stmt.query_map(params![owner], |row| row.get(0))?;
    let mut days = Vec::new();
    for day in rows {
        days.push(day?);
    }
    Ok(days)
}

/// Appends a reservation row with the itinerary's flight ids embedded.
pub(crate) fn insert_reservation(
    conn: &Connection,
    owner: &str,
    id: ReservationId,
    fid1: FlightId,
    fid2: Option<FlightId>,
) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO reservations (owner, id, fid1, fid2, paid, cancelled) \
         VALUES (?1, ?2, ?3, ?4, 0, 0)",
        params![owner, id, fid1, fid2],
    )?;
    Ok(())
}

fn reservation_from_row(row: &Row<'_>) -> rusqlite::Result<Reservation> {
    Ok(Reservation {
        owner: row.get(0)?,
        id: row.get(1)?,
        fid1: row.get(2)?,
        fid2: row.get(3)?,
        paid: row.get(4)?,
        cancelled: row.get(5)?,
    })
}

/// Looks up one non-cancelled reservation by (owner, id).
pub(crate) fn active_reservation(
    conn: &Connection,
    owner: &str,
    id: ReservationId,
) -> StoreResult<Option<Reservation>> {
    let row = conn
        .query_row(
            "SELECT owner, id, fid1, fid2, paid, cancelled FROM reservations \
             WHERE owner = ?1 AND id = ?2 AND cancelled = 0",
            params![owner, id],
            reservation_from_row,
        )
        .optional()?;
    Ok(row)
}

/// All non-cancelled reservations of `owner` in creation order.
pub(crate) fn active_reservations(conn: &Connection, owner: &str) -> StoreResult<Vec<Reservation>> {
    let mut stmt = conn.prepare(
        "SELECT owner, id, fid1, fid2, paid, cancelled FROM reservations \
         WHERE owner = ?1 AND cancelled = 0 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![owner], reservation_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Marks a reservation paid.
pub(crate) fn mark_paid(conn: &Connection, owner: &str, id: ReservationId) -> StoreResult<()> {
    conn.execute(
        "UPDATE reservations SET paid = 1 WHERE owner = ?1 AND id = ?2",
        params![owner, id],
    )?;
    Ok(())
}

/// Marks a reservation cancelled. The flag is never unset.
pub(crate) fn mark_cancelled(conn: &Connection, owner: &str, id: ReservationId) -> StoreResult<()> {
    conn.execute(
        "UPDATE reservations SET cancelled = 1 WHERE owner = ?1 AND id = ?2",
        params![owner, id],
    )?;
    Ok(())
}
