//! Transactional flight-booking engine over an embedded SQLite store.
//!
//! Sessions authenticate users, search the flight catalog, and book, pay
//! for, and cancel reservations. Every mutating operation runs as one
//! serializable atomic unit with transparent conflict retry, so seat
//! capacity, balances, and per-user reservation numbering stay consistent
//! under concurrent sessions.
//!
//! # Examples
//!
//! Synchronous usage with [`engine::Session`]:
//! ```
//! use skybook::{
//!     engine::{Session, outcome::BookOutcome},
//!     flight::{Flight, SearchRequest},
//!     store::sqlite::BookingDb,
//! };
//!
//! let db = BookingDb::open_in_memory().expect("open store");
//! db.load_flights(&[Flight {
//!     id: 1,
//!     day: 4,
//!     carrier: "AS".to_string(),
//!     number: "17".to_string(),
//!     origin: "Seattle WA".to_string(),
//!     destination: "Boston MA".to_string(),
//!     duration_minutes: 310,
//!     capacity: 2,
//!     price: 140,
//!     cancelled: false,
//! }]).expect("load catalog");
//!
//! let mut session = Session::new(db);
//! session.create_account("alice", "hunter2", 500);
//! session.login("alice", "hunter2");
//! session.search(&SearchRequest {
//!     origin: "Seattle WA".to_string(),
//!     destination: "Boston MA".to_string(),
//!     direct_only: true,
//!     day: 4,
//!     limit: 5,
//! });
//! assert_eq!(session.book(0), BookOutcome::Booked(1));
//! ```
//!
//! Async usage with [`runtime::handle::spawn_session`]:
//! ```no_run
//! use skybook::{
//!     engine::Session,
//!     flight::SearchRequest,
//!     runtime::handle::spawn_session,
//!     store::sqlite::BookingDb,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let db = BookingDb::open("bookings.db").expect("open store");
//! let handle = spawn_session(Session::new(db));
//! handle.login("alice", "hunter2").await.expect("worker");
//! handle
//!     .search(SearchRequest {
//!         origin: "Seattle WA".to_string(),
//!         destination: "Boston MA".to_string(),
//!         direct_only: false,
//!         day: 4,
//!         limit: 5,
//!     })
//!     .await
//!     .expect("worker");
//! let _outcome = handle.book(0).await.expect("worker");
//! handle.shutdown().await.expect("worker");
//! # }
//! ```
#![deny(missing_docs)]

/// Credential hashing primitives.
pub mod auth;
/// Booking engine sessions and transaction outcomes.
pub mod engine;
/// Flight catalog records and itineraries.
pub mod flight;
/// Reservation ledger rows and views.
pub mod reservation;
/// Async per-session command handles.
pub mod runtime;
/// SQLite store, schema, and error taxonomy.
pub mod store;
/// Shared primitive types.
pub mod types;
