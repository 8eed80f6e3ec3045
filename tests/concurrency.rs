use std::path::Path;
use std::sync::Once;

use skybook::{
    engine::{
        Session,
        outcome::{BookOutcome, CreateAccountOutcome, RejectReason, SearchOutcome},
    },
    flight::{Flight, SearchRequest},
    store::sqlite::BookingDb,
    types::DayOfMonth,
};
use tempfile::TempDir;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn seed(path: &Path, flights: &[Flight]) {
    let db = BookingDb::open(path).expect("open store");
    db.load_flights(flights).expect("load catalog");
}

fn direct(id: i64, day: DayOfMonth, capacity: u32) -> Flight {
    Flight {
        id,
        day,
        carrier: "AS".to_string(),
        number: format!("{id}"),
        origin: "Seattle WA".to_string(),
        destination: "Boston MA".to_string(),
        duration_minutes: 180,
        capacity,
        price: 25,
        cancelled: false,
    }
}

fn req(day: DayOfMonth) -> SearchRequest {
    SearchRequest {
        origin: "Seattle WA".to_string(),
        destination: "Boston MA".to_string(),
        direct_only: true,
        day,
        limit: 5,
    }
}

#[test]
fn one_seat_goes_to_exactly_one_of_many_racing_sessions() {
    init_tracing();
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("bookings.db");
    seed(&path, &[direct(1, 1, 1)]);

    let outcomes: Vec<BookOutcome> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = &path;
                scope.spawn(move || {
                    let mut session = Session::new(BookingDb::open(path).expect("open store"));
                    let user = format!("user{i}");
                    session.create_account(&user, "pw", 100);
                    session.login(&user, "pw");
                    match session.search(&req(1)) {
                        SearchOutcome::Results(_) => {}
                        other => panic!("expected results, got {other:?}"),
                    }
                    session.book(0)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("join")).collect()
    });

    let booked = outcomes
        .iter()
        .filter(|o| matches!(o, BookOutcome::Booked(1)))
        .count();
    let exhausted = outcomes
        .iter()
        .filter(|o| matches!(o, BookOutcome::CapacityExhausted))
        .count();
    assert_eq!(booked, 1, "outcomes: {outcomes:?}");
    assert_eq!(exhausted, 7, "outcomes: {outcomes:?}");
}

#[test]
fn a_username_is_granted_to_exactly_one_of_many_racing_sessions() {
    init_tracing();
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("bookings.db");
    seed(&path, &[]);

    let outcomes: Vec<CreateAccountOutcome> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = &path;
                scope.spawn(move || {
                    let mut session = Session::new(BookingDb::open(path).expect("open store"));
                    session.create_account("shared", "pw", 0)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("join")).collect()
    });

    let created = outcomes
        .iter()
        .filter(|o| matches!(o, CreateAccountOutcome::Created(_)))
        .count();
    let taken = outcomes
        .iter()
        .filter(|o| {
            matches!(
                o,
                CreateAccountOutcome::Rejected(RejectReason::AlreadyExists)
            )
        })
        .count();
    assert_eq!(created, 1, "outcomes: {outcomes:?}");
    assert_eq!(taken, 7, "outcomes: {outcomes:?}");
}

#[test]
fn one_user_on_two_sessions_gets_distinct_consecutive_ids() {
    init_tracing();
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("bookings.db");
    seed(&path, &[direct(1, 1, 4), direct(2, 2, 4)]);

    {
        let mut session = Session::new(BookingDb::open(&path).expect("open store"));
        session.create_account("alice", "pw", 100);
    }

    let mut ids: Vec<i64> = std::thread::scope(|scope| {
        let handles: Vec<_> = [1u8, 2u8]
            .into_iter()
            .map(|day| {
                let path = &path;
                scope.spawn(move || {
                    let mut session = Session::new(BookingDb::open(path).expect("open store"));
                    session.login("alice", "pw");
                    match session.search(&req(day)) {
                        SearchOutcome::Results(_) => {}
                        other => panic!("expected results, got {other:?}"),
                    }
                    match session.book(0) {
                        BookOutcome::Booked(id) => id,
                        other => panic!("expected a booking, got {other:?}"),
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("join")).collect()
    });

    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
}
