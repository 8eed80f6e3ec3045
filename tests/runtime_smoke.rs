use skybook::{
    engine::{
        Session,
        outcome::{
            BookOutcome, CancelOutcome, CreateAccountOutcome, LoginOutcome, PayOutcome,
            ReservationsOutcome, SearchOutcome,
        },
    },
    flight::{Flight, SearchRequest},
    runtime::spawn_session,
    store::sqlite::BookingDb,
};
use tempfile::TempDir;

fn catalog() -> Vec<Flight> {
    vec![Flight {
        id: 7,
        day: 12,
        carrier: "DL".to_string(),
        number: "0007".to_string(),
        origin: "Seattle WA".to_string(),
        destination: "Boston MA".to_string(),
        duration_minutes: 305,
        capacity: 10,
        price: 120,
        cancelled: false,
    }]
}

fn request() -> SearchRequest {
    SearchRequest {
        origin: "Seattle WA".to_string(),
        destination: "Boston MA".to_string(),
        direct_only: false,
        day: 12,
        limit: 3,
    }
}

#[tokio::test]
async fn full_booking_flow_through_the_handle() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("bookings.db");

    let db = BookingDb::open(&path).expect("open store");
    db.load_flights(&catalog()).expect("load catalog");
    let handle = spawn_session(Session::new(db));

    assert_eq!(
        handle.create_account("carol", "pw", 300).await.expect("send"),
        CreateAccountOutcome::Created("carol".to_string())
    );
    assert_eq!(
        handle.login("carol", "pw").await.expect("send"),
        LoginOutcome::LoggedIn("carol".to_string())
    );

    match handle.search(request()).await.expect("send") {
        SearchOutcome::Results(list) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].first.id, 7);
        }
        other => panic!("expected results, got {other:?}"),
    }

    assert_eq!(handle.book(0).await.expect("send"), BookOutcome::Booked(1));
    assert_eq!(
        handle.pay(1).await.expect("send"),
        PayOutcome::Paid { remaining: 180 }
    );

    match handle.reservations().await.expect("send") {
        ReservationsOutcome::Reservations(views) => {
            assert_eq!(views.len(), 1);
            assert!(views[0].paid);
        }
        other => panic!("expected reservations, got {other:?}"),
    }

    assert_eq!(
        handle.cancel(1).await.expect("send"),
        CancelOutcome::Cancelled(1)
    );
    assert_eq!(
        handle.reservations().await.expect("send"),
        ReservationsOutcome::Empty
    );

    handle.logout().await.expect("send");
    handle.shutdown().await.expect("send");
    // The worker is gone; further commands surface the closed channel.
    assert!(handle.book(0).await.is_err());
}

#[tokio::test]
async fn clones_share_one_session_worker() {
    let db = BookingDb::open_in_memory().expect("open store");
    db.load_flights(&catalog()).expect("load catalog");
    let handle = spawn_session(Session::new(db));
    let other = handle.clone();

    handle.create_account("dave", "pw", 0).await.expect("send");
    assert_eq!(
        other.login("dave", "pw").await.expect("send"),
        LoginOutcome::LoggedIn("dave".to_string())
    );
    // Same worker, same identity: a second login is rejected.
    assert_eq!(
        handle.login("dave", "pw").await.expect("send"),
        LoginOutcome::AlreadyLoggedIn
    );

    other.shutdown().await.expect("send");
}
