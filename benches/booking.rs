use criterion::{Criterion, criterion_group, criterion_main};

use skybook::{
    engine::{Session, outcome::BookOutcome},
    flight::{Flight, SearchRequest},
    store::sqlite::BookingDb,
};

fn catalog(route_days: u8) -> Vec<Flight> {
    (1..=route_days)
        .map(|day| Flight {
            id: i64::from(day),
            day,
            carrier: "AS".to_string(),
            number: format!("{day:04}"),
            origin: "Seattle WA".to_string(),
            destination: "Boston MA".to_string(),
            duration_minutes: 180 + u32::from(day),
            capacity: 1_000_000,
            price: 25,
            cancelled: false,
        })
        .collect()
}

fn request(day: u8) -> SearchRequest {
    SearchRequest {
        origin: "Seattle WA".to_string(),
        destination: "Boston MA".to_string(),
        direct_only: true,
        day,
        limit: 5,
    }
}

fn session() -> Session {
    let db = BookingDb::open_in_memory().expect("open store");
    db.load_flights(&catalog(28)).expect("load catalog");
    let mut session = Session::new(db);
    session.create_account("bench", "pw", 1_000_000);
    session.login("bench", "pw");
    session
}

fn bench_search(c: &mut Criterion) {
    let mut session = session();
    c.bench_function("search_direct", |b| {
        b.iter(|| session.search(&request(14)));
    });
}

fn bench_book_cancel(c: &mut Criterion) {
    let mut session = session();
    c.bench_function("search_book_cancel", |b| {
        b.iter(|| {
            session.search(&request(14));
            // Cancelling frees the day again; seats are deep enough that
            // the never-restored capacity cannot run out mid-run.
            match session.book(0) {
                BookOutcome::Booked(id) => {
                    session.cancel(id);
                }
                other => panic!("expected a booking, got {other:?}"),
            }
        });
    });
}

criterion_group!(benches, bench_search, bench_book_cancel);
criterion_main!(benches);
