//! Itinerary search: direct and one-hop queries plus deterministic ranking.

use rusqlite::{Connection, params};

use crate::{
    flight::{Itinerary, SearchRequest},
    store::{StoreResult, sqlite},
};

/// Runs the search queries and returns the merged, ranked itinerary list.
///
/// Direct flights come first from the store ordered by duration; one-hop
/// connections are only queried when direct results leave room under the
/// limit. The merged list is stable-sorted by (total duration, first-leg
/// id, second-leg id) so equal-duration itineraries rank deterministically.
pub(crate) fn run_search(conn: &Connection, req: &SearchRequest) -> StoreResult<Vec<Itinerary>> {
    let mut found = direct_itineraries(conn, req)?;
    if !req.direct_only && found.len() < req.limit {
        let room = req.limit - found.len();
        found.extend(connecting_itineraries(conn, req, room)?);
    }
    found.sort_by_key(|it| {
        let (fid1, fid2) = it.flight_ids();
        (it.total_duration(), fid1, fid2.unwrap_or(0))
    });
    Ok(found)
}

fn direct_itineraries(conn: &Connection, req: &SearchRequest) -> StoreResult<Vec<Itinerary>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM flights \
         WHERE origin = ?1 AND destination = ?2 AND day_of_month = ?3 AND cancelled = 0 \
         ORDER BY duration_minutes ASC, fid ASC \
         LIMIT ?4",
        sqlite::FLIGHT_COLUMNS
    ))?;
    let rows = stmt.query_map(
        params![req.origin, req.destination, req.day, req.limit as i64],
        |row| {
            Ok(Itinerary {
                first: sqlite::flight_from_row(row, 0)?,
                second: None,
            })
        },
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn connecting_itineraries(
    conn: &Connection,
    req: &SearchRequest,
    limit: usize,
) -> StoreResult<Vec<Itinerary>> {
    let mut stmt = conn.prepare(
        "SELECT f1.fid, f1.day_of_month, f1.carrier, f1.flight_num, f1.origin, \
                f1.destination, f1.duration_minutes, f1.capacity, f1.price, f1.cancelled, \
                f2.fid, f2.day_of_month, f2.carrier, f2.flight_num, f2.origin, \
                f2.destination, f2.duration_minutes, f2.capacity, f2.price, f2.cancelled \
         FROM flights f1 \
         JOIN flights f2 ON f1.destination = f2.origin \
         WHERE f1.origin = ?1 AND f2.destination = ?2 \
           AND f1.day_of_month = ?3 AND f2.day_of_month = ?3 \
           AND f1.cancelled = 0 AND f2.cancelled = 0 \
         ORDER BY f1.duration_minutes + f2.duration_minutes ASC, f1.fid ASC, f2.fid ASC \
         LIMIT ?4",
    )?;
    let rows = stmt.query_map(
        params![req.origin, req.destination, req.day, limit as i64],
        |row| {
            Ok(Itinerary {
                first: sqlite::flight_from_row(row, 0)?,
                second: Some(sqlite::flight_from_row(row, 10)?),
            })
        },
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
