//! Async handle over one booking session.
//!
//! A session and its SQLite connection live on a dedicated worker thread;
//! callers drive it through an async [`SessionHandle`]. Commands queue on
//! an mpsc channel and are answered over oneshot channels, so each session
//! processes one transaction at a time while any number of sessions run
//! concurrently against the shared database file.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::{
    engine::{
        Session,
        outcome::{
            BookOutcome, CancelOutcome, CreateAccountOutcome, LoginOutcome, PayOutcome,
            ReservationsOutcome, SearchOutcome,
        },
    },
    flight::SearchRequest,
    types::{Money, ReservationId},
};

/// Error talking to a session worker.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The worker has shut down or panicked.
    #[error("session worker is gone")]
    ChannelClosed,
}

enum Command {
    CreateAccount {
        username: String,
        password: String,
        initial_balance: Money,
        resp: oneshot::Sender<CreateAccountOutcome>,
    },
    Login {
        username: String,
        password: String,
        resp: oneshot::Sender<LoginOutcome>,
    },
    Logout {
        resp: oneshot::Sender<()>,
    },
    Search {
        request: SearchRequest,
        resp: oneshot::Sender<SearchOutcome>,
    },
    Book {
        itinerary: usize,
        resp: oneshot::Sender<BookOutcome>,
    },
    Pay {
        reservation: ReservationId,
        resp: oneshot::Sender<PayOutcome>,
    },
    Cancel {
        reservation: ReservationId,
        resp: oneshot::Sender<CancelOutcome>,
    },
    Reservations {
        resp: oneshot::Sender<ReservationsOutcome>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Cloneable async handle to one session worker.
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<Command>,
}

/// Moves `session` onto a worker thread and returns its handle.
///
/// The worker exits when every handle is dropped or after
/// [`SessionHandle::shutdown`]; dropping the session closes its store
/// connection, which is the disconnect transition back to logged-out.
pub fn spawn_session(session: Session) -> SessionHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(16);

    std::thread::spawn(move || {
        let mut session = session;
        while let Some(cmd) = cmd_rx.blocking_recv() {
            match cmd {
                Command::CreateAccount {
                    username,
                    password,
                    initial_balance,
                    resp,
                } => {
                    let _ = resp.send(session.create_account(&username, &password, initial_balance));
                }
                Command::Login {
                    username,
                    password,
                    resp,
                } => {
                    let _ = resp.send(session.login(&username, &password));
                }
                Command::Logout { resp } => {
                    session.logout();
                    let _ = resp.send(());
                }
                Command::Search { request, resp } => {
                    let _ = resp.send(session.search(&request));
                }
                Command::Book { itinerary, resp } => {
                    let _ = resp.send(session.book(itinerary));
                }
                Command::Pay { reservation, resp } => {
                    let _ = resp.send(session.pay(reservation));
                }
                Command::Cancel { reservation, resp } => {
                    let _ = resp.send(session.cancel(reservation));
                }
                Command::Reservations { resp } => {
                    let _ = resp.send(session.reservations());
                }
                Command::Shutdown { resp } => {
                    let _ = resp.send(());
                    break;
                }
            }
        }
        debug!("session worker stopped");
    });

    SessionHandle { cmd_tx }
}

impl SessionHandle {
    async fn roundtrip<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// See [`Session::create_account`].
    pub async fn create_account(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
        initial_balance: Money,
    ) -> Result<CreateAccountOutcome, RuntimeError> {
        let (username, password) = (username.into(), password.into());
        self.roundtrip(|resp| Command::CreateAccount {
            username,
            password,
            initial_balance,
            resp,
        })
        .await
    }

    /// See [`Session::login`].
    pub async fn login(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<LoginOutcome, RuntimeError> {
        let (username, password) = (username.into(), password.into());
        self.roundtrip(|resp| Command::Login {
            username,
            password,
            resp,
        })
        .await
    }

    /// See [`Session::logout`].
    pub async fn logout(&self) -> Result<(), RuntimeError> {
        self.roundtrip(|resp| Command::Logout { resp }).await
    }

    /// See [`Session::search`].
    pub async fn search(&self, request: SearchRequest) -> Result<SearchOutcome, RuntimeError> {
        self.roundtrip(|resp| Command::Search { request, resp })
            .await
    }

    /// See [`Session::book`].
    pub async fn book(&self, itinerary: usize) -> Result<BookOutcome, RuntimeError> {
        self.roundtrip(|resp| Command::Book { itinerary, resp })
            .await
    }

    /// See [`Session::pay`].
    pub async fn pay(&self, reservation: ReservationId) -> Result<PayOutcome, RuntimeError> {
        self.roundtrip(|resp| Command::Pay { reservation, resp })
            .await
    }

    /// See [`Session::cancel`].
    pub async fn cancel(&self, reservation: ReservationId) -> Result<CancelOutcome, RuntimeError> {
        self.roundtrip(|resp| Command::Cancel { reservation, resp })
            .await
    }

    /// See [`Session::reservations`].
    pub async fn reservations(&self) -> Result<ReservationsOutcome, RuntimeError> {
        self.roundtrip(|resp| Command::Reservations { resp }).await
    }

    /// Stops the worker after the commands already queued.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.roundtrip(|resp| Command::Shutdown { resp }).await
    }
}
