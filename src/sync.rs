use crate::models::PendingEdit;
use crate::remote::StudentService;
use crate::session::{FetchOutcome, ScanSession};
use std::{sync::Arc, time::Duration, time::Instant};
use tokio::{
    sync::{Mutex, Notify},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

/// Moves data between the session and the remote service.
///
/// Fetches and edit submissions never hold the session lock across I/O, so
/// the operator can keep toggling while requests are outstanding.
#[derive(Clone)]
pub struct Syncer {
    session: Arc<Mutex<ScanSession>>,
    service: Arc<dyn StudentService>,
    wake: Arc<Notify>,
}

impl Syncer {
    pub fn new(session: Arc<Mutex<ScanSession>>, service: Arc<dyn StudentService>) -> Self {
        Self {
            session,
            service,
            wake: Arc::new(Notify::new()),
        }
    }

    /// Asks the polling loop to fetch now instead of waiting for the timer.
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    /// Runs one fetch for the current selection, if there is one.
    pub async fn fetch_once(&self) -> Option<FetchOutcome> {
        let ticket = self.session.lock().await.begin_fetch()?;
        let result = self
            .service
            .fetch_student(&ticket.token, &ticket.student_id)
            .await;
        if let Err(err) = &result {
            warn!(student_id = %ticket.student_id, "student fetch failed: {err}");
        }

        let mut session = self.session.lock().await;
        Some(session.apply_fetch(&ticket, result, Instant::now()))
    }

    /// Submits an edit in the background. Failures are not rolled back; the
    /// loop is woken so the next fetch shows what the service actually holds.
    pub fn dispatch(&self, edit: PendingEdit) -> JoinHandle<()> {
        let syncer = self.clone();
        tokio::spawn(async move {
            debug!(student_id = %edit.student_id, kind = edit.request.kind(), "submitting edit");
            if let Err(err) = syncer.service.submit(&edit).await {
                warn!(
                    student_id = %edit.student_id,
                    kind = edit.request.kind(),
                    "edit submission failed: {err}"
                );
                syncer.wake();
            }
        })
    }

    /// Starts the polling loop. At most one fetch is outstanding; a wake that
    /// arrives while it runs is kept by the `Notify` permit and served next.
    pub fn spawn_loop(&self, period: Duration) -> JoinHandle<()> {
        let syncer = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = syncer.wake.notified() => ticker.reset(),
                }
                syncer.fetch_once().await;
            }
        })
    }
}
