use crate::config::Config;
use crate::remote::StudentService;
use crate::session::ScanSession;
use crate::storage::Preferences;
use crate::sync::Syncer;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<Mutex<ScanSession>>,
    pub syncer: Syncer,
}

impl AppState {
    pub fn new(config: Config, preferences: Preferences, service: Arc<dyn StudentService>) -> Self {
        let session = Arc::new(Mutex::new(ScanSession::new(&preferences, config.notice_ttl)));
        let syncer = Syncer::new(Arc::clone(&session), service);
        Self {
            config: Arc::new(config),
            session,
            syncer,
        }
    }
}
