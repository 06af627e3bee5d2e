use crate::errors::AppError;
use crate::models::{Event, EventKind, RawEvent};
use chrono::Utc;
use std::future::Future;
use std::path::{Path, PathBuf};
use serde_json::Value;
use tokio::{fs, sync::Mutex};
use tracing::{debug, error, info};

/// Append-only event log consumed by the handlers.
///
/// Reads never fail: a store that cannot produce its events reports none.
pub trait EventStore: Send + Sync + 'static {
    fn get_events(&self) -> impl Future<Output = Vec<RawEvent>> + Send;

    fn log_event(&self, kind: EventKind) -> impl Future<Output = Result<Event, AppError>> + Send;

    fn clear_events(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Keeps the whole log as one JSON array in a single file.
///
/// Stored items are held verbatim, so entries the aggregator cannot use are
/// written back unchanged.
pub struct JsonFileStore {
    path: PathBuf,
    items: Mutex<Vec<Value>>,
}

impl JsonFileStore {
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let items = load_events(&path).await;
        info!(path = %path.display(), count = items.len(), "loaded event log");
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventStore for JsonFileStore {
    async fn get_events(&self) -> Vec<RawEvent> {
        to_raw_events(&self.items.lock().await)
    }

    async fn log_event(&self, kind: EventKind) -> Result<Event, AppError> {
        let event = Event::new(kind, Utc::now());
        let item = serde_json::to_value(RawEvent::from(&event)).map_err(AppError::internal)?;
        let mut items = self.items.lock().await;
        items.push(item);

        if let Err(err) = persist_events(&self.path, &items).await {
            items.pop();
            return Err(err);
        }

        Ok(event)
    }

    async fn clear_events(&self) -> Result<(), AppError> {
        let mut items = self.items.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        items.clear();
        Ok(())
    }
}

/// Keeps events in memory only.
#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<Vec<RawEvent>>,
}

impl MemoryStore {
    pub fn with_events(events: Vec<RawEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }
}

impl EventStore for MemoryStore {
    async fn get_events(&self) -> Vec<RawEvent> {
        self.events.lock().await.clone()
    }

    async fn log_event(&self, kind: EventKind) -> Result<Event, AppError> {
        let event = Event::new(kind, Utc::now());
        self.events.lock().await.push(RawEvent::from(&event));
        Ok(event)
    }

    async fn clear_events(&self) -> Result<(), AppError> {
        self.events.lock().await.clear();
        Ok(())
    }
}

pub async fn load_events(path: &Path) -> Vec<Value> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            error!("failed to read event log: {err}");
            return Vec::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(items) => items,
        Err(err) => {
            error!("failed to parse event log: {err}");
            Vec::new()
        }
    }
}

/// Views stored items as events; items that are not JSON objects are skipped.
pub fn to_raw_events(items: &[Value]) -> Vec<RawEvent> {
    let events: Vec<RawEvent> = items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();
    if events.len() < items.len() {
        debug!(skipped = items.len() - events.len(), "non-object entries in event log");
    }
    events
}

pub async fn persist_events(path: &Path, items: &[Value]) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(items).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
