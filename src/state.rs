use crate::stats::BucketZone;
use crate::storage::EventStore;
use std::sync::Arc;

pub struct AppState<S> {
    pub store: Arc<S>,
    pub zone: BucketZone,
}

impl<S: EventStore> AppState<S> {
    pub fn new(store: S, zone: BucketZone) -> Self {
        Self {
            store: Arc::new(store),
            zone,
        }
    }
}

// Manual impl: the store itself need not be `Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            zone: self.zone,
        }
    }
}
