use std::sync::Arc;

use crate::service::WordWeave;

#[derive(Clone)]
pub struct ServerState {
    pub(crate) service: Arc<WordWeave>,
    pub(crate) max_body_bytes: usize,
}

impl ServerState {
    pub fn new(service: WordWeave, max_body_bytes: usize) -> Self {
        Self {
            service: Arc::new(service),
            max_body_bytes,
        }
    }
}
