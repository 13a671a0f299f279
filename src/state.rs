use std::sync::Arc;

use crate::store::GradeStore;

pub type SharedState = Arc<AppState>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GradeStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn GradeStore>) -> Self {
        Self { store }
    }
}
