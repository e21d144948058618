use std::sync::Arc;

use tripboard_core::{TripPlanner, TripStore};

/// Shared application state accessible from all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub planner: TripPlanner,
}

impl AppState {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self {
            planner: TripPlanner::new(store),
        }
    }
}
