//! In-flight registration middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::lifecycle::InFlightTracker;

/// Register the request with the drain tracker for its full duration.
///
/// The guard is held across the downstream future, so the registration is
/// released when the response is produced, the handler panics, or the task
/// is dropped mid-flight.
pub async fn track_in_flight(
    State(tracker): State<Arc<InFlightTracker>>,
    request: Request,
    next: Next,
) -> Response {
    let _guard = tracker.register();
    next.run(request).await
}
