//! Background detail fetcher
//!
//! The UI thread hands `FetchRequest`s to this task and keeps running;
//! each request is served on its own task so a slow target does not hold
//! up the others. Completions go back as `FetchEvent`s, which the event
//! loop drains between frames.

use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::client::DetailSource;
use crate::detail::{FetchEvent, FetchRequest};

/// Serve fetch requests until the request channel closes.
pub async fn run_detail_fetch(
    source: Arc<dyn DetailSource>,
    mut requests: UnboundedReceiver<FetchRequest>,
    events: UnboundedSender<FetchEvent>,
) {
    log::info!("detail fetcher started");

    while let Some(request) = requests.recv().await {
        let source = Arc::clone(&source);
        let events = events.clone();
        tokio::spawn(async move {
            let result = source.fetch_detail(&request.key).await;
            match &result {
                Ok(resp) => log::info!(
                    "fetched {} ({} reasons)",
                    request.key,
                    resp.reasons.len()
                ),
                Err(e) => log::warn!("fetch of {} failed: {}", request.key, e),
            }
            if events
                .send(FetchEvent {
                    key: request.key,
                    result,
                })
                .is_err()
            {
                log::debug!("table gone, dropping completion");
            }
        });
    }

    log::info!("detail fetcher shutting down");
}
