//! Background continuation fetching
//!
//! When a track is selected the controller hands a [`SelectionTicket`] and a
//! [`ContinuationSink`] to its [`ContinuationFetcher`]. The fetcher runs the
//! lookup off the caller's thread and reports back through the sink, which
//! re-enters the controller's synchronized entry point. Whether the result is
//! still wanted is decided there, not here.

use crate::controller::{PlaybackController, Shared};
use crate::reconciler::SelectionTicket;
use riff_core::{Track, TrackProvider, TrackSource};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Starts continuation lookups
pub trait ContinuationFetcher: Send + Sync {
    /// Start fetching the continuation for `ticket` and deliver it to `sink`
    ///
    /// Must not block.
    fn request(&self, ticket: SelectionTicket, sink: ContinuationSink);
}

/// Where a finished continuation fetch reports its result
///
/// Holds only a weak reference: a fetch that outlives the controller is
/// silently dropped.
#[derive(Clone)]
pub struct ContinuationSink {
    shared: Weak<Shared>,
}

impl ContinuationSink {
    pub(crate) fn new(shared: Weak<Shared>) -> Self {
        Self { shared }
    }

    /// Hand a continuation back to the controller
    ///
    /// Returns whether it was installed (false when stale or when the
    /// controller is gone).
    pub fn deliver(&self, ticket: SelectionTicket, continuation: Vec<Track>) -> bool {
        match self.shared.upgrade() {
            Some(shared) => PlaybackController::from_shared(shared)
                .on_continuation_ready(&ticket, continuation),
            None => false,
        }
    }
}

impl std::fmt::Debug for ContinuationSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContinuationSink")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

/// Fetcher for front ends without any provider
///
/// Resolves every selection immediately with an empty continuation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContinuation;

impl ContinuationFetcher for NoContinuation {
    fn request(&self, ticket: SelectionTicket, sink: ContinuationSink) {
        sink.deliver(ticket, Vec::new());
    }
}

/// Routes each selection to the [`TrackProvider`] registered for its source
/// and runs the lookup on a tokio runtime
pub struct ProviderContinuations {
    runtime: Handle,
    providers: HashMap<TrackSource, Arc<dyn TrackProvider>>,
}

impl ProviderContinuations {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            providers: HashMap::new(),
        }
    }

    /// Register a provider under its own source tag
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn TrackProvider>) -> Self {
        self.providers.insert(provider.source(), provider);
        self
    }
}

impl ContinuationFetcher for ProviderContinuations {
    fn request(&self, ticket: SelectionTicket, sink: ContinuationSink) {
        let source = ticket.track().source;
        let Some(provider) = self.providers.get(&source).cloned() else {
            debug!(source = %source, "No continuation provider registered");
            sink.deliver(ticket, Vec::new());
            return;
        };

        self.runtime.spawn(async move {
            let continuation = match provider.fetch_continuation(ticket.track()).await {
                Ok(tracks) => tracks,
                Err(err) => {
                    warn!(
                        error = %err,
                        track = %ticket.track().display_label(),
                        "Continuation fetch failed"
                    );
                    Vec::new()
                }
            };

            debug!(
                generation = ticket.generation(),
                tracks = continuation.len(),
                "Continuation fetched"
            );
            sink.deliver(ticket, continuation);
        });
    }
}
