//! Track list reconciliation
//!
//! Holds the search results, the pending selection and the recently played
//! list, and decides whether an asynchronously fetched continuation still
//! belongs to the current selection.
//!
//! Every selection bumps a generation counter. A continuation is accepted only
//! when its [`SelectionTicket`] carries the generation of the pending
//! selection; anything else is stale and dropped.

use crate::history::RecentlyPlayed;
use riff_core::Track;
use tracing::debug;

/// Handle for one pending selection
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionTicket {
    generation: u64,
    track: Track,
}

impl SelectionTicket {
    /// Track whose continuation should be fetched
    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Selection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing selected
    Idle,
    /// Continuation fetch in flight
    Selecting,
    /// Context installed
    Active,
}

#[derive(Debug, Clone)]
pub struct TrackListReconciler {
    results: Vec<Track>,
    generation: u64,
    pending: Option<Track>,
    state: SelectionState,
    recent: RecentlyPlayed,
}

impl TrackListReconciler {
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            results: Vec::new(),
            generation: 0,
            pending: None,
            state: SelectionState::Idle,
            recent: RecentlyPlayed::new(recent_capacity),
        }
    }

    /// Replace the search results
    pub fn set_results(&mut self, results: Vec<Track>) {
        self.results = results;
    }

    pub fn results(&self) -> &[Track] {
        &self.results
    }

    /// Search result at `index`
    pub fn result(&self, index: usize) -> Option<&Track> {
        self.results.get(index)
    }

    /// Make `track` the pending selection
    ///
    /// Returns a ticket when a continuation should be fetched. Tracks without
    /// an id cannot have one, so they go straight to `Active`.
    pub fn begin_selection(&mut self, track: &Track) -> Option<SelectionTicket> {
        self.generation += 1;
        self.pending = Some(track.clone());
        self.recent.push(track.clone());

        if track.has_continuation() {
            self.state = SelectionState::Selecting;
            Some(SelectionTicket {
                generation: self.generation,
                track: track.clone(),
            })
        } else {
            self.state = SelectionState::Active;
            None
        }
    }

    /// Check a delivered continuation against the pending selection
    ///
    /// Returns the sequence `[selected] + continuation` when the ticket is
    /// current, `None` when it is stale.
    pub fn accept_continuation(
        &mut self,
        ticket: &SelectionTicket,
        continuation: Vec<Track>,
    ) -> Option<Vec<Track>> {
        let current = self.state == SelectionState::Selecting
            && ticket.generation == self.generation
            && self.pending.as_ref() == Some(&ticket.track);

        if !current {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                track = %ticket.track.name,
                "Discarding stale continuation"
            );
            return None;
        }

        self.state = SelectionState::Active;
        let mut sequence = Vec::with_capacity(continuation.len() + 1);
        sequence.push(ticket.track.clone());
        sequence.extend(continuation);
        Some(sequence)
    }

    /// An external playlist replaced whatever was selected
    pub fn supersede(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.state = SelectionState::Active;
    }

    /// Playback stopped; any in-flight continuation is now stale
    pub fn abandon(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.state = SelectionState::Idle;
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Selected track, while a selection is pending or active
    pub fn pending(&self) -> Option<&Track> {
        self.pending.as_ref()
    }

    /// Most recently selected first
    pub fn recently_played(&self) -> Vec<Track> {
        self.recent.to_vec()
    }

    pub fn restore_recent(&mut self, tracks: Vec<Track>) {
        self.recent.restore(tracks);
    }
}
