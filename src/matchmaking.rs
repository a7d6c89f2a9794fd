//! FIFO queue of participants waiting for an opponent.

use crate::participant::ParticipantHandle;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Result of a pairing attempt.
pub enum PairAttempt {
    /// The two longest-waiting participants, oldest first.
    Paired(ParticipantHandle, ParticipantHandle),
    /// Exactly one participant is waiting.
    Waiting(ParticipantHandle),
    /// Nobody is waiting.
    Empty,
}

impl PairAttempt {
    /// The pair, if one was formed.
    pub fn into_pair(self) -> Option<(ParticipantHandle, ParticipantHandle)> {
        match self {
            PairAttempt::Paired(first, second) => Some((first, second)),
            PairAttempt::Waiting(_) | PairAttempt::Empty => None,
        }
    }
}

impl std::fmt::Debug for PairAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairAttempt::Paired(first, second) => f
                .debug_tuple("Paired")
                .field(&first.label())
                .field(&second.label())
                .finish(),
            PairAttempt::Waiting(sole) => f.debug_tuple("Waiting").field(&sole.label()).finish(),
            PairAttempt::Empty => f.write_str("Empty"),
        }
    }
}

/// Shared handle to the waiting list.
///
/// Cloning yields another handle to the same queue. Every operation takes
/// the lock for its whole duration, so concurrent callers see one FIFO order
/// and nobody is handed out twice.
#[derive(Clone, Default)]
pub struct MatchmakingQueue {
    waiting: Arc<Mutex<VecDeque<ParticipantHandle>>>,
}

impl MatchmakingQueue {
    /// Creates an empty queue.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating matchmaking queue");
        Self::default()
    }

    /// Appends `participant` to the tail.
    ///
    /// Returns `false`, leaving the queue untouched, if that very handle is
    /// already waiting.
    #[instrument(skip_all, fields(participant = participant.label()))]
    pub fn enqueue(&self, participant: ParticipantHandle) -> bool {
        let mut waiting = self.lock();
        if waiting.iter().any(|p| Arc::ptr_eq(p, &participant)) {
            warn!("Participant already waiting");
            return false;
        }
        waiting.push_back(participant);
        debug!(waiting = waiting.len(), "Participant enqueued");
        true
    }

    /// Takes `participant` out of the queue. Returns whether it was waiting.
    #[instrument(skip_all, fields(participant = participant.label()))]
    pub fn remove(&self, participant: &ParticipantHandle) -> bool {
        let mut waiting = self.lock();
        let before = waiting.len();
        waiting.retain(|p| !Arc::ptr_eq(p, participant));
        let removed = waiting.len() != before;
        if removed {
            debug!(waiting = waiting.len(), "Participant removed");
        }
        removed
    }

    /// Removes and returns the two longest-waiting participants, if present.
    ///
    /// Participants whose disconnect signal already fired are dropped from
    /// the queue first.
    #[instrument(skip(self))]
    pub fn attempt_pair(&self) -> PairAttempt {
        let mut waiting = self.lock();
        waiting.retain(|p| {
            let gone = p.disconnect_signal().is_fired();
            if gone {
                info!(participant = p.label(), "Evicting disconnected participant");
            }
            !gone
        });

        if waiting.len() < 2 {
            return match waiting.front() {
                Some(sole) => PairAttempt::Waiting(Arc::clone(sole)),
                None => PairAttempt::Empty,
            };
        }

        match (waiting.pop_front(), waiting.pop_front()) {
            (Some(first), Some(second)) => {
                info!(
                    first = first.label(),
                    second = second.label(),
                    remaining = waiting.len(),
                    "Paired participants"
                );
                PairAttempt::Paired(first, second)
            }
            _ => PairAttempt::Empty,
        }
    }

    /// Number of waiting participants.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ParticipantHandle>> {
        // The queue holds no invariant a panicking holder could break halfway.
        self.waiting.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for MatchmakingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchmakingQueue")
            .field("waiting", &self.len())
            .finish()
    }
}
