//! Process-wide loop turning admissions into sessions.

use crate::error::{IntakeError, SessionError};
use crate::matchmaking::{MatchmakingQueue, PairAttempt};
use crate::participant::ParticipantHandle;
use crate::session::{Outcome, Session};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, instrument, warn};

/// Message sent to a participant left alone in the queue.
pub const DEFAULT_WAITING_MESSAGE: &str = "Please wait for other players";

/// Announcement that a participant is ready to be paired.
pub struct Admission {
    participant: ParticipantHandle,
}

impl Admission {
    /// The admitted participant.
    pub fn participant(&self) -> &ParticipantHandle {
        &self.participant
    }
}

/// Handle transports use to admit participants.
///
/// Admitting enqueues the participant and then wakes the intake loop. The
/// channel is unbounded; admission never waits.
#[derive(Debug, Clone)]
pub struct Admissions {
    queue: MatchmakingQueue,
    events: mpsc::UnboundedSender<Admission>,
}

impl Admissions {
    /// Enqueues `participant` and notifies the intake loop.
    ///
    /// # Errors
    ///
    /// Fails if the participant is already waiting, or if the intake loop
    /// has stopped; in the latter case the participant is taken back out of
    /// the queue.
    #[instrument(skip_all, fields(participant = participant.label()))]
    pub fn admit(&self, participant: ParticipantHandle) -> Result<(), IntakeError> {
        if !self.queue.enqueue(participant.clone()) {
            return Err(IntakeError::new(format!(
                "Participant {} is already waiting",
                participant.label()
            )));
        }
        let admission = Admission {
            participant: participant.clone(),
        };
        if self.events.send(admission).is_err() {
            self.queue.remove(&participant);
            warn!("Intake loop stopped, refusing participant");
            return Err(IntakeError::new("Intake loop is not running"));
        }
        info!("Participant admitted");
        Ok(())
    }
}

/// Consumer side of the admission channel.
pub struct Intake {
    queue: MatchmakingQueue,
    events: mpsc::UnboundedReceiver<Admission>,
    waiting_message: String,
    waiting_notice: Option<WaitingNotice>,
}

/// Delivery of the waiting message to the participant waiting alone.
struct WaitingNotice {
    participant: ParticipantHandle,
    delivery: JoinHandle<()>,
}

/// Creates the admission channel over `queue`.
#[instrument]
pub fn intake(queue: MatchmakingQueue) -> (Admissions, Intake) {
    let (tx, rx) = mpsc::unbounded_channel();
    let admissions = Admissions {
        queue: queue.clone(),
        events: tx,
    };
    let intake = Intake {
        queue,
        events: rx,
        waiting_message: DEFAULT_WAITING_MESSAGE.to_string(),
        waiting_notice: None,
    };
    (admissions, intake)
}

impl Intake {
    /// Replaces the message sent to a participant waiting alone.
    pub fn with_waiting_message(mut self, message: impl Into<String>) -> Self {
        self.waiting_message = message.into();
        self
    }

    /// Runs until every [`Admissions`] handle is dropped, then waits for the
    /// sessions it started.
    ///
    /// Each admission triggers exactly one pairing attempt. Sessions run as
    /// separate tasks and never block the loop.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("Intake loop started");
        let mut sessions: JoinSet<Result<Outcome, SessionError>> = JoinSet::new();

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(admission) => self.on_admission(admission, &mut sessions),
                    None => break,
                },
                Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                    reap(finished);
                }
            }
        }

        info!(running = sessions.len(), "Admissions closed, draining sessions");
        while let Some(finished) = sessions.join_next().await {
            reap(finished);
        }
        info!("Intake loop stopped");
    }

    fn on_admission(
        &mut self,
        admission: Admission,
        sessions: &mut JoinSet<Result<Outcome, SessionError>>,
    ) {
        debug!(participant = admission.participant().label(), "Admission received");
        match self.queue.attempt_pair() {
            PairAttempt::Paired(first, second) => {
                let notice = self.take_notice_for(&first, &second);
                sessions.spawn(async move {
                    // The waiting message must not arrive after the game started.
                    if let Some(delivery) = notice {
                        if let Err(e) = delivery.await {
                            warn!(error = %e, "Waiting notice task failed");
                        }
                    }
                    host_session(first, second).await
                });
            }
            PairAttempt::Waiting(sole) => {
                if self
                    .waiting_notice
                    .as_ref()
                    .is_some_and(|notice| Arc::ptr_eq(&notice.participant, &sole))
                {
                    debug!(participant = sole.label(), "Already told to wait");
                    return;
                }
                let message = self.waiting_message.clone();
                let participant = Arc::clone(&sole);
                let delivery = tokio::spawn(async move {
                    if let Err(e) = sole.notify(&message).await {
                        warn!(participant = sole.label(), error = %e, "Failed to send waiting notice");
                    }
                });
                self.waiting_notice = Some(WaitingNotice {
                    participant,
                    delivery,
                });
            }
            PairAttempt::Empty => debug!("Nobody waiting"),
        }
    }

    /// Hands over the pending waiting notice if it went to either player.
    fn take_notice_for(
        &mut self,
        first: &ParticipantHandle,
        second: &ParticipantHandle,
    ) -> Option<JoinHandle<()>> {
        let notice = self.waiting_notice.take()?;
        if Arc::ptr_eq(&notice.participant, first) || Arc::ptr_eq(&notice.participant, second) {
            Some(notice.delivery)
        } else {
            None
        }
    }
}

/// Plays one session between `first` (Cross) and `second` (Circle), then
/// releases both, whatever the outcome.
#[instrument(skip_all, fields(first = first.label(), second = second.label()))]
pub async fn host_session(
    first: ParticipantHandle,
    second: ParticipantHandle,
) -> Result<Outcome, SessionError> {
    let mut session = Session::pair(first, second);
    let result = session.run().await;
    match &result {
        Ok(outcome) => info!(?outcome, "Session complete"),
        Err(e) => error!(error = %e, "Session ended with error"),
    }
    session.release().await;
    result
}

fn reap(finished: Result<Result<Outcome, SessionError>, tokio::task::JoinError>) {
    if let Err(e) = finished {
        error!(error = %e, "Session task failed");
    }
}
