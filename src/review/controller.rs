use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::FormError;
use crate::messaging::channel::MessageChannel;
use crate::messaging::message::{Request, Response};
use crate::review::review_model::{ReviewSession, Status};

/// How long a fill result stays visible before the controller resets.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Analyzing,
    Reviewing(ReviewSession),
    Filling,
}

/// Discriminant of `ControllerState`, for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Analyzing,
    Reviewing,
    Filling,
}

/// Sequences analyze → review → fill against the content side.
///
/// Each action is only accepted in its own state, so a call that is still
/// outstanding can never be re-entered. Failures always land back in `Idle`
/// with an error status.
pub struct ReviewController<C> {
    channel: C,
    state: ControllerState,
    status: Status,
    reset_delay: Duration,
}

impl<C: MessageChannel> ReviewController<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            state: ControllerState::Idle,
            status: Status::ready(),
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            ControllerState::Idle => Phase::Idle,
            ControllerState::Analyzing => Phase::Analyzing,
            ControllerState::Reviewing(_) => Phase::Reviewing,
            ControllerState::Filling => Phase::Filling,
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    pub fn session(&self) -> Option<&ReviewSession> {
        match &self.state {
            ControllerState::Reviewing(session) => Some(session),
            _ => None,
        }
    }

    /// The in-progress review, for editing rows before `fill`.
    pub fn session_mut(&mut self) -> Option<&mut ReviewSession> {
        match &mut self.state {
            ControllerState::Reviewing(session) => Some(session),
            _ => None,
        }
    }

    fn transition(&mut self, next: ControllerState) {
        let from = self.phase();
        self.state = next;
        debug!(?from, to = ?self.phase(), "controller transition");
    }

    fn set_status(&mut self, status: Status) -> Status {
        info!(message = %status.message, kind = ?status.kind, "status");
        self.status = status.clone();
        status
    }

    // ------------------------------------------------------------------------
    // analyze
    // ------------------------------------------------------------------------

    /// Extract fields and fetch suggestions. On success the controller holds
    /// a fresh `ReviewSession`.
    pub fn analyze(&mut self, requirements: &str) -> Status {
        if self.phase() != Phase::Idle {
            return self.set_status(Status::error(
                "Finish or cancel the current review before analyzing again.",
            ));
        }

        let requirements = requirements.trim();
        if requirements.is_empty() {
            return self.set_status(Status::error(FormError::EmptyRequirements.to_string()));
        }

        self.transition(ControllerState::Analyzing);
        self.set_status(Status::info("Analyzing form and contacting AI..."));

        let reply = self.channel.send(Request::GetAiSuggestions {
            requirements: requirements.to_string(),
        });

        match reply {
            Ok(Response {
                success: true,
                suggested_values: Some(suggestions),
                detected_fields: Some(fields),
                ..
            }) => {
                let session = ReviewSession::new(fields, suggestions);
                self.transition(ControllerState::Reviewing(session));
                self.set_status(Status::success("Review AI suggestions below."))
            }
            Ok(reply) => {
                self.transition(ControllerState::Idle);
                self.set_status(Status::error(
                    reply.message_or("AI failed to provide valid suggestions."),
                ))
            }
            Err(e) => {
                warn!(error = %e, "analyze failed");
                self.transition(ControllerState::Idle);
                self.set_status(Status::error(format!("Error: {}", e)))
            }
        }
    }

    // ------------------------------------------------------------------------
    // fill / cancel
    // ------------------------------------------------------------------------

    /// Send the reviewed values to the page. Returns the fill result; the
    /// controller is back in `Idle` (status "Ready.") once the reset delay
    /// has passed.
    pub fn fill(&mut self) -> Status {
        let session = match std::mem::replace(&mut self.state, ControllerState::Filling) {
            ControllerState::Reviewing(session) => session,
            other => {
                self.state = other;
                return self.set_status(Status::error(
                    "Nothing to fill: analyze the page first.",
                ));
            }
        };
        debug!(to = ?Phase::Filling, "controller transition");

        let values = session.apply_map();
        self.set_status(Status::info("Filling form..."));

        let result = match self.channel.send(Request::FillForm { values }) {
            Ok(reply) if reply.success => {
                self.set_status(Status::success(reply.message_or("Form filled successfully!")))
            }
            Ok(reply) => self.set_status(Status::error(reply.message_or("Failed to fill form."))),
            Err(e) => self.set_status(Status::error(format!("Error: {}", e))),
        };

        // Keep the result visible before resetting
        if !self.reset_delay.is_zero() {
            thread::sleep(self.reset_delay);
        }
        self.reset();
        result
    }

    /// Drop the in-progress review. In-flight calls are not aborted.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.transition(ControllerState::Idle);
        self.status = Status::ready();
    }
}
