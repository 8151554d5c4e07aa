//! Confirmation feedback
//!
//! Some registered commands must not be dispatched until the user confirms
//! them with an answer from a small closed vocabulary. The
//! [`FeedbackManager`] is the two-state machine gating that: it is either
//! `Idle` or holding exactly one [`PendingFeedback`]. There is no queue —
//! one outstanding request per dispatcher, by design of the dispatch
//! protocol.
//!
//! The manager is deliberately silent: processing an answer returns a
//! [`FeedbackOutcome`] value and the dispatcher decides what to log and
//! emit, so the state machine never re-enters host code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::resolver::ResolvedCommand;

/// The closed set of answers a feedback prompt can offer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AvailableAnswer {
    Yes,
    No,
    Cancel,
}

impl FromStr for AvailableAnswer {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(AvailableAnswer::Yes),
            "no" => Ok(AvailableAnswer::No),
            "cancel" => Ok(AvailableAnswer::Cancel),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AvailableAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AvailableAnswer::Yes => "yes",
            AvailableAnswer::No => "no",
            AvailableAnswer::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// Host-registered prompt definition: the message shown to the user, whether
/// it is shown before the command would run, and the offered answers with
/// their explanations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFeedback {
    pub message: String,
    #[serde(default)]
    pub show_before_command: bool,
    pub options: BTreeMap<AvailableAnswer, String>,
}

impl fmt::Display for UserFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        writeln!(f, "You now have the following options:")?;
        for (answer, explanation) in &self.options {
            writeln!(f, "  {answer}: {}", explanation.trim())?;
        }
        Ok(())
    }
}

/// One in-flight confirmation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFeedback {
    /// Identifies the request towards listeners; must be non-empty.
    pub request_id: String,
    /// Id of the registered command being confirmed.
    pub key: usize,
    /// Which branch of a batched script the request originated from; `0`
    /// for direct input.
    pub branch_id: usize,
    /// The original command text.
    pub command: String,
    /// The resolution held back until the answer arrives.
    pub awaited: Option<ResolvedCommand>,
    /// The prompt definition shown to the user.
    pub feedback: UserFeedback,
}

impl PendingFeedback {
    fn answered(self, answer: AvailableAnswer) -> ResolvedFeedback {
        ResolvedFeedback {
            command: self.command,
            key: self.key,
            request_id: self.request_id,
            branch_id: self.branch_id,
            awaited: self.awaited,
            answer,
        }
    }
}

/// The event raised when a pending request resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFeedback {
    pub command: String,
    pub key: usize,
    pub request_id: String,
    pub branch_id: usize,
    pub awaited: Option<ResolvedCommand>,
    pub answer: AvailableAnswer,
}

/// What became of one line of answer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The input did not parse as any known answer; still waiting.
    Invalid,
    /// The input parsed, but the answer is not among the offered options;
    /// still waiting.
    NotAllowed(AvailableAnswer),
    /// The request resolved; the machine is idle again.
    Resolved(ResolvedFeedback),
}

enum State {
    Idle,
    Waiting(Box<PendingFeedback>),
}

/// Two-state machine holding at most one pending confirmation.
pub struct FeedbackManager {
    state: State,
}

impl FeedbackManager {
    pub fn new() -> Self {
        FeedbackManager { state: State::Idle }
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.state, State::Waiting(_))
    }

    /// The currently pending request, while waiting.
    pub fn pending(&self) -> Option<&PendingFeedback> {
        match &self.state {
            State::Waiting(pending) => Some(pending),
            State::Idle => None,
        }
    }

    /// Starts waiting on `pending`.
    ///
    /// A request without a usable identifier is ignored. Requesting while a
    /// request is already pending is a dispatch protocol violation and
    /// panics.
    pub fn request(&mut self, pending: PendingFeedback) {
        if pending.request_id.is_empty() {
            tracing::warn!("discarding feedback request without a request id");
            return;
        }
        match self.state {
            State::Idle => {
                tracing::debug!(request_id = %pending.request_id, "awaiting feedback");
                self.state = State::Waiting(Box::new(pending));
            }
            State::Waiting(_) => {
                panic!("feedback request while another request is pending");
            }
        }
    }

    /// Feeds one line of user input to the pending request.
    ///
    /// Only meaningful while waiting; calling this while idle is a
    /// dispatcher bug and panics. Invalid and not-allowed input leave the
    /// request pending for a retry.
    pub fn process_input(&mut self, input: &str) -> FeedbackOutcome {
        let pending = match &self.state {
            State::Waiting(pending) => pending,
            State::Idle => panic!("feedback input processed while no request is pending"),
        };

        let answer = match parse_answer(input, &pending.feedback.options) {
            Some(answer) => answer,
            None => return FeedbackOutcome::Invalid,
        };
        if !pending.feedback.options.contains_key(&answer) {
            return FeedbackOutcome::NotAllowed(answer);
        }

        let pending = match std::mem::replace(&mut self.state, State::Idle) {
            State::Waiting(pending) => *pending,
            State::Idle => unreachable!("state checked above"),
        };
        FeedbackOutcome::Resolved(pending.answered(answer))
    }

    /// Force-clears any pending request; used by hosts to cancel.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }
}

impl Default for FeedbackManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses an answer by enum name or, failing that, by matching the trimmed
/// explanation text of one of the offered options.
fn parse_answer(input: &str, options: &BTreeMap<AvailableAnswer, String>) -> Option<AvailableAnswer> {
    let input = input.trim();
    if let Ok(answer) = AvailableAnswer::from_str(input) {
        return Some(answer);
    }
    options
        .iter()
        .find(|(_, explanation)| explanation.trim().eq_ignore_ascii_case(input))
        .map(|(answer, _)| *answer)
}
