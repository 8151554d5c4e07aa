//! Dispatcher
//!
//! [`Prompt`] is the entry point hosts talk to: it owns the registered
//! namespaces, routes each submitted line either to the command resolver or
//! to the feedback manager, and keeps a bounded history of everything it
//! reported. All output leaves through an injected [`PromptSink`] — three
//! explicit channels instead of callback fields, so there is no hidden
//! re-entrancy into host code.
//!
//! A `Prompt` is synchronous and single-threaded: one call to
//! [`Prompt::submit_input`] runs to completion before returning, and at
//! most one feedback request is outstanding at any time. Hosts that want
//! concurrent sessions create one `Prompt` per session.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use thiserror::Error;

use crate::feedback::{
    FeedbackManager, FeedbackOutcome, PendingFeedback, ResolvedFeedback, UserFeedback,
};
use crate::resolver::{resolve, InCommand, ResolveError, ResolvedCommand, UserSpace};

/// Everything the command channel can carry: a resolution or a structured
/// failure. Malformed end-user input always ends up here, never in a panic.
pub type CommandOutcome = Result<ResolvedCommand, ResolveError>;

/// Output channels of a [`Prompt`].
///
/// `on_log` carries human-readable diagnostic and status lines, `on_command`
/// carries resolution results, and `on_feedback` carries resolved
/// confirmation events.
pub trait PromptSink {
    fn on_log(&mut self, message: &str);
    fn on_command(&mut self, outcome: &CommandOutcome);
    fn on_feedback(&mut self, resolved: &ResolvedFeedback);
}

/// Host-tunable dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOptions {
    /// History cap; the oldest entries are evicted once it is reached.
    pub max_log_lines: usize,
}

impl Default for PromptOptions {
    fn default() -> Self {
        PromptOptions {
            max_log_lines: 1000,
        }
    }
}

/// Dispatcher-level host errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("namespace not found: `{0}`")]
    UnknownNamespace(String),
}

/// Message logged when commands are registered before `initiate`.
const NOT_INITIALIZED: &str = "Prompt is not initialized; call initiate first.";

/// The dispatcher. See the module docs for the protocol.
pub struct Prompt {
    spaces: HashMap<String, UserSpace>,
    active: Option<String>,
    feedback_table: HashMap<usize, UserFeedback>,
    manager: FeedbackManager,
    log: VecDeque<String>,
    options: PromptOptions,
    next_request: usize,
    sink: Box<dyn PromptSink>,
}

impl Prompt {
    pub fn new(sink: Box<dyn PromptSink>) -> Self {
        Self::with_options(sink, PromptOptions::default())
    }

    pub fn with_options(sink: Box<dyn PromptSink>, options: PromptOptions) -> Self {
        Prompt {
            spaces: HashMap::new(),
            active: None,
            feedback_table: HashMap::new(),
            manager: FeedbackManager::new(),
            log: VecDeque::new(),
            options,
            next_request: 0,
            sink,
        }
    }

    /// Registers the first namespace, makes it active, and installs the
    /// feedback table. Clears any state from a previous initiation.
    pub fn initiate(
        &mut self,
        namespace: &str,
        commands: BTreeMap<usize, InCommand>,
        extensions: BTreeMap<usize, InCommand>,
        feedback: HashMap<usize, UserFeedback>,
    ) {
        self.spaces.clear();
        self.log.clear();
        self.manager.reset();
        self.feedback_table = feedback;
        self.next_request = 0;

        let space = UserSpace::new(namespace, commands, extensions);
        self.active = Some(namespace.to_lowercase());
        self.register_space(space);
    }

    /// Registers an additional namespace. Registering before `initiate` is
    /// reported on the log channel; registering a namespace name twice is a
    /// host contract violation and panics.
    pub fn add_commands(
        &mut self,
        namespace: &str,
        commands: BTreeMap<usize, InCommand>,
        extensions: BTreeMap<usize, InCommand>,
    ) {
        if self.spaces.is_empty() {
            self.emit_log(NOT_INITIALIZED.to_string());
            return;
        }
        self.register_space(UserSpace::new(namespace, commands, extensions));
    }

    /// Makes another registered namespace active. History and registrations
    /// stay untouched; an unknown name is an error value, never a panic.
    pub fn switch_namespace(&mut self, namespace: &str) -> Result<(), PromptError> {
        let key = namespace.to_lowercase();
        if !self.spaces.contains_key(&key) {
            tracing::warn!(namespace, "namespace switch to unknown namespace");
            return Err(PromptError::UnknownNamespace(namespace.to_string()));
        }
        tracing::debug!(namespace, "switching active namespace");
        self.active = Some(key);
        Ok(())
    }

    /// Routes one line of input: to the command resolver in the normal
    /// state, to the feedback manager while a confirmation is pending.
    pub fn submit_input(&mut self, line: &str) {
        if self.manager.is_waiting() {
            self.handle_feedback_input(line);
            return;
        }

        let Some(space) = self.active_space() else {
            self.emit_log(NOT_INITIALIZED.to_string());
            return;
        };

        let outcome = resolve(line, space);
        if let Ok(resolved) = &outcome {
            if let Some(feedback_id) = self.feedback_requirement(resolved) {
                self.request_feedback(feedback_id, line, resolved.clone());
                return;
            }
        }
        self.emit_command(outcome);
    }

    /// Cancels any pending feedback request on behalf of the host.
    pub fn cancel_feedback(&mut self) {
        if self.manager.is_waiting() {
            self.manager.reset();
            self.emit_log("Pending feedback request cancelled.".to_string());
        }
    }

    /// Whether a confirmation is pending.
    pub fn is_waiting(&self) -> bool {
        self.manager.is_waiting()
    }

    /// The currently active namespace name, once initiated.
    pub fn active_namespace(&self) -> Option<&str> {
        self.active_space().map(|space| space.name())
    }

    /// The bounded history, oldest first.
    pub fn log(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }

    fn active_space(&self) -> Option<&UserSpace> {
        self.active
            .as_ref()
            .and_then(|key| self.spaces.get(key))
    }

    fn register_space(&mut self, space: UserSpace) {
        let key = space.name().to_lowercase();
        if self.spaces.contains_key(&key) {
            panic!("namespace `{}` is already registered", space.name());
        }
        tracing::debug!(namespace = space.name(), "registering namespace");
        self.spaces.insert(key, space);
    }

    /// The feedback id demanded by the resolution, if any: the base command
    /// first, then the extension chain in order.
    fn feedback_requirement(&self, resolved: &ResolvedCommand) -> Option<usize> {
        let space = self.active_space()?;
        if let Some(id) = space
            .command_descriptor(resolved.key)
            .and_then(|descriptor| descriptor.feedback_id)
        {
            return Some(id);
        }
        resolved.extensions.iter().find_map(|extension| {
            space
                .extension_descriptor(extension.key)
                .and_then(|descriptor| descriptor.feedback_id)
        })
    }

    fn request_feedback(&mut self, feedback_id: usize, line: &str, resolved: ResolvedCommand) {
        let Some(feedback) = self.feedback_table.get(&feedback_id).cloned() else {
            // Registry points at a feedback entry that was never supplied;
            // hold the command back rather than dispatching unconfirmed
            self.emit_log(format!(
                "No feedback registered under id {feedback_id}; command `{line}` dropped."
            ));
            return;
        };

        self.next_request += 1;
        let pending = PendingFeedback {
            request_id: format!("req-{:04}", self.next_request),
            key: resolved.key,
            branch_id: 0,
            command: line.trim().to_string(),
            awaited: Some(resolved),
            feedback,
        };
        let prompt_text = pending.feedback.to_string();
        self.manager.request(pending);
        self.emit_log(prompt_text.trim_end().to_string());
    }

    fn handle_feedback_input(&mut self, line: &str) {
        match self.manager.process_input(line) {
            FeedbackOutcome::Invalid => {
                self.emit_log("Input was not valid.".to_string());
            }
            FeedbackOutcome::NotAllowed(answer) => {
                self.emit_log(format!("Option `{answer}` is not allowed here."));
            }
            FeedbackOutcome::Resolved(resolved) => {
                self.emit_log(format!("Feedback accepted: {}.", resolved.answer));
                self.sink.on_feedback(&resolved);
            }
        }
    }

    fn emit_command(&mut self, outcome: CommandOutcome) {
        let line = match &outcome {
            Ok(resolved) => resolved.to_string(),
            Err(error) => error.to_string(),
        };
        self.push_log(line);
        self.sink.on_command(&outcome);
    }

    fn emit_log(&mut self, message: String) {
        self.push_log(message.clone());
        self.sink.on_log(&message);
    }

    fn push_log(&mut self, message: String) {
        if self.log.len() == self.options.max_log_lines {
            self.log.pop_front();
        }
        self.log.push_back(message);
    }
}
