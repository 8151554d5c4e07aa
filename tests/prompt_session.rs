//! Whole-session dispatcher scenarios: resolution, overloads, extension
//! chains, feedback pauses, and namespace switching through the public
//! surface only.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use cmdscript::feedback::{AvailableAnswer, ResolvedFeedback};
use cmdscript::{
    CommandOutcome, InCommand, Prompt, PromptSink, ResolveError, UserFeedback,
};

#[derive(Default)]
struct Recording {
    logs: Vec<String>,
    commands: Vec<CommandOutcome>,
    feedback: Vec<ResolvedFeedback>,
}

struct RecordingSink(Rc<RefCell<Recording>>);

impl PromptSink for RecordingSink {
    fn on_log(&mut self, message: &str) {
        self.0.borrow_mut().logs.push(message.to_string());
    }

    fn on_command(&mut self, outcome: &CommandOutcome) {
        self.0.borrow_mut().commands.push(outcome.clone());
    }

    fn on_feedback(&mut self, resolved: &ResolvedFeedback) {
        self.0.borrow_mut().feedback.push(resolved.clone());
    }
}

fn base_commands() -> BTreeMap<usize, InCommand> {
    BTreeMap::from([
        (0, InCommand::new("com1", 2, "Help com1")),
        (1, InCommand::new("com2", 0, "com2 Command Namespace 1")),
        (2, InCommand::new("com3", 0, "Special case no Parameter")),
    ])
}

fn extension_commands() -> BTreeMap<usize, InCommand> {
    BTreeMap::from([
        (0, InCommand::new("Help", 0, "describe the base command")),
        (
            1,
            InCommand::new("tryrun", 0, "show results and optionally run").with_feedback(1),
        ),
    ])
}

fn feedback_table() -> HashMap<usize, UserFeedback> {
    HashMap::from([(
        1,
        UserFeedback {
            message: "Do you want to commit the following changes?".into(),
            show_before_command: true,
            options: BTreeMap::from([
                (
                    AvailableAnswer::Yes,
                    "If you want to execute the command type yes".into(),
                ),
                (
                    AvailableAnswer::No,
                    "If you want to stop executing the command type no".into(),
                ),
            ]),
        },
    )])
}

fn session() -> (Prompt, Rc<RefCell<Recording>>) {
    let recording = Rc::new(RefCell::new(Recording::default()));
    let mut prompt = Prompt::new(Box::new(RecordingSink(Rc::clone(&recording))));
    prompt.initiate(
        "UserSpace 1",
        base_commands(),
        extension_commands(),
        feedback_table(),
    );
    (prompt, recording)
}

#[test]
fn test_overload_resolution_through_the_dispatcher() {
    let (mut prompt, recording) = session();

    prompt.submit_input("com1(1,2)");
    prompt.submit_input("com1(1)");

    let recording = recording.borrow();
    let resolved = recording.commands[0].as_ref().unwrap();
    assert_eq!(resolved.key, 0);
    assert_eq!(resolved.parameters, vec!["1", "2"]);

    assert_eq!(
        recording.commands[1],
        Err(ResolveError::WrongParameterCount {
            command: "com1".into(),
            found: 1
        })
    );
}

#[test]
fn test_unknown_command_is_reported_and_session_continues() {
    let (mut prompt, recording) = session();

    prompt.submit_input("unknown(1,2)");
    prompt.submit_input("com2()");

    let recording = recording.borrow();
    assert_eq!(
        recording.commands[0],
        Err(ResolveError::UnknownKeyword("unknown".into()))
    );
    assert!(recording.commands[1].is_ok());
}

#[test]
fn test_extension_chain_resolves_case_insensitively() {
    let (mut prompt, recording) = session();

    prompt.submit_input("coM1(1,2).help()");

    let recording = recording.borrow();
    let resolved = recording.commands[0].as_ref().unwrap();
    assert_eq!(resolved.key, 0);
    assert_eq!(resolved.extensions.len(), 1);
    assert_eq!(resolved.extensions[0].key, 0);
}

#[test]
fn test_guarded_extension_holds_the_command_back() {
    let (mut prompt, recording) = session();

    prompt.submit_input("com1(1,2).tryrun()");
    assert!(prompt.is_waiting());

    {
        let recording = recording.borrow();
        assert!(recording.commands.is_empty());
        assert!(recording.logs[0].contains("Do you want to commit"));
    }

    // Wrong answers keep the request pending
    prompt.submit_input("");
    prompt.submit_input("mehh");
    assert!(prompt.is_waiting());
    assert!(recording
        .borrow()
        .logs
        .iter()
        .filter(|line| line.as_str() == "Input was not valid.")
        .count()
        >= 2);

    // An offered answer resolves and unblocks the session
    prompt.submit_input(" yeS   ");
    assert!(!prompt.is_waiting());

    let recording = recording.borrow();
    assert_eq!(recording.feedback.len(), 1);
    let resolved = &recording.feedback[0];
    assert_eq!(resolved.answer, AvailableAnswer::Yes);
    assert_eq!(resolved.command, "com1(1,2).tryrun()");
    let awaited = resolved.awaited.as_ref().unwrap();
    assert_eq!(awaited.key, 0);
    assert_eq!(awaited.extensions[0].name, "tryrun");
    assert!(recording
        .logs
        .iter()
        .any(|line| line.contains("yes")));
}

#[test]
fn test_feedback_answers_arrive_with_fresh_request_ids() {
    let (mut prompt, recording) = session();

    prompt.submit_input("com1(1,2).tryrun()");
    prompt.submit_input("yes");
    prompt.submit_input("com1(3,4).tryrun()");
    prompt.submit_input("no");

    let recording = recording.borrow();
    assert_eq!(recording.feedback.len(), 2);
    assert_ne!(
        recording.feedback[0].request_id,
        recording.feedback[1].request_id
    );
    assert_eq!(recording.feedback[1].answer, AvailableAnswer::No);
}

#[test]
fn test_namespace_switching_keeps_history() {
    let (mut prompt, recording) = session();

    prompt.add_commands(
        "UserSpace 2",
        BTreeMap::from([(0, InCommand::new("com9", 0, "only in space 2"))]),
        BTreeMap::new(),
    );

    prompt.submit_input("com9()");
    prompt.switch_namespace("USERSPACE 2").unwrap();
    prompt.submit_input("com9()");

    let recording = recording.borrow();
    assert!(matches!(
        recording.commands[0],
        Err(ResolveError::UnknownKeyword(_))
    ));
    let resolved = recording.commands[1].as_ref().unwrap();
    assert_eq!(resolved.namespace, "UserSpace 2");

    // History spans both namespaces
    let history: Vec<&str> = prompt.log().collect();
    assert_eq!(history.len(), 2);
}

#[test]
fn test_switching_to_unknown_namespace_is_an_error_value() {
    let (mut prompt, _) = session();
    assert!(prompt.switch_namespace("missing").is_err());
    assert_eq!(prompt.active_namespace(), Some("UserSpace 1"));
}
