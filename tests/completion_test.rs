mod common;

use std::fs::File;

use cmdgram::parser::{Delimiter, Quoting};
use cmdgram::*;
use common::{FailingCompleter, RecordingCompleter};
use pretty_assertions::assert_eq;

fn candidates(line: &str) -> Vec<(String, bool)> {
    let root = common::root();
    complete(&root, &EmptyCompleter, line)
        .unwrap()
        .candidates()
        .iter()
        .map(|c| (c.value.clone(), c.terminal))
        .collect()
}

fn values(line: &str) -> Vec<String> {
    candidates(line).into_iter().map(|(value, _)| value).collect()
}

#[test]
fn command_names() {
    assert_eq!(values(""), vec!["cp", "git", "grep"]);
    assert_eq!(values("g"), vec!["it", "rep"]);
    assert_eq!(candidates("git comm"), vec![("it".to_owned(), true)]);
    assert_eq!(values("git "), vec!["commit", "push"]);
    assert!(values("git x").is_empty());

    // The name is complete: only the separator is missing.
    let root = common::root();
    let completion = complete(&root, &EmptyCompleter, "git commit").unwrap();
    assert_eq!(completion.prefix(), "commit");
    assert_eq!(completion.suffixes(), vec![" "]);
}

#[test]
fn option_names() {
    assert_eq!(candidates("cp -"), vec![("force".to_owned(), false)]);
    assert_eq!(candidates("cp --f"), vec![("orce".to_owned(), true)]);
    assert!(candidates("cp -z").is_empty());
    assert_eq!(values("grep --"), vec!["regexp", "max-count"]);
}

#[test]
fn option_values() {
    let root = common::root();
    let completer = RecordingCompleter::default();

    let completion = complete(&root, &completer, "git commit -m ").unwrap();
    assert_eq!(completion.values(), vec!["value"]);
    let completion = complete(&root, &completer, "git commit -m 'fix").unwrap();
    assert_eq!(completion.delimiter(), Delimiter::SingleQuote);
    assert_eq!(completion.prefix(), "fix");
    assert_eq!(completion.suffixes(), vec!["value' "]);

    assert_eq!(
        *completer.calls.lock().unwrap(),
        vec![
            ("-m".to_owned(), "".to_owned()),
            ("-m".to_owned(), "fix".to_owned()),
        ]
    );
}

#[test]
fn argument_values() {
    let root = common::root();
    let completer = RecordingCompleter::default();

    complete(&root, &completer, "cp ").unwrap();
    complete(&root, &completer, "cp a ").unwrap();
    // An accepted line: the last word can still be extended.
    complete(&root, &completer, "cp -f a.txt b.txt").unwrap();
    complete(&root, &completer, "grep x ").unwrap();
    assert!(complete(&root, &completer, "cp a b ").unwrap().is_empty());

    assert_eq!(
        *completer.calls.lock().unwrap(),
        vec![
            ("src".to_owned(), "".to_owned()),
            ("dst".to_owned(), "".to_owned()),
            ("dst".to_owned(), "b.txt".to_owned()),
            ("files".to_owned(), "".to_owned()),
        ]
    );

    assert!(matches!(
        complete(&root, &FailingCompleter, "cp a"),
        Err(CompletionError::Completer(ref message)) if message == "boom"
    ));
}

#[test]
fn passwords_are_not_completed() {
    let root = CommandBuilder::root()
        .subordinate(
            CommandBuilder::new("login")
                .option(OptionBuilder::new(vec!["p", "password"]).value_type(ValueType::Password)),
        )
        .build()
        .unwrap();
    let completer = RecordingCompleter::default();

    assert!(complete(&root, &completer, "login -p ").unwrap().is_empty());
    assert!(complete(&root, &completer, "login -p hun").unwrap().is_empty());
    assert!(completer.calls.lock().unwrap().is_empty());
}

#[test]
fn pipes() {
    assert_eq!(values("cp a b | gr"), vec!["ep"]);
    assert_eq!(values("cp a b | grep -e x | git p"), vec!["ush"]);
    assert_eq!(values("cp a b |"), vec!["cp", "git", "grep"]);
    // Stages which do not match do not matter.
    assert_eq!(values("cp -z | gr"), vec!["ep"]);
    assert_eq!(values("cp a b c | gr"), vec!["ep"]);
    assert_eq!(values("nope | cp -z | g"), vec!["it", "rep"]);
    assert_eq!(values("grep 'a | b' | gi"), vec!["t"]);
}

#[test]
fn sub_commands_only_before_arguments() {
    let root = CommandBuilder::root()
        .subordinate(
            CommandBuilder::new("tool")
                .argument(ArgumentBuilder::new("target"))
                .subordinate(CommandBuilder::new("yank")),
        )
        .build()
        .unwrap();

    assert_eq!(
        complete(&root, &EmptyCompleter, "tool ").unwrap().values(),
        vec!["yank"]
    );
    let completion = complete(&root, &EmptyCompleter, "tool x y").unwrap();
    assert_eq!(completion.prefix(), "y");
    assert!(completion.is_empty());
    assert!(matches!(
        invoke(&root, "tool x yank"),
        Err(SyntaxError::TooManyArguments(..))
    ));
}

#[test]
fn plain_quoting() {
    let root = common::root();
    let completer = RecordingCompleter::default();
    let matcher = CompletionMatcher::new(&root, &completer).quoting(Quoting::Plain);

    let completion = matcher.complete("cp 'it's").unwrap();
    assert_eq!(completion.delimiter(), Delimiter::Plain);
    assert_eq!(completion.prefix(), "'it's");
    assert_eq!(completion.suffixes(), vec!["value "]);
    assert_eq!(matcher.complete("cp a\\ b | gr").unwrap().values(), vec!["ep"]);
    assert_eq!(matcher.complete("cp a\\ ").unwrap().delimiter(), Delimiter::Plain);

    assert_eq!(
        *completer.calls.lock().unwrap(),
        vec![
            ("src".to_owned(), "'it's".to_owned()),
            ("dst".to_owned(), "".to_owned()),
        ]
    );
}

#[test]
fn paths() {
    let tmp = tempfile::tempdir().unwrap();
    File::create(tmp.path().join("my file.txt")).unwrap();
    File::create(tmp.path().join("my big file")).unwrap();

    let root = common::root();
    let completer = PathCompleter::with_base(tmp.path());

    let completion = complete(&root, &completer, "cp 'my f").unwrap();
    assert_eq!(completion.suffixes(), vec!["ile.txt' "]);

    let completion = complete(&root, &completer, "cp my\\ b").unwrap();
    assert_eq!(completion.prefix(), "my b");
    assert_eq!(completion.suffixes(), vec!["ig\\ file "]);

    let completion = complete(&root, &completer, "cp \"my").unwrap();
    assert_eq!(completion.values(), vec![" big file", " file.txt"]);
}
