mod common;

use cmdgram::parser::*;
use pretty_assertions::assert_eq;

fn events(line: &str, mode: Mode) -> Vec<String> {
    let root = common::root();
    parse(&root, line, mode)
        .map(|event| match event {
            Event::Separator { .. } => "_".to_owned(),
            Event::Option {
                descriptor, values, ..
            } => {
                let values: Vec<&str> = values.iter().map(|v| v.value.as_str()).collect();
                format!("{}{:?}", descriptor.display_name(), values)
            }
            Event::Argument {
                descriptor, values, ..
            } => {
                let values: Vec<&str> = values.iter().map(|v| v.value.as_str()).collect();
                format!("{}{:?}", descriptor.name(), values)
            }
            Event::Subordinate { descriptor, .. } => format!("<{}>", descriptor.name()),
            Event::Stop(stop) => match stop.reason {
                StopReason::Done => format!("done@{}", stop.offset),
                StopReason::Unresolved(unresolved) => {
                    format!("{}@{}", kind(&unresolved), stop.offset)
                }
            },
        })
        .collect()
}

fn kind(unresolved: &Unresolved<'_>) -> String {
    match unresolved {
        Unresolved::NoSuchOption { token } => format!("no such option {}", token.raw),
        Unresolved::TooManyArguments { token } => format!("too many arguments {}", token.raw),
        Unresolved::MissingValue { option, .. } => format!("missing value {}", option.display_name()),
        Unresolved::MissingOption { option } => format!("missing option {}", option.display_name()),
        Unresolved::MissingArgument { argument } => format!("missing argument {}", argument.name()),
    }
}

#[test]
fn nested_commands() {
    assert_eq!(
        events("git commit -m fix", Mode::Invoke),
        vec!["<git>", "_", "<commit>", "_", "-m[]", "_", "-m[\"fix\"]", "done@17"]
    );
    assert_eq!(
        events("git push origin main", Mode::Invoke),
        vec!["<git>", "_", "<push>", "_", "remote[\"origin\"]", "_", "branch[\"main\"]", "done@20"]
    );
}

#[test]
fn required_options() {
    assert_eq!(
        events("git commit", Mode::Invoke),
        vec!["<git>", "_", "<commit>", "missing option -m@10"]
    );
    assert_eq!(
        events("git commit", Mode::Complete),
        vec!["<git>", "_", "<commit>", "done@10"]
    );
    assert_eq!(
        events("git commit --message", Mode::Invoke),
        vec!["<git>", "_", "<commit>", "_", "-m[]", "missing value -m@20"]
    );
}

#[test]
fn dashes_are_options() {
    assert_eq!(
        events("cp -", Mode::Invoke),
        vec!["<cp>", "_", "no such option -@3"]
    );
    assert_eq!(
        events("cp -- a", Mode::Invoke),
        vec!["<cp>", "_", "no such option --@3"]
    );
    // Quoted, the same text is a word.
    assert_eq!(
        events("cp '-f' b", Mode::Invoke),
        vec!["<cp>", "_", "src[\"-f\"]", "_", "dst[\"b\"]", "done@9"]
    );
}

#[test]
fn words_after_arguments_are_not_commands() {
    assert_eq!(
        events("git push commit", Mode::Invoke),
        vec!["<git>", "_", "<push>", "_", "remote[\"commit\"]", "done@15"]
    );
    assert_eq!(
        events("git pull", Mode::Invoke),
        vec!["<git>", "_", "too many arguments pull@4"]
    );
}

#[test]
fn multi_values() {
    assert_eq!(
        events("grep -e a -e b x y", Mode::Invoke),
        vec![
            "<grep>", "_", "-e[]", "_", "-e[\"a\"]", "_", "-e[]", "_", "-e[\"b\"]", "_",
            "files[\"x\"]", "_", "files[\"x\", \"y\"]", "done@18"
        ]
    );
}

#[test]
fn pipes_stop_the_parse() {
    let root = common::root();
    let mut parser = parse(&root, "cp a b | grep -e x", Mode::Invoke);
    let stop = parser.by_ref().last();
    match stop {
        Some(Event::Stop(stop)) => {
            assert!(stop.is_done());
            assert_eq!(stop.offset, 7);
            assert_eq!(stop.command.name(), "cp");
        }
        event => panic!("unexpected event: {:?}", event),
    }
    assert_eq!(parser.rest(), "| grep -e x");
}

#[test]
fn accepted_lines_are_done_while_completing() {
    let root = common::root();
    for line in &[
        "cp -f a.txt b.txt",
        "git commit -m 'fix it' --all",
        "git push origin main",
        "grep -e x -n 3 a b c",
    ] {
        assert!(cmdgram::invoke(&root, line).is_ok(), "line: {}", line);
        match parse(&root, line, Mode::Complete).last() {
            Some(Event::Stop(stop)) => assert!(stop.is_done(), "line: {}", line),
            event => panic!("unexpected event: {:?}", event),
        }
    }
}
