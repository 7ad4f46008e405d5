use std::io::Write;

use cmdgram::*;
use pretty_assertions::assert_eq;

const TOOLS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/tools.manifest");

fn tools() -> CommandDescriptor {
    manifest::load_file(TOOLS, &TypeRegistry::new()).unwrap()
}

fn names(command: &CommandDescriptor) -> Vec<String> {
    command
        .options()
        .iter()
        .map(OptionDescriptor::display_name)
        .chain(command.arguments().iter().map(|a| a.name().to_owned()))
        .collect()
}

#[test]
fn commands() {
    let root = tools();
    let top: Vec<&str> = root.subordinates().iter().map(|s| s.name()).collect();
    assert_eq!(top, vec!["git", "cp", "login"]);

    let commit = root.find(&["git", "commit"]).unwrap();
    assert_eq!(names(commit), vec!["-v", "-C", "-m", "-a", "paths"]);
    assert_eq!(
        commit.usage(&["git"]),
        "git commit [-v | --verbose] [-C | --config] [-m | --message] [-a | --all] [paths...]"
    );

    let push = root.find(&["git", "push"]).unwrap();
    assert_eq!(names(push), vec!["-v", "-C", "-f", "remote", "branch"]);
    assert_eq!(push.argument("remote").unwrap().description(), "remote name");
    assert!(push.option("force").unwrap().value_type().is_boolean());
}

#[test]
fn invoke_loaded_commands() {
    let root = tools();
    let m = invoke(&root, "git commit -v -m 'first commit' a.rs b.rs").unwrap();
    let commit = m.leaf();
    assert_eq!(m.path(), vec!["git", "commit"]);
    assert!(commit.flag("verbose"));
    assert_eq!(commit.option_value("message").and_then(Value::as_str), Some("first commit"));
    assert_eq!(commit.argument("paths").unwrap().literals().len(), 2);

    let m = invoke(&root, "git log --format oneline -n 5").unwrap();
    assert_eq!(m.leaf().option_value("format"), Some(&Value::Enum("oneline".to_owned())));
    assert_eq!(m.leaf().option_value("n"), Some(&Value::Integer(5)));
    assert!(invoke(&root, "git log --format long").is_err());

    let m = invoke(&root, "login -u me -p hunter2").unwrap();
    let password = m.leaf().option_value("password").unwrap();
    assert_eq!(password.as_str(), Some("hunter2"));
    assert_eq!(password.to_string(), "********");
}

#[test]
fn complete_loaded_commands() {
    let root = tools();
    let completion = complete(&root, &ValueTypeCompleter, "git log --format ").unwrap();
    assert_eq!(completion.values(), vec!["short", "full", "oneline"]);
    let completion = complete(&root, &ValueTypeCompleter, "git log --format o").unwrap();
    assert_eq!(completion.suffixes(), vec!["neline "]);
    assert!(complete(&root, &ValueTypeCompleter, "login -p ").unwrap().is_empty());
}

#[test]
fn files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "command ls {{ option l; argument dir; }}").unwrap();
    let root = manifest::load_file(file.path(), &TypeRegistry::new()).unwrap();
    assert_eq!(root.usage(&[]), "<command>");
    assert_eq!(root.find(&["ls"]).unwrap().usage(&[]), "ls [-l] [dir]");

    assert!(matches!(
        manifest::load_file("/nonexistent/tools.manifest", &TypeRegistry::new()),
        Err(ManifestError::Io { .. })
    ));
}

#[test]
fn parameter_blocks() {
    let registry = TypeRegistry::new();
    let root = manifest::load(
        r#"
        params a { option x; }
        params b { option y; argument first; }
        command c { use a; use b; option z; argument second; }
        "#,
        &registry,
    )
    .unwrap();
    assert_eq!(
        names(root.subordinate("c").unwrap()),
        vec!["-x", "-y", "-z", "first", "second"]
    );

    // Blocks must be declared before they are used.
    assert!(matches!(
        manifest::load("command c { use a; } params a { option x; }", &registry),
        Err(ManifestError::UnknownParams(ref name)) if name == "a"
    ));
    assert!(matches!(
        manifest::load("params a { option x; } params a { option y; }", &registry),
        Err(ManifestError::DuplicatedParams(_))
    ));
    assert!(matches!(
        manifest::load("params a { option f; } command c { use a; option f,force; }", &registry),
        Err(ManifestError::Descriptor(DescriptorError::DuplicatedOption(ref name))) if name == "-f"
    ));
}

#[derive(Debug)]
struct Color;

impl ValueConverter for Color {
    fn name(&self) -> &str {
        "color"
    }

    fn parse(&self, literal: &str) -> Result<Value, ConversionError> {
        match literal {
            "red" | "green" | "blue" => Ok(Value::String(literal.to_owned())),
            _ => Err(ConversionError::Custom(format!("`{}' is not a color", literal))),
        }
    }

    fn candidates(&self, prefix: &str) -> Vec<String> {
        ["red", "green", "blue"]
            .iter()
            .filter(|c| c.starts_with(prefix))
            .map(|c| (*c).to_owned())
            .collect()
    }
}

#[test]
fn custom_types() {
    let mut registry = TypeRegistry::new();
    registry.register(Color);
    let root = manifest::load("command paint { argument color: color; }", &registry).unwrap();

    let m = invoke(&root, "paint red").unwrap();
    assert_eq!(m.leaf().argument_value("color"), Some(&Value::String("red".to_owned())));
    assert!(invoke(&root, "paint pink").is_err());

    let completion = complete(&root, &ValueTypeCompleter, "paint g").unwrap();
    assert_eq!(completion.values(), vec!["reen"]);
}
