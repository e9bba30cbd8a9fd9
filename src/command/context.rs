//! Invocation context handed to command handlers.

use crate::command::registry::CommandRegistry;
use crate::environment::Environment;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::path::Path;

/// Value of a parsed flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Bool(bool),
    Str(String),
}

/// Flags and positionals parsed from the raw argument sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFlags {
    positional: Vec<String>,
    flags: BTreeMap<String, FlagValue>,
}

impl ParsedFlags {
    /// Parse `--key=value`, `--key value`, `--flag`, `--no-flag`, `-abc` and `-k value`.
    /// Everything after `--` is positional. Later occurrences of a flag win.
    pub fn parse(args: &[String]) -> Self {
        let mut parsed = ParsedFlags::default();
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            if arg == "--" {
                parsed.positional.extend(args[i + 1..].iter().cloned());
                break;
            }

            if let Some(long) = arg.strip_prefix("--") {
                if let Some((key, value)) = long.split_once('=') {
                    parsed.set(key, FlagValue::Str(value.to_string()));
                } else if let Some(key) = long.strip_prefix("no-") {
                    parsed.set(key, FlagValue::Bool(false));
                } else if let Some(next) = value_at(args, i + 1) {
                    parsed.set(long, FlagValue::Str(next.to_string()));
                    i += 1;
                } else {
                    parsed.set(long, FlagValue::Bool(true));
                }
            } else if is_short_group(arg) {
                let letters: Vec<char> = arg[1..].chars().collect();
                if let Some((last, rest)) = letters.split_last() {
                    for letter in rest {
                        parsed.set(&letter.to_string(), FlagValue::Bool(true));
                    }
                    if let Some(next) = value_at(args, i + 1) {
                        parsed.set(&last.to_string(), FlagValue::Str(next.to_string()));
                        i += 1;
                    } else {
                        parsed.set(&last.to_string(), FlagValue::Bool(true));
                    }
                }
            } else {
                parsed.positional.push(arg.clone());
            }
            i += 1;
        }
        parsed
    }

    fn set(&mut self, key: &str, value: FlagValue) {
        self.flags.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    /// True when the flag was given without being negated.
    pub fn is_set(&self, key: &str) -> bool {
        matches!(
            self.flags.get(key),
            Some(FlagValue::Bool(true)) | Some(FlagValue::Str(_))
        )
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        match self.flags.get(key) {
            Some(FlagValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }
}

fn looks_like_flag(arg: &str) -> bool {
    arg.starts_with("--") || is_short_group(arg)
}

/// `-abc` but not `-`, `-1` or `--x`.
fn is_short_group(arg: &str) -> bool {
    let mut chars = arg.chars();
    chars.next() == Some('-')
        && chars
            .next()
            .map(|c| c != '-' && !c.is_ascii_digit())
            .unwrap_or(false)
}

fn value_at(args: &[String], index: usize) -> Option<&str> {
    args.get(index)
        .map(String::as_str)
        .filter(|next| *next != "--" && !looks_like_flag(next))
}

/// Everything a handler may need about the current invocation.
///
/// Flags are parsed on first request only.
pub struct InvocationContext<'r> {
    registry: &'r CommandRegistry,
    command: Option<String>,
    args: Vec<String>,
    flags: OnceCell<ParsedFlags>,
}

impl<'r> InvocationContext<'r> {
    pub fn new(registry: &'r CommandRegistry, command: Option<String>, args: Vec<String>) -> Self {
        Self {
            registry,
            command,
            args,
            flags: OnceCell::new(),
        }
    }

    /// Split a raw argument vector (program name already removed) into command token and args.
    pub fn from_argv(registry: &'r CommandRegistry, argv: Vec<String>) -> Self {
        let mut iter = argv.into_iter();
        let command = iter.next().filter(|token| !token.is_empty());
        Self::new(registry, command, iter.collect())
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Arguments after the command token.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn flags(&self) -> &ParsedFlags {
        self.flags.get_or_init(|| ParsedFlags::parse(&self.args))
    }

    pub fn flags_parsed(&self) -> bool {
        self.flags.get().is_some()
    }

    pub fn registry(&self) -> &'r CommandRegistry {
        self.registry
    }

    pub fn environment(&self) -> &'r Environment {
        self.registry.environment()
    }

    pub fn workspace_root(&self) -> &'r Path {
        self.registry.layout().workspace_root()
    }
}
