use std::{fmt::Display, ops::Deref, path::PathBuf};

/// A configuration value together with the place it was read from.
///
/// Used by [`crate::config::Config`] so error messages and `--show-config` style
/// output can say where a value came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedProperty<T> {
    /// Value passed on the command line or set explicitly by the caller.
    Cli(T),
    /// Value read from an environment variable (value, variable name).
    Env(T, &'static str),
    /// Value read from the TOML configuration file (value, file path).
    File(T, PathBuf),
    /// Built-in default.
    Default(T),
}

impl<T> ParsedProperty<T> {
    /// Get the parsed value
    pub fn value(&self) -> &T {
        match self {
            ParsedProperty::Cli(value)
            | ParsedProperty::Env(value, _)
            | ParsedProperty::File(value, _)
            | ParsedProperty::Default(value) => value,
        }
    }

    /// Consume the property and return the bare value.
    pub fn into_value(self) -> T {
        match self {
            ParsedProperty::Cli(value)
            | ParsedProperty::Env(value, _)
            | ParsedProperty::File(value, _)
            | ParsedProperty::Default(value) => value,
        }
    }

    /// Human readable description of the source.
    pub fn source(&self) -> String {
        match self {
            ParsedProperty::Cli(_) => "cli".to_string(),
            ParsedProperty::Env(_, var) => format!("env ({var})"),
            ParsedProperty::File(_, path) => format!("file ({})", path.display()),
            ParsedProperty::Default(_) => "default".to_string(),
        }
    }

    /// Apply `f` to the value, keeping the source.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParsedProperty<U> {
        match self {
            ParsedProperty::Cli(value) => ParsedProperty::Cli(f(value)),
            ParsedProperty::Env(value, var) => ParsedProperty::Env(f(value), var),
            ParsedProperty::File(value, path) => ParsedProperty::File(f(value), path),
            ParsedProperty::Default(value) => ParsedProperty::Default(f(value)),
        }
    }
}

impl<T> Deref for ParsedProperty<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.value()
    }
}

impl<T: Display> Display for ParsedProperty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value().fmt(f)
    }
}

impl<T> From<T> for ParsedProperty<T> {
    fn from(value: T) -> Self {
        ParsedProperty::Default(value)
    }
}
