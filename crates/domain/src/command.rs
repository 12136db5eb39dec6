//! Commands and the command-name → topic mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A command as configured on a schedule: a vendor command name plus
/// optional parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<CommandParameter>,
}

impl Command {
    /// Create a parameterless command.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// The first numeric parameter, if any.
    #[must_use]
    pub fn first_number(&self) -> Option<i64> {
        self.parameters.iter().find_map(CommandParameter::as_number)
    }
}

/// A primitive command parameter — the gateway accepts strings and numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandParameter {
    Number(i64),
    Text(String),
}

impl CommandParameter {
    /// The numeric value, if this parameter is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

/// The seven command topics carried on the event bus.
///
/// Producers publish on a topic; the dispatcher subscribes to all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Up,
    Down,
    Stop,
    My,
    Wink,
    Identify,
    SetDeployment,
}

impl Topic {
    /// All topics, in the order the dispatcher subscribes to them.
    pub const ALL: [Self; 7] = [
        Self::Up,
        Self::Down,
        Self::Stop,
        Self::My,
        Self::Wink,
        Self::Identify,
        Self::SetDeployment,
    ];

    /// Map a configured command name onto its topic.
    ///
    /// Unmapped names yield `None`; callers treat that as configuration
    /// drift and publish nothing.
    #[must_use]
    pub fn from_command_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "stop" => Some(Self::Stop),
            "my" => Some(Self::My),
            "wink" => Some(Self::Wink),
            "identify" => Some(Self::Identify),
            "setDeployment" => Some(Self::SetDeployment),
            _ => None,
        }
    }

    /// The vendor command name sent to the gateway for this topic.
    #[must_use]
    pub fn command_name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stop => "stop",
            Self::My => "my",
            Self::Wink => "wink",
            Self::Identify => "identify",
            Self::SetDeployment => "setDeployment",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shutter:{}", self.command_name())
    }
}
