//! Typed view of MAME control ids (`P1_BUTTON3`, `P2_JOYSTICKLEFT_UP`, ...)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cardinal direction of a stick or hat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "UP" => Some(Direction::Up),
            "DOWN" => Some(Direction::Down),
            "LEFT" => Some(Direction::Left),
            "RIGHT" => Some(Direction::Right),
            _ => None,
        }
    }

    fn token(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

/// Which stick a joystick control belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stick {
    /// Plain `P<n>_JOYSTICK_<DIR>`
    Single,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    Button(u8),
    Joystick { stick: Stick, direction: Direction },
}

/// A recognized button or joystick control scoped to a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlId {
    pub player: u8,
    pub kind: ControlKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Not a button or joystick control id: {0}")]
pub struct UnrecognizedControl(pub String);

impl ControlId {
    pub fn button(player: u8, number: u8) -> Self {
        Self {
            player,
            kind: ControlKind::Button(number),
        }
    }

    pub fn joystick(player: u8, stick: Stick, direction: Direction) -> Self {
        Self {
            player,
            kind: ControlKind::Joystick { stick, direction },
        }
    }

    /// True if `raw` names a player button or joystick direction
    pub fn is_recognized(raw: &str) -> bool {
        raw.parse::<ControlId>().is_ok()
    }

    /// Generic label used when the game data gives no explicit name
    pub fn generic_label(&self) -> String {
        match self.kind {
            ControlKind::Button(n) => format!("P{} Button {}", self.player, n),
            ControlKind::Joystick { stick, direction } => {
                let stick_name = match stick {
                    Stick::Single => "Joystick",
                    Stick::Left => "Left Stick",
                    Stick::Right => "Right Stick",
                };
                format!("P{} {} {}", self.player, stick_name, direction.label())
            }
        }
    }
}

/// Generic label for a raw id, if it is a well-known pattern
pub fn generic_label(raw: &str) -> Option<String> {
    raw.parse::<ControlId>().ok().map(|id| id.generic_label())
}

fn parse_number(digits: &str) -> Option<u8> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || digits.starts_with('0')
    {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for ControlId {
    type Err = UnrecognizedControl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = || UnrecognizedControl(s.to_string());

        let rest = s.strip_prefix('P').ok_or_else(fail)?;
        let (player, rest) = rest.split_once('_').ok_or_else(fail)?;
        let player = parse_number(player).ok_or_else(fail)?;

        if let Some(number) = rest.strip_prefix("BUTTON") {
            let number = parse_number(number).ok_or_else(fail)?;
            return Ok(ControlId::button(player, number));
        }

        let (stick, direction) = if let Some(dir) = rest.strip_prefix("JOYSTICKLEFT_") {
            (Stick::Left, dir)
        } else if let Some(dir) = rest.strip_prefix("JOYSTICKRIGHT_") {
            (Stick::Right, dir)
        } else if let Some(dir) = rest.strip_prefix("JOYSTICK_") {
            (Stick::Single, dir)
        } else {
            return Err(fail());
        };

        let direction = Direction::parse(direction).ok_or_else(fail)?;
        Ok(ControlId::joystick(player, stick, direction))
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ControlKind::Button(n) => write!(f, "P{}_BUTTON{}", self.player, n),
            ControlKind::Joystick { stick, direction } => {
                let stick = match stick {
                    Stick::Single => "JOYSTICK",
                    Stick::Left => "JOYSTICKLEFT",
                    Stick::Right => "JOYSTICKRIGHT",
                };
                write!(f, "P{}_{}_{}", self.player, stick, direction.token())
            }
        }
    }
}
