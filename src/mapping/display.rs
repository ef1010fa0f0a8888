//! Human-readable rendering of input codes
//!
//! Formatting is total: anything not recognized is returned as given.

use super::control_id::Direction;
use super::translator::{RAW_PREFIX, STANDARD_PREFIX};

fn split_player(rest: &str) -> Option<(&str, &str)> {
    let (player, input) = rest.split_once('_')?;
    if player.is_empty() || !player.bytes().all(|b| b.is_ascii_digit()) || input.is_empty() {
        return None;
    }
    Some((player, input))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn standard_label(name: &str) -> Option<&'static str> {
    let label = match name {
        "A" => "A Button",
        "B" => "B Button",
        "X" => "X Button",
        "Y" => "Y Button",
        "SHOULDER_L" => "LB",
        "SHOULDER_R" => "RB",
        "TRIGGER_L" => "LT",
        "TRIGGER_R" => "RT",
        "SELECT" => "Back",
        "START" => "Start",
        "THUMB_L" => "Left Stick Button",
        "THUMB_R" => "Right Stick Button",
        "DPAD_UP" => "D-Pad Up",
        "DPAD_DOWN" => "D-Pad Down",
        "DPAD_LEFT" => "D-Pad Left",
        "DPAD_RIGHT" => "D-Pad Right",
        _ => return None,
    };
    Some(label)
}

fn axis(input: &str) -> &str {
    input.strip_suffix("_SWITCH").unwrap_or(input)
}

fn right_stick(input: &str) -> Option<Direction> {
    match axis(input) {
        "RXAXIS_NEG" => Some(Direction::Left),
        "RXAXIS_POS" => Some(Direction::Right),
        "RYAXIS_NEG" => Some(Direction::Up),
        "RYAXIS_POS" => Some(Direction::Down),
        _ => None,
    }
}

fn left_stick(input: &str) -> Option<Direction> {
    match axis(input) {
        "XAXIS_LEFT" => Some(Direction::Left),
        "XAXIS_RIGHT" => Some(Direction::Right),
        "YAXIS_UP" => Some(Direction::Up),
        "YAXIS_DOWN" => Some(Direction::Down),
        _ => None,
    }
}

fn hat(input: &str) -> Option<(&str, Direction)> {
    let rest = input.strip_prefix("HAT")?;
    let split = rest.find(|c: char| !c.is_ascii_digit())?;
    let (number, direction) = rest.split_at(split);
    if number.is_empty() {
        return None;
    }
    let direction = match direction {
        "UP" => Direction::Up,
        "DOWN" => Direction::Down,
        "LEFT" => Direction::Left,
        "RIGHT" => Direction::Right,
        _ => return None,
    };
    Some((number, direction))
}

fn format_joycode(player: &str, input: &str) -> Option<String> {
    if let Some(direction) = right_stick(input) {
        return Some(format!("Joy {player} Right Stick {}", direction.label()));
    }
    if let Some(direction) = left_stick(input) {
        return Some(format!("Joy {player} Left Stick {}", direction.label()));
    }
    if let Some((number, direction)) = hat(input) {
        return Some(if number == "1" {
            format!("Joy {player} D-Pad {}", direction.label())
        } else {
            format!("Joy {player} Hat {number} {}", direction.label())
        });
    }
    if let Some(number) = input.strip_prefix("BUTTON") {
        if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) {
            return Some(format!("Input {player} Button {number}"));
        }
    }
    let (kind, remainder) = input.split_once('_')?;
    if kind.is_empty() || remainder.is_empty() {
        return None;
    }
    Some(format!("Input {player} {} {remainder}", capitalize(kind)))
}

/// Formats a single input code for display
pub fn format_for_display(mapping: &str) -> String {
    let formatted = if let Some(rest) = mapping
        .strip_prefix(STANDARD_PREFIX)
        .and_then(|r| r.strip_prefix('_'))
    {
        split_player(rest).and_then(|(player, name)| {
            standard_label(name).map(|label| format!("P{player} {label}"))
        })
    } else if let Some(rest) = mapping
        .strip_prefix(RAW_PREFIX)
        .and_then(|r| r.strip_prefix('_'))
    {
        split_player(rest).and_then(|(player, input)| format_joycode(player, input))
    } else {
        mapping
            .strip_prefix("KEYCODE_")
            .filter(|key| !key.is_empty())
            .map(|key| format!("Key {key}"))
    };

    formatted.unwrap_or_else(|| mapping.to_string())
}

/// Formats each token of a compound sequence, lowering the MAME operators
pub fn format_sequence(sequence: &str) -> String {
    sequence
        .split_whitespace()
        .map(|token| match token {
            "OR" => "or".to_string(),
            "NOT" => "not".to_string(),
            other => format_for_display(other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
