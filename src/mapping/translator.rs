//! Conversion between MAME's raw joystick codes and XInput names
//!
//! The raw scheme is `JOYCODE_<player>_<input>` and the standardized scheme is
//! `XINPUT_<player>_<name>`. Only the fixed table below is translated; every
//! other string passes through unchanged, so the conversion never fails.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Players covered by the lookup table
pub const TABLE_PLAYERS: u8 = 2;

pub const RAW_PREFIX: &str = "JOYCODE";
pub const STANDARD_PREFIX: &str = "XINPUT";

/// Per-player pairs of (raw input, standardized name)
const INPUT_PAIRS: [(&str, &str); 14] = [
    ("BUTTON1", "A"),
    ("BUTTON2", "B"),
    ("BUTTON3", "X"),
    ("BUTTON4", "Y"),
    ("BUTTON5", "SHOULDER_L"),
    ("BUTTON6", "SHOULDER_R"),
    ("BUTTON7", "SELECT"),
    ("BUTTON8", "START"),
    ("BUTTON9", "THUMB_L"),
    ("BUTTON10", "THUMB_R"),
    ("HAT1UP", "DPAD_UP"),
    ("HAT1DOWN", "DPAD_DOWN"),
    ("HAT1LEFT", "DPAD_LEFT"),
    ("HAT1RIGHT", "DPAD_RIGHT"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Translation {
    /// `JOYCODE_*` → `XINPUT_*`
    ToStandard,
    /// `XINPUT_*` → `JOYCODE_*`
    ToRaw,
}

struct Tables {
    to_standard: HashMap<String, String>,
    to_raw: HashMap<String, String>,
}

static TABLES: LazyLock<Tables> = LazyLock::new(|| {
    let mut to_standard = HashMap::new();
    let mut to_raw = HashMap::new();
    for player in 1..=TABLE_PLAYERS {
        for (raw, standard) in INPUT_PAIRS {
            let raw = format!("{RAW_PREFIX}_{player}_{raw}");
            let standard = format!("{STANDARD_PREFIX}_{player}_{standard}");
            to_standard.insert(raw.clone(), standard.clone());
            to_raw.insert(standard, raw);
        }
    }
    Tables {
        to_standard,
        to_raw,
    }
});

/// Translates a single code, returning it unchanged when it is not in the table
pub fn translate(mapping: &str, translation: Translation) -> String {
    let table = match translation {
        Translation::ToStandard => &TABLES.to_standard,
        Translation::ToRaw => &TABLES.to_raw,
    };
    table
        .get(mapping)
        .cloned()
        .unwrap_or_else(|| mapping.to_string())
}

/// Translates every token of a compound MAME input sequence
///
/// Operators such as `OR` and `NOT` are not table keys and pass through, so a
/// single-token sequence behaves exactly like [`translate`]. Whitespace
/// between tokens is kept as is.
pub fn translate_sequence(sequence: &str, translation: Translation) -> String {
    let mut translated = String::with_capacity(sequence.len());
    for piece in sequence.split_inclusive(char::is_whitespace) {
        let token = piece.trim_end_matches(char::is_whitespace);
        translated.push_str(&translate(token, translation));
        translated.push_str(&piece[token.len()..]);
    }
    translated
}

/// All raw → standardized pairs, ordered by player and then by input
pub fn table() -> Vec<(String, String)> {
    (1..=TABLE_PLAYERS)
        .flat_map(|player| {
            INPUT_PAIRS.iter().map(move |(raw, standard)| {
                (
                    format!("{RAW_PREFIX}_{player}_{raw}"),
                    format!("{STANDARD_PREFIX}_{player}_{standard}"),
                )
            })
        })
        .collect()
}

pub fn is_table_key(mapping: &str) -> bool {
    TABLES.to_standard.contains_key(mapping) || TABLES.to_raw.contains_key(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn table_covers_two_players_and_fourteen_inputs() {
        let pairs = table();
        assert_eq!(pairs.len(), 28);
        assert_eq!(
            pairs[0],
            ("JOYCODE_1_BUTTON1".to_string(), "XINPUT_1_A".to_string())
        );
        assert_eq!(
            pairs[27],
            (
                "JOYCODE_2_HAT1RIGHT".to_string(),
                "XINPUT_2_DPAD_RIGHT".to_string()
            )
        );
    }

    #[test]
    fn translates_known_codes() {
        assert_eq!(
            translate("JOYCODE_1_BUTTON1", Translation::ToStandard),
            "XINPUT_1_A"
        );
        assert_eq!(
            translate("JOYCODE_2_BUTTON10", Translation::ToStandard),
            "XINPUT_2_THUMB_R"
        );
        assert_eq!(
            translate("XINPUT_1_DPAD_LEFT", Translation::ToRaw),
            "JOYCODE_1_HAT1LEFT"
        );
    }

    #[test]
    fn direction_matters() {
        // A raw code is not a key of the reverse table
        assert_eq!(
            translate("JOYCODE_1_BUTTON1", Translation::ToRaw),
            "JOYCODE_1_BUTTON1"
        );
        assert_eq!(
            translate("XINPUT_1_A", Translation::ToStandard),
            "XINPUT_1_A"
        );
    }

    #[test]
    fn near_misses_pass_through() {
        for code in [
            "JOYCODE_3_BUTTON1",
            "JOYCODE_01_BUTTON1",
            "JOYCODE_1_BUTTON11",
            "joycode_1_button1",
            "KEYCODE_LCONTROL",
            "",
        ] {
            assert_eq!(translate(code, Translation::ToStandard), code);
        }
    }

    #[test]
    fn sequences_translate_per_token() {
        assert_eq!(
            translate_sequence("JOYCODE_1_BUTTON2 OR KEYCODE_LALT", Translation::ToStandard),
            "XINPUT_1_B OR KEYCODE_LALT"
        );
        assert_eq!(
            translate_sequence("JOYCODE_2_HAT1UP", Translation::ToStandard),
            "XINPUT_2_DPAD_UP"
        );
    }

    #[test]
    fn sequence_spacing_is_preserved() {
        assert_eq!(
            translate_sequence(
                " JOYCODE_1_BUTTON1  OR\tJOYCODE_2_BUTTON2 ",
                Translation::ToStandard
            ),
            " XINPUT_1_A  OR\tXINPUT_2_B "
        );
        assert_eq!(translate_sequence("", Translation::ToRaw), "");
    }

    #[test]
    fn every_table_key_round_trips() {
        for (raw, _) in table() {
            let standard = translate(&raw, Translation::ToStandard);
            assert_eq!(translate(&standard, Translation::ToRaw), raw);
        }
    }

    proptest! {
        #[test]
        fn unknown_strings_pass_through(s in "\\PC*") {
            prop_assume!(!is_table_key(&s));
            prop_assert_eq!(translate(&s, Translation::ToStandard), s.clone());
            prop_assert_eq!(translate(&s, Translation::ToRaw), s);
        }

        #[test]
        fn round_trip_over_table(index in 0usize..28) {
            let (raw, standard) = table()[index].clone();
            let translated = translate(&raw, Translation::ToStandard);
            prop_assert_eq!(&translated, &standard);
            prop_assert_eq!(translate(&translated, Translation::ToRaw), raw);
        }

        #[test]
        fn sequence_round_trip_keeps_separators(
            parts in proptest::collection::vec((0usize..28, "[ \t]{1,3}"), 1..5),
        ) {
            let pairs = table();
            let raw: String = parts
                .iter()
                .map(|(index, gap)| format!("{}{gap}OR{gap}", pairs[*index].0))
                .collect();
            let standard = translate_sequence(&raw, Translation::ToStandard);
            prop_assert_eq!(translate_sequence(&standard, Translation::ToRaw), raw);
        }
    }
}
