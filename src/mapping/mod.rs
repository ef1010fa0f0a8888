//! Input naming: control ids, raw ↔ XInput translation and display formatting.
//!
//! MAME names a physical binding with a raw joystick code (`JOYCODE_1_BUTTON1`)
//! while most pads are better described in XInput terms (`XINPUT_1_A`). This
//! module is stateless; everything here is a pure function over strings.

pub mod control_id;
pub mod display;
pub mod translator;

pub use control_id::{generic_label, ControlId, ControlKind, Direction, Stick};
pub use display::{format_for_display, format_sequence};
pub use translator::{translate, translate_sequence, Translation};
