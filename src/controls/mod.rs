//! Control listings for the preview: what each input does and what it is bound to.
//!
//! [`comparator`] is the pure merge of game defaults with cfg overrides and
//! global defaults. [`engine`] wraps it with the loading of those inputs from
//! a MAME directory.

pub mod comparator;
pub mod engine;

pub use comparator::{compare, ControlRow, NOT_MAPPED};
pub use engine::{
    game_controls_from, Configured, ControlEngine, EngineError, EngineSettings, GameControls,
    Ready, ResolvedGame,
};
