//! Control lookup for MAME front-ends.
//!
//! Given a ROM name, works out which controls the game uses, what each one
//! does and what physical input it is currently bound to, taking the
//! parent/clone structure of the game data and MAME's own `.cfg` files into
//! account.

pub mod config;
pub mod controls;
pub mod gamedata;
pub mod mamecfg;
pub mod mapping;
