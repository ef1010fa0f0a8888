//! # Game Data
//!
//! Static knowledge about arcade titles: which controls a game uses and what
//! each one does. The data comes from a single JSON document (usually
//! `preview/gamedata.json` inside the MAME directory).
//!
//! ## Pipeline
//!
//! ```text
//! JSON ──► schema::migrate ──► GameDatabase::build ──► DatabaseStore
//!                                     │
//!                                     └──► resolver::resolve(rom) ──► Controls
//! ```
//!
//! - [`schema`] rewrites legacy documents to the current field names once.
//! - [`database`] flattens the parent/clone tree into id indexes. Entries with
//!   the wrong shape are skipped and counted instead of failing the load.
//! - [`resolver`] finds the controls that apply to a ROM, walking up to its
//!   parent when a clone defines none of its own.
//! - [`store`] holds the current snapshot and swaps in rebuilt ones.

pub mod database;
pub mod error;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod types;

pub use database::{BuildReport, GameDatabase};
pub use error::{GameDataError, ResolveError};
pub use resolver::{resolve, ResolvePolicy, ResolvedControls};
pub use store::DatabaseStore;
pub use types::{ControlDef, Controls, GameEntry};
