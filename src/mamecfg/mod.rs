//! Readers for MAME's XML `.cfg` files.
//!
//! Both documents share one dialect:
//!
//! ```text
//! <mameconfig version="10">
//!   <system name="...">
//!     <input>
//!       <port type="P1_BUTTON1"><newseq type="standard">JOYCODE_1_BUTTON1</newseq></port>
//!     </input>
//!   </system>
//! </mameconfig>
//! ```
//!
//! The format belongs to MAME, so parsing follows it exactly and ignores every
//! element it does not need.

pub mod defaults;
pub mod error;
pub mod overrides;

pub use defaults::{load_default_mappings, parse_default_mappings, DefaultMappings};
pub use error::CfgError;
pub use overrides::{
    load_custom_overrides, parse_custom_overrides, CustomMapping, CustomOverrides,
};

use std::path::Path;

pub const DEFAULT_CFG_FILE: &str = "default.cfg";

/// `<port>` elements that sit directly inside an `<input>` block
fn port_nodes<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    doc.descendants().filter(|node| {
        node.has_tag_name("port") && node.parent().is_some_and(|p| p.has_tag_name("input"))
    })
}

async fn read_cfg(path: &Path) -> Result<String, CfgError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CfgError::Io {
            path: path.to_path_buf(),
            source,
        })
}
