//! Block uid resolution from the host's DOM ids.
//!
//! The host encodes the block uid at the end of each block element's id, in
//! one of two shapes:
//!
//! - `block-input-<user>-body-outline-05-07-2025-wiBMVuO-N`: the uid is
//!   everything after the `MM-DD-YYYY-` date stamp and may itself contain
//!   hyphens.
//! - `block-input-abc123`: the uid is the last hyphen-separated segment.
//!
//! The date-stamp shape is tried first since it is the more specific one.

use std::sync::OnceLock;

use regex::Regex;
use roam_extras_host::{Document, NodeId, Selector};

use crate::target::BLOCK_CLASS;

fn date_stamp_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\d{2}-\d{2}-\d{4}-(.+)").expect("Invalid date stamp regex"))
}

/// Block uid encoded in a block element's DOM id, or `None` when the id
/// yields an empty uid.
pub fn resolve_block_uid(dom_id: &str) -> Option<String> {
    let uid = match date_stamp_regex().captures(dom_id) {
        Some(captures) => captures.get(1).map(|m| m.as_str()).unwrap_or_default(),
        None => dom_id.rsplit('-').next().unwrap_or_default(),
    };
    (!uid.is_empty()).then(|| uid.to_string())
}

/// Uid of the nearest `.roam-block` ancestor of `node`.
pub fn owning_block_uid(doc: &Document, node: NodeId) -> Option<String> {
    let block = doc.closest(node, &Selector::class(BLOCK_CLASS))?;
    resolve_block_uid(doc.element_id(block)?)
}
