//! Per-file content transformation pipeline.
//!
//! ```text
//! transform/
//! ├── links    # link map + wikilink rewriting
//! ├── embeds   # non-note asset embeds -> _files/
//! ├── content  # property projection + body assembly
//! └── hooks    # pluggable value rewriters
//! ```

pub mod content;
pub mod embeds;
pub mod hooks;
pub mod links;

pub use content::{TransformOutcome, transform_note};
pub use embeds::{EmbedOutcome, FileEmbed, transform_file_embeds};
pub use links::{LinkMap, build_link_map, transform_wikilinks};

/// A wikilink that could not be resolved against the link map.
///
/// Not an error: a structured warning, surfaced verbosely, never
/// blocking a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLink {
    /// The span as written, e.g. `[[missing]]`.
    pub wikilink: String,
    /// Source-relative path of the note containing it.
    pub file_path: String,
}
