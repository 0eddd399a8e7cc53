use serde::{Deserialize, Serialize};

/// Which participants a search reaches, and what consistency it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// A single region's own store. Strongly consistent with that
    /// region's writes.
    Local,
    /// The eventually-consistent global replica, kept current by a
    /// change-feed bridge outside this crate.
    GlobalFast,
    /// Fan out to every configured region in parallel and merge.
    GlobalLive,
}
