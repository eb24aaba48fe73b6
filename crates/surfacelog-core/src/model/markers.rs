//! Reserved `$`-prefixed keys written into changelog trees.

/// Element or version newly present
pub const ADDED: &str = "$added";
/// Element or version no longer present
pub const REMOVED: &str = "$removed";
/// Value field differs between the two versions
pub const CHANGED: &str = "$changed";
/// Value on the older side
pub const OLD: &str = "$old";
/// Value on the newer side
pub const NEW: &str = "$new";
/// Identity key recorded on a simple ordered array snapshot
pub const KEY: &str = "$key";
/// Expanded reconciliation of a simple ordered array snapshot
pub const DIFF: &str = "$diff";
/// Wrapper for flagged collection elements that are not objects
pub const VALUE: &str = "$value";
