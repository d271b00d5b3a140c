//! Log formatting helpers
//!
//! Same `Pretty` wrapper as `swissarmyhammer-common`, kept local so this crate
//! has no dependency on it.

use serde::Serialize;
use std::fmt::Debug;

/// Renders a kind definition (or any `Serialize` value) as YAML in log lines,
/// falling back to `Debug` when serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}
