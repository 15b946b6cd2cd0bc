use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

/// A top level document that lives in its own file within a data directory.
///
/// Documents are always read and written whole; there is no partial update.
pub trait Document: Serialize + DeserializeOwned {
    const FILE_NAME: &'static str;

    /// The value materialized when the document does not exist yet.
    fn seed() -> Self;

    fn stem() -> &'static str {
        Path::new(Self::FILE_NAME)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(Self::FILE_NAME)
    }
}
