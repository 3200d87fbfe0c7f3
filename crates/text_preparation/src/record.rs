use serde::{Deserialize, Serialize};

/// One row of the source table: a tagged project entry.
///
/// Deserialized straight from CSV via serde; the column order in the file is
/// `id, created_on, title, description, tag`. Only `title`, `description`,
/// and `tag` survive preprocessing; `id` and `created_on` are dropped when a
/// record is encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub created_on: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub tag: String,
}
