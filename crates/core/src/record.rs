use serde::{Deserialize, Serialize};

/// A typed record paired with its store-assigned identifier.
///
/// Serializes flat: the id sits next to the record's own fields, matching the
/// shape clients read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<I, T> {
    pub id: I,
    #[serde(flatten)]
    pub data: T,
}

impl<I, T> Record<I, T> {
    pub fn new(id: I, data: T) -> Self {
        Self { id, data }
    }
}
