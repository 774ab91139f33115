use crate::core::models::fingerprint::Fingerprint;

/// Position of a row in a key list.
///
/// `parent` is the fingerprint of the issuer row the key is listed
/// under, or `None` for the top level. Flat lists only have top-level
/// rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    pub parent: Option<Fingerprint>,
    pub row: usize,
}

impl ModelIndex {
    pub fn top_level(row: usize) -> Self {
        Self { parent: None, row }
    }

    pub fn child(parent: Fingerprint, row: usize) -> Self {
        Self {
            parent: Some(parent),
            row,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }
}

/// Structural change notifications, in the order they happen.
///
/// `*AboutTo*` events are delivered before the mutation, the others
/// after it. Row ranges are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChange {
    RowsAboutToBeInserted {
        parent: Option<Fingerprint>,
        first: usize,
        last: usize,
    },
    RowsInserted {
        parent: Option<Fingerprint>,
        first: usize,
        last: usize,
    },
    RowsAboutToBeRemoved {
        parent: Option<Fingerprint>,
        first: usize,
        last: usize,
    },
    RowsRemoved {
        parent: Option<Fingerprint>,
        first: usize,
        last: usize,
    },
    /// The key at this row was replaced or its derived state changed.
    DataChanged { parent: Option<Fingerprint>, row: usize },
    /// The row is about to be detached so it can be re-listed under a
    /// newly arrived issuer. A matching `RowMoved` follows.
    RowAboutToBeMoved { parent: Option<Fingerprint>, row: usize },
    /// A row announced by `RowAboutToBeMoved` now lives here.
    RowMoved { parent: Option<Fingerprint>, row: usize },
    ModelAboutToBeReset,
    ModelReset,
}

impl ModelChange {
    pub fn about_to_insert(parent: Option<Fingerprint>, row: usize) -> Self {
        ModelChange::RowsAboutToBeInserted {
            parent,
            first: row,
            last: row,
        }
    }

    pub fn inserted(parent: Option<Fingerprint>, row: usize) -> Self {
        ModelChange::RowsInserted {
            parent,
            first: row,
            last: row,
        }
    }

    pub fn about_to_remove(parent: Option<Fingerprint>, row: usize) -> Self {
        ModelChange::RowsAboutToBeRemoved {
            parent,
            first: row,
            last: row,
        }
    }

    pub fn removed(parent: Option<Fingerprint>, row: usize) -> Self {
        ModelChange::RowsRemoved {
            parent,
            first: row,
            last: row,
        }
    }
}
