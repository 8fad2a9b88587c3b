//! Hierarchical storage keys.
//!
//! A key names one record: its kind, its identifier, and (for child kinds)
//! the key of the record it lives under. The parent is held by value, so a
//! `Book` key carries a full copy of its owning `User` key.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One `(kind, name)` step of a key path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathElement {
    pub kind: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey {
    kind: String,
    name: String,
    parent: Option<Box<StorageKey>>,
}

/// Derive the storage key for `(kind, id)` under an optional parent.
///
/// Pure and deterministic: equal inputs always produce equal keys.
pub fn derive_key(kind: &str, id: &str, parent: Option<StorageKey>) -> StorageKey {
    StorageKey {
        kind: kind.to_string(),
        name: id.to_string(),
        parent: parent.map(Box::new),
    }
}

impl StorageKey {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&StorageKey> {
        self.parent.as_deref()
    }

    /// Root-first path of this key, ending with the key's own element.
    pub fn path(&self) -> Vec<PathElement> {
        let mut path = Vec::new();
        let mut cur = Some(self);
        while let Some(k) = cur {
            path.push(PathElement { kind: k.kind.clone(), name: k.name.clone() });
            cur = k.parent();
        }
        path.reverse();
        path
    }

    /// Rebuild a key from a root-first path. `None` for an empty path.
    pub fn from_path(path: &[PathElement]) -> Option<StorageKey> {
        path.iter().fold(None, |parent, el| Some(derive_key(&el.kind, &el.name, parent)))
    }

    fn depth(&self) -> usize {
        std::iter::successors(Some(self), |k| k.parent()).count()
    }

    /// The ancestor `steps` levels up, or the root if the chain is shorter.
    fn up(&self, steps: usize) -> &StorageKey {
        let mut cur = self;
        for _ in 0..steps {
            match cur.parent() {
                Some(parent) => cur = parent,
                None => break,
            }
        }
        cur
    }

    /// True when `ancestor` is a proper prefix of this key's path.
    pub fn has_ancestor(&self, ancestor: &StorageKey) -> bool {
        let mut cur = self.parent();
        while let Some(k) = cur {
            if k == ancestor {
                return true;
            }
            cur = k.parent();
        }
        false
    }
}

/// Native key order: root-first path comparison, `(kind, name)` per step.
impl Ord for StorageKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let (da, db) = (self.depth(), other.depth());
        let a = self.up(da.saturating_sub(db));
        let b = other.up(db.saturating_sub(da));
        // a prefix sorts before its extensions
        cmp_same_depth(a, b).then(da.cmp(&db))
    }
}

fn cmp_same_depth(a: &StorageKey, b: &StorageKey) -> Ordering {
    let parents = match (a.parent(), b.parent()) {
        (Some(pa), Some(pb)) => cmp_same_depth(pa, pb),
        _ => Ordering::Equal,
    };
    parents.then_with(|| (a.kind.as_str(), a.name.as_str()).cmp(&(b.kind.as_str(), b.name.as_str())))
}

impl PartialOrd for StorageKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent() {
            write!(f, "{parent}")?;
        }
        write!(f, "/{},{}", self.kind, self.name)
    }
}
