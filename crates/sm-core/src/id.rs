//! Annotation identifiers.
//!
//! Ids are opaque strings owned by the external annotation store (database
//! keys, AI job ids, ...). Shapes drawn in the viewer get an `ann_<n>` id
//! until the store assigns its own through a later snapshot.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Every id seen in any snapshot or drawn locally. Entries are never freed;
/// a slide session holds at most a few thousand annotations.
static IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Counter behind locally drawn ids. Shared by all editors in the process.
static NEXT_LOCAL: AtomicU64 = AtomicU64::new(0);

const LOCAL_PREFIX: &str = "ann_";

/// Handle to an annotation id string. Compared on every hit test, selection
/// and snapshot merge, so it is a `Copy` key rather than a `String`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationId(Spur);

impl AnnotationId {
    pub fn intern(s: &str) -> Self {
        AnnotationId(IDS.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        IDS.resolve(&self.0)
    }

    /// Next `ann_<n>` id for a locally drawn shape, skipping any the caller
    /// reports as taken (a snapshot may already contain `ann_3`).
    pub fn next_local(mut taken: impl FnMut(AnnotationId) -> bool) -> Self {
        loop {
            let n = NEXT_LOCAL.fetch_add(1, Ordering::Relaxed);
            let id = Self::intern(&format!("{LOCAL_PREFIX}{n}"));
            if !taken(id) {
                return id;
            }
        }
    }
}

impl fmt::Debug for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnnotationId({:?})", self.as_str())
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Plain JSON string on the wire, same as the store's `id` field.
impl Serialize for AnnotationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnnotationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(AnnotationId::intern(&s))
    }
}
