//! crates/diary_core/src/pairing.rs
//!
//! The pairing directory maps each student to their single assigned teacher.
//! It is stored as one object `pairs: {studentId: teacherId}`.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::Identity;
use crate::error::{DeskError, DeskResult};
use crate::paths;
use crate::ports::{ClientContext, PortResult, TreeStore};

/// A loaded snapshot of every pairing edge, keyed by student.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairings {
    edges: HashMap<Identity, Identity>,
}

impl Pairings {
    /// Builds the mapping from a `pairs` snapshot. Edges whose target is not a
    /// string are skipped.
    pub fn from_snapshot(snapshot: Option<&Value>) -> Self {
        let Some(object) = snapshot.and_then(Value::as_object) else {
            return Self::default();
        };
        let edges = object
            .iter()
            .filter_map(|(student, teacher)| match teacher.as_str() {
                Some(teacher) => Some((Identity::new(student.as_str()), Identity::new(teacher))),
                None => {
                    warn!("Skipping malformed pairing edge for student {}", student);
                    None
                }
            })
            .collect();
        Self { edges }
    }

    /// Every student whose edge points at `teacher`. Returned as an ordered set
    /// so callers that list students get a stable order.
    pub fn students_of(&self, teacher: &Identity) -> BTreeSet<Identity> {
        self.edges
            .iter()
            .filter(|(_, assigned)| *assigned == teacher)
            .map(|(student, _)| student.clone())
            .collect()
    }
}

impl FromIterator<(Identity, Identity)> for Pairings {
    fn from_iter<I: IntoIterator<Item = (Identity, Identity)>>(iter: I) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}

pub struct PairingDirectory {
    store: Arc<dyn TreeStore>,
}

impl PairingDirectory {
    pub fn new(ctx: &ClientContext) -> Self {
        Self {
            store: ctx.store.clone(),
        }
    }

    /// Fetches the whole mapping in one read. A missing mapping is an empty one.
    pub async fn load(&self) -> PortResult<Pairings> {
        let snapshot = self.store.get(paths::PAIRS).await?;
        if snapshot.is_none() {
            info!("No pairings stored");
        }
        Ok(Pairings::from_snapshot(snapshot.as_ref()))
    }

    /// The single teacher assigned to `student`.
    ///
    /// Fails with `DeskError::NotAssigned` when there is no edge; no
    /// conversation can be addressed without one.
    pub async fn resolve_teacher_for(&self, student: &Identity) -> DeskResult<Identity> {
        let snapshot = self.store.get(&paths::pair_of(student)).await?;
        match snapshot.as_ref().and_then(Value::as_str) {
            Some(teacher) => Ok(Identity::new(teacher)),
            None => {
                warn!("No teacher assigned to student {}", student);
                Err(DeskError::NotAssigned(student.clone()))
            }
        }
    }

    /// Every student assigned to `teacher`; empty when nothing is paired.
    pub async fn resolve_students_for(&self, teacher: &Identity) -> PortResult<BTreeSet<Identity>> {
        Ok(self.load().await?.students_of(teacher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemorySessions, MemoryTree};
    use serde_json::json;

    fn id(raw: &str) -> Identity {
        Identity::new(raw)
    }

    async fn directory_with(pairs: Option<Value>) -> PairingDirectory {
        let tree = Arc::new(MemoryTree::new());
        if let Some(pairs) = pairs {
            tree.set("pairs", pairs).await.unwrap();
        }
        PairingDirectory::new(&ClientContext::new(tree, Arc::new(MemorySessions::new())))
    }

    #[tokio::test]
    async fn students_are_filtered_by_teacher() {
        let directory = directory_with(Some(json!({ "A": "T1", "B": "T1", "C": "T2" }))).await;

        let t1 = directory.resolve_students_for(&id("T1")).await.unwrap();
        let t2 = directory.resolve_students_for(&id("T2")).await.unwrap();

        assert_eq!(t1, BTreeSet::from([id("A"), id("B")]));
        assert_eq!(t2, BTreeSet::from([id("C")]));
    }

    #[tokio::test]
    async fn missing_mapping_gives_no_students() {
        let directory = directory_with(None).await;
        let students = directory.resolve_students_for(&id("T1")).await.unwrap();
        assert!(students.is_empty());
    }

    #[tokio::test]
    async fn teacher_lookup_uses_the_student_edge() {
        let directory = directory_with(Some(json!({ "A": "T1", "C": "T2" }))).await;
        assert_eq!(directory.resolve_teacher_for(&id("C")).await.unwrap(), id("T2"));
    }

    #[tokio::test]
    async fn unassigned_student_is_not_assigned() {
        let directory = directory_with(Some(json!({ "A": "T1" }))).await;
        let err = directory.resolve_teacher_for(&id("Z")).await.unwrap_err();
        assert!(matches!(err, DeskError::NotAssigned(student) if student == id("Z")));

        let empty = directory_with(None).await;
        assert!(matches!(
            empty.resolve_teacher_for(&id("A")).await,
            Err(DeskError::NotAssigned(_))
        ));
    }

    #[test]
    fn malformed_edges_are_skipped() {
        let snapshot = json!({ "A": "T1", "B": 7, "C": null, "D": "T1" });
        let pairings = Pairings::from_snapshot(Some(&snapshot));
        assert_eq!(pairings.students_of(&id("T1")), BTreeSet::from([id("A"), id("D")]));
        assert!(pairings.students_of(&id("7")).is_empty());
    }

    #[test]
    fn students_of_excludes_other_teachers() {
        let pairings: Pairings = [(id("A"), id("T1")), (id("B"), id("T2"))]
            .into_iter()
            .collect();
        assert_eq!(pairings.students_of(&id("T1")), BTreeSet::from([id("A")]));
        assert!(pairings.students_of(&id("T3")).is_empty());
    }
}
