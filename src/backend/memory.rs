//! In-process backend holding colony state in memory

use crate::backend::ColonyBackend;
use crate::core::error::{LaborError, Result};
use crate::entity::Worker;
use crate::optimizer::diff::{Change, PriorityMap};

#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    pub workers: Vec<Worker>,
    pub canonical: Vec<String>,
    pub assignments: PriorityMap,
    /// Every batch accepted so far, in submission order
    pub submitted: Vec<Vec<Change>>,
    /// When set, the next submission fails with this message
    pub fail_next_submit: Option<String>,
}

impl InMemoryBackend {
    pub fn new(workers: Vec<Worker>, canonical: Vec<String>) -> Self {
        Self {
            workers,
            canonical,
            ..Self::default()
        }
    }

    pub fn with_assignments(mut self, assignments: PriorityMap) -> Self {
        self.assignments = assignments;
        self
    }

    pub fn worker_mut(&mut self, id: &str) -> Option<&mut Worker> {
        self.workers.iter_mut().find(|w| w.id.as_str() == id)
    }
}

impl ColonyBackend for InMemoryBackend {
    fn worker_roster(&self) -> Result<Vec<Worker>> {
        Ok(self.workers.clone())
    }

    fn canonical_work_categories(&self) -> Result<Vec<String>> {
        Ok(self.canonical.clone())
    }

    fn current_assignments(&self) -> Result<PriorityMap> {
        Ok(self.assignments.clone())
    }

    fn submit_priority_changes(&mut self, changes: &[Change]) -> Result<()> {
        if let Some(message) = self.fail_next_submit.take() {
            return Err(LaborError::Submission(message));
        }
        self.assignments.apply(changes);
        self.submitted.push(changes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CategoryKey, Priority, WorkerId};

    #[test]
    fn test_submission_applies_changes() {
        let mut backend = InMemoryBackend::new(vec![Worker::new("a", "A")], vec!["Cooking".into()]);
        let change = Change {
            worker_id: WorkerId::from("a"),
            category: CategoryKey::new("Cooking"),
            work_type: "Cooking".into(),
            priority: Priority::Secondary,
        };

        backend.submit_priority_changes(&[change]).unwrap();

        assert_eq!(
            backend.assignments.get(&WorkerId::from("a"), &CategoryKey::new("cooking")),
            Priority::Secondary
        );
        assert_eq!(backend.submitted.len(), 1);
    }

    #[test]
    fn test_injected_failure_is_one_shot() {
        let mut backend = InMemoryBackend::default();
        backend.fail_next_submit = Some("colony offline".into());

        let err = backend.submit_priority_changes(&[]).unwrap_err();
        assert!(matches!(err, LaborError::Submission(ref m) if m == "colony offline"));
        assert!(backend.submitted.is_empty());
        assert!(backend.submit_priority_changes(&[]).is_ok());
    }
}
