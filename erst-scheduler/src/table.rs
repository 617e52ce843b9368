//! In-memory job table
//!
//! Maps job ids to their records behind a single table-wide lock. Critical
//! sections only clone, insert, or mutate one record, so contention stays
//! low for the table sizes a single debugging session produces.

use erst_core::domain::job::JobId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, SchedulerError};
use crate::record::JobRecord;

/// Thread-safe store of job records
///
/// Reads return owned snapshots, so callers never observe a record while it
/// is being written.
pub struct JobTable<T> {
    jobs: RwLock<HashMap<JobId, JobRecord<T>>>,
}

impl<T> JobTable<T> {
    /// Creates an empty table
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    // Transitions never panic while holding the lock, so a poisoned lock
    // still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, JobRecord<T>>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, JobRecord<T>>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a new record
    ///
    /// # Errors
    /// Returns `DuplicateJob` if the id is already tracked.
    pub fn insert(&self, id: JobId, record: JobRecord<T>) -> Result<()> {
        let mut jobs = self.write();
        if jobs.contains_key(&id) {
            return Err(SchedulerError::DuplicateJob(id));
        }
        jobs.insert(id, record);
        Ok(())
    }

    /// Returns a snapshot of a record
    pub fn get(&self, id: JobId) -> Result<JobRecord<T>>
    where
        T: Clone,
    {
        self.read()
            .get(&id)
            .cloned()
            .ok_or(SchedulerError::NotFound(id))
    }

    /// Applies `transition` to a record atomically
    ///
    /// The closure runs under the write lock and must not block.
    pub fn update<R>(&self, id: JobId, transition: impl FnOnce(&mut JobRecord<T>) -> R) -> Result<R> {
        let mut jobs = self.write();
        let record = jobs.get_mut(&id).ok_or(SchedulerError::NotFound(id))?;
        Ok(transition(record))
    }

    /// Removes a record, returning it
    pub fn delete(&self, id: JobId) -> Result<JobRecord<T>> {
        self.write().remove(&id).ok_or(SchedulerError::NotFound(id))
    }

    /// Snapshots of all records, oldest submission first
    pub fn list(&self) -> Vec<JobRecord<T>>
    where
        T: Clone,
    {
        let mut records: Vec<_> = self.read().values().cloned().collect();
        records.sort_by_key(|record| record.submitted_at());
        records
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<T> Default for JobTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Completion;
    use erst_core::domain::job::JobStatus;
    use std::sync::Arc;

    #[test]
    fn test_insert_and_get() {
        let table = JobTable::new();
        let id = JobId::generate();
        table.insert(id, JobRecord::<u32>::pending(id)).unwrap();

        let record = table.get(id).unwrap();
        assert_eq!(record.id(), id);
        assert_eq!(record.status(), JobStatus::Pending);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let table = JobTable::new();
        let id = JobId::generate();
        table.insert(id, JobRecord::<u32>::pending(id)).unwrap();

        let err = table.insert(id, JobRecord::pending(id)).unwrap_err();
        assert!(matches!(err, SchedulerError::DuplicateJob(dup) if dup == id));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let table: JobTable<u32> = JobTable::new();
        let id = JobId::generate();

        assert!(table.get(id).unwrap_err().is_not_found());
        assert!(table.update(id, |record| record.start()).unwrap_err().is_not_found());
        assert!(table.delete(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_is_visible_to_later_reads() {
        let table = JobTable::new();
        let id = JobId::generate();
        table.insert(id, JobRecord::pending(id)).unwrap();

        assert!(table.update(id, |record| record.start()).unwrap());
        assert!(
            table
                .update(id, |record| record.complete(Completion::Succeeded(7)))
                .unwrap()
        );

        let record = table.get(id).unwrap();
        assert_eq!(record.status(), JobStatus::Succeeded);
        assert_eq!(record.result(), Some(&7));
    }

    #[test]
    fn test_delete_then_get() {
        let table = JobTable::new();
        let id = JobId::generate();
        table.insert(id, JobRecord::<u32>::pending(id)).unwrap();

        assert_eq!(table.delete(id).unwrap().id(), id);
        assert!(table.get(id).unwrap_err().is_not_found());
        assert!(table.delete(id).unwrap_err().is_not_found());
        assert!(table.is_empty());
    }

    #[test]
    fn test_list_is_ordered_by_submission() {
        let table = JobTable::new();
        let ids: Vec<JobId> = (0..3).map(|_| JobId::generate()).collect();
        for id in &ids {
            table.insert(*id, JobRecord::<u32>::pending(*id)).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let listed: Vec<JobId> = table.list().iter().map(JobRecord::id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_concurrent_updates_do_not_interleave() {
        let table = Arc::new(JobTable::new());
        let id = JobId::generate();
        table.insert(id, JobRecord::<usize>::pending(id)).unwrap();
        table.update(id, |record| record.start()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    table
                        .update(id, |record| record.complete(Completion::Succeeded(n)))
                        .unwrap()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(table.get(id).unwrap().status(), JobStatus::Succeeded);
    }
}
