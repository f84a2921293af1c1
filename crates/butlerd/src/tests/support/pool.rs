//! Storage pool double that counts acquisitions and releases.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{CancelSignal, Profile, StorageConnection, StorageError, StoragePool};

#[derive(Default)]
pub(crate) struct AccountingPool {
    profiles: HashMap<i64, Profile>,
    failing: bool,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl AccountingPool {
    pub(crate) fn with_profile(mut self, id: i64, api_key: &str) -> Self {
        self.profiles.insert(
            id,
            Profile {
                id,
                api_key: api_key.to_owned(),
                username: Some(format!("user-{id}")),
            },
        );
        self
    }

    /// Every lookup on a connection from this pool fails.
    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub(crate) fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Connections acquired and not yet released.
    pub(crate) fn outstanding(&self) -> usize {
        self.acquired() - self.released.load(Ordering::SeqCst)
    }
}

pub(crate) struct TestConnection {
    profiles: HashMap<i64, Profile>,
    failing: bool,
}

impl StorageConnection for TestConnection {
    fn profile_by_id(&mut self, profile_id: i64) -> Result<Option<Profile>, StorageError> {
        if self.failing {
            return Err(StorageError::query("database is locked"));
        }
        Ok(self.profiles.get(&profile_id).cloned())
    }
}

impl StoragePool for AccountingPool {
    type Connection = TestConnection;

    fn acquire(&self, signal: &CancelSignal) -> Result<TestConnection, StorageError> {
        signal.check()?;
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(TestConnection {
            profiles: self.profiles.clone(),
            failing: self.failing,
        })
    }

    fn release(&self, _connection: TestConnection) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
