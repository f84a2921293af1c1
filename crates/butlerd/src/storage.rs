//! Storage pool capability and scoped connection guard.
//!
//! The pool hands out database connections and blocks when exhausted. Every
//! acquisition in the dispatch core goes through [`PooledConn`], which
//! returns the connection on drop, so release also happens while a panic
//! unwinds.

use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::cancel::{CancelSignal, Cancelled};

/// Failures raised by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The caller's signal fired while waiting for a pooled connection.
    #[error("interrupted while waiting for a storage connection")]
    Interrupted(#[from] Cancelled),

    /// A query failed.
    #[error("storage query failed: {message}")]
    Query {
        /// Description of the failure.
        message: String,
    },
}

impl StorageError {
    /// Creates a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// A stored user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Profile identifier.
    pub id: i64,
    /// API key used to authenticate remote calls; may be empty.
    pub api_key: String,
    /// Display name, when known.
    pub username: Option<String>,
}

/// Domain lookups available on a pooled connection.
pub trait StorageConnection {
    /// Looks up a profile by identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the query fails. A missing profile is
    /// `Ok(None)`.
    fn profile_by_id(&mut self, profile_id: i64) -> Result<Option<Profile>, StorageError>;
}

/// Bounded pool of storage connections.
pub trait StoragePool: Send + Sync {
    /// Connection type handed out by the pool.
    type Connection: StorageConnection;

    /// Takes a connection, blocking while the pool is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Interrupted`] when `signal` fires first.
    fn acquire(&self, signal: &CancelSignal) -> Result<Self::Connection, StorageError>;

    /// Returns a connection to the pool.
    fn release(&self, connection: Self::Connection);
}

/// A connection borrowed from a pool, returned when dropped.
pub struct PooledConn<'p, P: StoragePool> {
    pool: &'p P,
    connection: Option<P::Connection>,
}

impl<'p, P: StoragePool> PooledConn<'p, P> {
    /// Acquires a connection from `pool`.
    ///
    /// # Errors
    ///
    /// Propagates the pool's acquisition failure.
    pub fn acquire(pool: &'p P, signal: &CancelSignal) -> Result<Self, StorageError> {
        let connection = pool.acquire(signal)?;
        Ok(Self {
            pool,
            connection: Some(connection),
        })
    }
}

impl<P: StoragePool> Deref for PooledConn<'_, P> {
    type Target = P::Connection;

    #[expect(
        clippy::unreachable,
        reason = "the connection is only taken in Drop"
    )]
    fn deref(&self) -> &Self::Target {
        match self.connection.as_ref() {
            Some(connection) => connection,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl<P: StoragePool> DerefMut for PooledConn<'_, P> {
    #[expect(
        clippy::unreachable,
        reason = "the connection is only taken in Drop"
    )]
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self.connection.as_mut() {
            Some(connection) => connection,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl<P: StoragePool> Drop for PooledConn<'_, P> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(connection);
        }
    }
}
