//! Lazily-opened store connection
//!
//! A handle owns at most one store. It is opened on first use and reused
//! until the handle is dropped. A failed open leaves the handle empty so the
//! next call tries again.

use std::cell::OnceCell;

use crate::{Error, Result};

type Opener<S> = Box<dyn Fn() -> Result<S> + Send>;

pub struct StoreHandle<S> {
    opener: Opener<S>,
    store: OnceCell<S>,
}

impl<S: 'static> StoreHandle<S> {
    /// Defer opening until the first call to `get`
    pub fn lazy(opener: impl Fn() -> Result<S> + Send + 'static) -> Self {
        Self {
            opener: Box::new(opener),
            store: OnceCell::new(),
        }
    }

    /// Wrap an already-open store
    pub fn ready(store: S) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(store);
        Self {
            opener: Box::new(|| -> Result<S> {
                Err(Error::StoreUnavailable("store was supplied already open".to_string()))
            }),
            store: cell,
        }
    }

    pub fn is_open(&self) -> bool {
        self.store.get().is_some()
    }

    /// The open store, opening it on first use
    pub fn get(&self) -> Result<&S> {
        if let Some(store) = self.store.get() {
            return Ok(store);
        }

        tracing::debug!("Opening record store");
        let store = (self.opener)().map_err(|e| match e {
            e @ (Error::InvalidInput(_) | Error::StoreUnavailable(_)) => e,
            other => Error::StoreUnavailable(other.to_string()),
        })?;
        Ok(self.store.get_or_init(|| store))
    }
}

impl<S: 'static> std::fmt::Debug for StoreHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("open", &self.is_open())
            .finish()
    }
}
