//! Per-session write locks.
//!
//! An edit is load → apply → save. Two edits of the same session must not
//! interleave, so each holds that session's lock for the whole sequence.
//! Edits of different sessions proceed in parallel.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct SessionLocks {
  inner: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
  /// Wait for exclusive access to session `id`. Released on drop.
  pub async fn lock(&self, id: Uuid) -> OwnedMutexGuard<()> {
    let lock = {
      let mut map = self.inner.lock().await;
      // Drop entries nobody holds or waits on.
      map.retain(|_, l| Arc::strong_count(l) > 1);
      map.entry(id).or_default().clone()
    };
    lock.lock_owned().await
  }
}
