use crate::common::*;

/// A cooperative cancellation flag shared between a driver and its workers.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Fail with [Error::Cancelled] once cancellation is requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

const RUNNING: u8 = 0;
const COMMITTED: u8 = 1;
const ABANDONED: u8 = 2;

/// The persistence switch of a single batch item.
///
/// A worker calls [ItemGuard::commit] right before writing its outputs, and the driver
/// calls [ItemGuard::abandon] when the item times out. Exactly one of the two succeeds.
#[derive(Debug, Clone, Default)]
pub struct ItemGuard {
    state: Arc<AtomicU8>,
}

impl ItemGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the right to persist outputs.
    ///
    /// It fails with [Error::Cancelled] if the item was abandoned.
    pub fn commit(&self) -> Result<()> {
        match self.transit(COMMITTED) {
            RUNNING | COMMITTED => Ok(()),
            _ => Err(Error::Cancelled),
        }
    }

    /// Give up the item. Returns false if the worker is already persisting outputs.
    pub fn abandon(&self) -> bool {
        matches!(self.transit(ABANDONED), RUNNING | ABANDONED)
    }

    /// Leave the running state, returning the state before the call.
    fn transit(&self, target: u8) -> u8 {
        match self
            .state
            .compare_exchange(RUNNING, target, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(prev) | Err(prev) => prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let cancel = Cancellation::new();
        let other = cancel.clone();
        assert!(other.check().is_ok());

        cancel.cancel();
        assert!(other.is_cancelled());
        assert!(matches!(other.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn abandoned_item_cannot_commit() {
        let guard = ItemGuard::new();
        assert!(guard.abandon());
        assert!(guard.abandon());
        assert!(matches!(guard.clone().commit(), Err(Error::Cancelled)));
    }

    #[test]
    fn committed_item_cannot_be_abandoned() {
        let guard = ItemGuard::new();
        assert!(guard.commit().is_ok());
        assert!(guard.commit().is_ok());
        assert!(!guard.clone().abandon());
    }
}
