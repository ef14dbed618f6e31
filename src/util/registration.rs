use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// On instantiation `Registration` adds 1 and on destruction 1 is subtracted
pub(crate) struct Registration {
    nb: Arc<AtomicUsize>,
}

impl Registration {
    pub(crate) fn new(nb: Arc<AtomicUsize>) -> Self {
        let _ = nb.fetch_add(1, Ordering::Release);
        Self { nb }
    }

    /// Current counter value, this registration included
    pub(crate) fn value(&self) -> usize {
        self.nb.load(Ordering::Acquire)
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let _ = self.nb.fetch_sub(1, Ordering::Release);
    }
}
