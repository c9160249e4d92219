//! User-facing failure notices.
//!
//! Every failed cart operation fires exactly one [`Notice`] through the
//! store's [`Notifier`]. Delivery is fire-and-forget: a notifier cannot fail
//! the operation that triggered it.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A fixed user-facing failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// Changing a product's amount failed.
    UpdateFailed,
    /// The requested amount exceeds the available stock.
    OutOfStock,
}

impl Notice {
    /// The message shown to the shopper.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::AddFailed => "Erro na adição do produto",
            Self::RemoveFailed => "Erro na remoção do produto",
            Self::UpdateFailed => "Erro na alteração de quantidade do produto",
            Self::OutOfStock => "Quantidade solicitada fora de estoque",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    /// Deliver `notice` to the shopper.
    fn notify(&self, notice: Notice);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Notifier that emits each notice as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = ?notice, "{}", notice.message());
    }
}

/// Notifier that queues notices for a UI layer to drain.
///
/// Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct QueueNotifier {
    queue: Arc<Mutex<VecDeque<Notice>>>,
}

impl QueueNotifier {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every queued notice, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notice> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Number of notices waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no notices are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for QueueNotifier {
    fn notify(&self, notice: Notice) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(notice);
    }
}
