use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use dineline_core::domain::order::OrderState;
use dineline_core::domain::transcript::Message;

/// Mutable per-call state: the full conversation history and the cart.
/// Guarded by one mutex so a turn always observes and mutates both
/// consistently.
#[derive(Debug, Default)]
pub struct SessionState {
    pub history: Vec<Message>,
    pub order: OrderState,
}

/// Binds one call identifier to its conversation state for the lifetime of
/// the call. Created by the session registry on call start and dropped when
/// the registry removes it on call end or transfer.
#[derive(Debug)]
pub struct CallSession {
    call_id: String,
    created_at: DateTime<Utc>,
    state: Mutex<SessionState>,
}

impl CallSession {
    pub fn new(call_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            created_at: Utc::now(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Locks the session for one turn. Only one turn may run at a time for
    /// a session; concurrent loops share the session through this lock.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub async fn handoff_requested(&self) -> bool {
        self.state.lock().await.order.handoff_requested()
    }
}
