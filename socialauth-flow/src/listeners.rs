use async_trait::async_trait;
use log::info;
use socialauth_core::{AuthEvent, AuthListener};
use std::sync::Arc;

/// The ordered set of listeners a callback reports to.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn AuthListener>>,
}

impl ListenerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener. Listeners run in the order they were added.
    pub fn push(&mut self, listener: Arc<dyn AuthListener>) {
        self.listeners.push(listener);
    }

    /// Deliver an event to every listener, one after the other.
    pub async fn dispatch(&self, event: &AuthEvent) {
        for listener in &self.listeners {
            listener.on_event(event).await;
        }
    }
}

#[async_trait]
impl AuthListener for ListenerRegistry {
    async fn on_event(&self, event: &AuthEvent) {
        self.dispatch(event).await
    }
}

/// Logs each event at `info` level. Tokens are never printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

#[async_trait]
impl AuthListener for LoggingListener {
    async fn on_event(&self, event: &AuthEvent) {
        match event {
            AuthEvent::TokenIssued { provider, .. } => {
                info!("{provider} issued an access token");
            }
            AuthEvent::IdentityResolved {
                provider, record, ..
            } => {
                info!(
                    "{provider} identified user {} ({})",
                    record.provider_user_id, record.display_name
                );
            }
        }
    }
}
