use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc;

pub type WsSender = mpsc::UnboundedSender<String>;

/// Registry of live case subscriptions. Both the reporter's tracking view
/// and officer dashboards subscribe to a case and receive message and
/// lifecycle events as JSON frames, so new entries appear without a
/// refresh. Subscribing returns a connection id used to unsubscribe when
/// the socket goes away.
#[derive(Clone)]
pub struct CaseStreamHub {
    connections: Arc<DashMap<i32, Vec<(u64, WsSender)>>>,
    next_conn_id: Arc<AtomicU64>,
}

impl Default for CaseStreamHub {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseStreamHub {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
            next_conn_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn subscribe(&self, case_id: i32) -> (u64, mpsc::UnboundedReceiver<String>) {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections
            .entry(case_id)
            .or_default()
            .push((conn_id, tx));
        (conn_id, rx)
    }

    pub fn unsubscribe(&self, case_id: i32, conn_id: u64) {
        if let Some(mut senders) = self.connections.get_mut(&case_id) {
            senders.retain(|(id, _)| *id != conn_id);
            if senders.is_empty() {
                drop(senders);
                self.connections.remove(&case_id);
            }
        }
    }

    /// Fan a frame out to every subscriber of the case, dropping closed
    /// channels along the way.
    pub fn broadcast(&self, case_id: i32, frame: &str) {
        if let Some(mut senders) = self.connections.get_mut(&case_id) {
            senders.retain(|(_, sender)| sender.send(frame.to_string()).is_ok());
            if senders.is_empty() {
                drop(senders);
                self.connections.remove(&case_id);
            }
        }
    }
}
