//! Change notifications emitted by the registry

use serde::Serialize;
use tokio::sync::mpsc;

use crate::columns::Column;

/// What changed in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// Membership or order may have changed; re-read everything.
    /// `rows` is the row count at the moment the change was committed.
    Reset { rows: usize },

    /// A single cell changed
    CellUpdated { row: usize, column: Column },
}

/// Observer of registry changes.
///
/// Called after the change is committed and the registry lock released,
/// so implementations may read the registry.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: RegistryEvent);
}

impl ChangeListener for mpsc::UnboundedSender<RegistryEvent> {
    fn on_change(&self, event: RegistryEvent) {
        if self.send(event).is_err() {
            tracing::trace!("Registry event receiver dropped: {:?}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_listener_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel::<RegistryEvent>();
        tx.on_change(RegistryEvent::Reset { rows: 2 });
        tx.on_change(RegistryEvent::CellUpdated {
            row: 1,
            column: Column::Visible,
        });

        assert_eq!(rx.try_recv().unwrap(), RegistryEvent::Reset { rows: 2 });
        assert_eq!(
            rx.try_recv().unwrap(),
            RegistryEvent::CellUpdated {
                row: 1,
                column: Column::Visible
            }
        );
    }

    #[test]
    fn test_channel_listener_ignores_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<RegistryEvent>();
        drop(rx);
        tx.on_change(RegistryEvent::Reset { rows: 0 });
    }
}
