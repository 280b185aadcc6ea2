use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::rest::sse::SseBroadcaster;
use crate::domain::{events::SlotsDomainEvent, ports::EventPublisher};

use super::dto::SlotsEvent;

/// Adapter: implements domain port and forwards events into SSE broadcaster,
/// stamping each with the next sequence number.
pub struct SseSlotsEventPublisher {
    out: SseBroadcaster<SlotsEvent>,
    seq: AtomicU64,
}

impl SseSlotsEventPublisher {
    pub fn new(out: SseBroadcaster<SlotsEvent>) -> Self {
        Self {
            out,
            seq: AtomicU64::new(0),
        }
    }
}

impl EventPublisher<SlotsDomainEvent> for SseSlotsEventPublisher {
    fn publish(&self, event: &SlotsDomainEvent) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(seq, date = %event.date, cause = ?event.cause, "Publishing slots update");
        self.out.send(SlotsEvent::from_domain(seq, event));
    }
}
