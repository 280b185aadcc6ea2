use chrono::NaiveDateTime;

/// Output port: publish domain events (no knowledge of transport).
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}

/// Source of the salon's local wall-clock time.
pub trait Clock: Send + Sync {
    fn now_local(&self) -> NaiveDateTime;
}

/// Host local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Publisher that drops every event; for wiring without live updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl<E: 'static> EventPublisher<E> for NoopPublisher {
    fn publish(&self, _event: &E) {}
}
