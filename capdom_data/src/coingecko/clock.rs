use std::time::Duration;
use futures::future::BoxFuture;

/// Source of waits, so cooldowns and request pacing can be skipped in tests.
pub trait Clock {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
