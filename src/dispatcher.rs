//! Fan-out of events to every registered consumer

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::consumer::Consumer;
use crate::error::Result;
use crate::signal::CancelSignal;
use crate::types::{Event, EventSender};

struct Registered {
    name: &'static str,
    tx: EventSender,
}

/// Owns the started consumers' input channels and the shared signal.
///
/// Delivery runs in the caller's task: each send waits until that
/// consumer has room, so a slow consumer throttles the others. Per
/// consumer, events arrive in dispatch order.
pub struct Dispatcher {
    consumers: Vec<Registered>,
    signal: CancelSignal,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_signal(CancelSignal::new())
    }

    pub fn with_signal(signal: CancelSignal) -> Self {
        Self {
            consumers: Vec::new(),
            signal,
        }
    }

    /// Signal shared with every consumer
    pub fn signal(&self) -> &CancelSignal {
        &self.signal
    }

    /// Initialize and start a consumer, then record its input channel
    pub async fn register<C>(&mut self, consumer: &mut C, config: &Config) -> Result<()>
    where
        C: Consumer + ?Sized,
    {
        let name = consumer.name();
        consumer.initialize(config)?;
        let tx = consumer.start(self.signal.clone()).await?;
        self.consumers.push(Registered { name, tx });
        info!(consumer = name, "consumer registered");
        Ok(())
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    /// Deliver `event` to every consumer, returning how many accepted it.
    ///
    /// A consumer whose loop has exited is logged and skipped; the rest
    /// still receive the event.
    pub async fn dispatch(&self, event: Event) -> usize {
        debug!(kind = %event.kind, "dispatching event");
        let mut delivered = 0;
        for consumer in &self.consumers {
            match consumer.tx.send(event.clone()).await {
                Ok(()) => delivered += 1,
                Err(_) => {
                    warn!(consumer = consumer.name, kind = %event.kind, "consumer input closed, event skipped");
                }
            }
        }
        delivered
    }

    /// Fire the signal, close every input channel and wait for all consumer tasks
    pub async fn shutdown(self) {
        info!(consumers = self.consumers.len(), "shutting down dispatcher");
        self.signal.fire();
        let signal = self.signal;
        drop(self.consumers);
        signal.wait().await;
        info!("all consumers stopped");
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    /// Consumer whose input is read directly by the test
    struct Probe {
        rx: Option<mpsc::Receiver<Event>>,
    }

    #[async_trait]
    impl Consumer for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn initialize(&mut self, _config: &Config) -> Result<()> {
            Ok(())
        }

        async fn start(&mut self, _signal: CancelSignal) -> Result<EventSender> {
            let (tx, rx) = mpsc::channel(8);
            self.rx = Some(rx);
            Ok(tx)
        }
    }

    #[tokio::test]
    async fn test_register_and_dispatch() {
        let mut dispatcher = Dispatcher::new();
        let mut probe = Probe { rx: None };
        dispatcher.register(&mut probe, &Config::default()).await.unwrap();
        assert_eq!(dispatcher.consumer_count(), 1);

        let delivered = dispatcher.dispatch(Event::new("ping", "1")).await;
        assert_eq!(delivered, 1);

        let received = probe.rx.as_mut().unwrap().recv().await.unwrap();
        assert_eq!(received.kind, "ping");
    }

    #[tokio::test]
    async fn test_closed_consumer_is_skipped() {
        let mut dispatcher = Dispatcher::new();
        let mut gone = Probe { rx: None };
        let mut alive = Probe { rx: None };
        dispatcher.register(&mut gone, &Config::default()).await.unwrap();
        dispatcher.register(&mut alive, &Config::default()).await.unwrap();

        drop(gone.rx.take());

        let delivered = dispatcher.dispatch(Event::new("ping", "2")).await;
        assert_eq!(delivered, 1);
        assert!(alive.rx.as_mut().unwrap().recv().await.is_some());
    }
}
