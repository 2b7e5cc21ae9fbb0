//! Line producer: turns `kind:payload` lines into dispatched events

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_stream::wrappers::SplitStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::types::Event;

/// Dispatch every parseable line from `reader` until EOF or cancellation.
///
/// Blank lines are ignored; malformed or non UTF-8 lines are logged and
/// skipped. Returns the number of events dispatched.
pub async fn pump_lines<R>(reader: R, dispatcher: &Dispatcher) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let signal = dispatcher.signal().clone();
    let mut lines = SplitStream::new(reader.split(b'\n'));
    let mut dispatched = 0;

    loop {
        let line = tokio::select! {
            biased;
            _ = signal.fired() => break,
            line = lines.next() => match line {
                Some(line) => line?,
                None => break,
            },
        };

        let line = match String::from_utf8(line) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "skipping non UTF-8 input line");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match Event::parse_line(&line) {
            Ok(event) => {
                dispatcher.dispatch(event).await;
                dispatched += 1;
            }
            Err(e) => warn!(error = %e, "skipping input line"),
        }
    }

    debug!(dispatched, "line producer finished");
    Ok(dispatched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::consumer::Consumer;
    use crate::signal::CancelSignal;
    use crate::types::EventSender;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct Sink {
        rx: Option<mpsc::Receiver<Event>>,
    }

    #[async_trait]
    impl Consumer for Sink {
        fn name(&self) -> &'static str {
            "sink"
        }

        fn initialize(&mut self, _config: &Config) -> Result<()> {
            Ok(())
        }

        async fn start(&mut self, _signal: CancelSignal) -> Result<EventSender> {
            let (tx, rx) = mpsc::channel(16);
            self.rx = Some(rx);
            Ok(tx)
        }
    }

    #[tokio::test]
    async fn test_pump_lines_dispatches_in_order() {
        let mut dispatcher = Dispatcher::new();
        let mut sink = Sink { rx: None };
        dispatcher.register(&mut sink, &Config::default()).await.unwrap();

        let input: &[u8] = b"mail:2 new\n\n:bad\ntemp:21\nshutdown\n";
        let count = pump_lines(input, &dispatcher).await.unwrap();
        assert_eq!(count, 3);

        let rx = sink.rx.as_mut().unwrap();
        assert_eq!(rx.recv().await.unwrap().kind, "mail");
        assert_eq!(rx.recv().await.unwrap().kind, "temp");
        assert!(rx.recv().await.unwrap().is_shutdown());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped() {
        let mut dispatcher = Dispatcher::new();
        let mut sink = Sink { rx: None };
        dispatcher.register(&mut sink, &Config::default()).await.unwrap();

        let input: &[u8] = b"a:1\n\xff\xfe\nb:2\r\n";
        let count = pump_lines(input, &dispatcher).await.unwrap();
        assert_eq!(count, 2);

        let rx = sink.rx.as_mut().unwrap();
        assert_eq!(rx.recv().await.unwrap().kind, "a");
        let b = rx.recv().await.unwrap();
        assert_eq!(b.kind, "b");
        assert_eq!(b.payload, serde_json::json!(2));
    }
}
