//! Synchronous log fan-out.
//!
//! Every log call stamps the local wall-clock time, builds a
//! [`LogEntry`], invokes each registered subscriber in registration order,
//! and forwards to the `tracing` sink at the matching level. There is no
//! buffering, persistence, or backpressure, and subscribers cannot be
//! removed once registered.

use std::sync::Mutex;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use tilegrid_types::{LogEntry, LogLevel};

const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// A registered log subscriber.
pub type LogSink = Box<dyn Fn(&LogEntry) + Send + Sync>;

/// Fan-out of log entries to registered subscribers.
#[derive(Default)]
pub struct LogFanout {
    subscribers: Mutex<Vec<LogSink>>,
}

impl std::fmt::Debug for LogFanout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.subscribers.lock().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("LogFanout")
            .field("subscribers", &count)
            .finish()
    }
}

impl LogFanout {
    /// Create an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Subscribers are invoked in registration order
    /// and cannot be removed.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&LogEntry) + Send + Sync + 'static,
    {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(Box::new(callback));
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Build a timestamped entry, fan it out, and forward to `tracing`.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: format_timestamp(),
            message: message.into(),
            level,
        };

        match level {
            LogLevel::Info | LogLevel::Success => tracing::info!(target: "tilegrid", "{}", entry.message),
            LogLevel::Warning => tracing::warn!(target: "tilegrid", "{}", entry.message),
            LogLevel::Error => tracing::error!(target: "tilegrid", "{}", entry.message),
        }

        if let Ok(subscribers) = self.subscribers.lock() {
            for subscriber in subscribers.iter() {
                subscriber(&entry);
            }
        }
    }
}

/// Format the current local time as `HH:MM:SS`.
///
/// Falls back to UTC when the local offset cannot be determined (common in
/// multithreaded processes on Unix).
fn format_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(TIME_FORMAT)
        .unwrap_or_else(|_| String::from("--:--:--"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_fan_out_calls_every_subscriber_once_in_order() {
        let fanout = LogFanout::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            fanout.subscribe(move |_entry| order.lock().unwrap().push(tag));
        }

        fanout.log(LogLevel::Info, "hello");

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_entry_carries_message_and_level() {
        let fanout = LogFanout::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            fanout.subscribe(move |entry| seen.lock().unwrap().push(entry.clone()));
        }

        fanout.log(LogLevel::Warning, "low battery");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].message, "low battery");
        assert_eq!(seen[0].level, LogLevel::Warning);
    }

    #[test]
    fn test_timestamp_is_formatted() {
        let stamp = format_timestamp();
        // HH:MM:SS
        assert_eq!(stamp.len(), 8);
        assert_eq!(stamp.as_bytes()[2], b':');
        assert_eq!(stamp.as_bytes()[5], b':');
    }

    #[test]
    fn test_log_without_subscribers_is_ok() {
        let fanout = LogFanout::new();
        fanout.log(LogLevel::Error, "nobody listening");
        assert_eq!(fanout.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_count() {
        let fanout = LogFanout::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..4 {
            let hits = Arc::clone(&hits);
            fanout.subscribe(move |_| {
                hits.fetch_add(1, Ordering::Relaxed);
            });
        }

        assert_eq!(fanout.subscriber_count(), 4);
        fanout.log(LogLevel::Success, "done");
        assert_eq!(hits.load(Ordering::Relaxed), 4);
    }
}
