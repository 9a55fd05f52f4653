//! Observability for the catalog
//!
//! Structured JSON logging of typed lifecycle events. Logging is
//! synchronous, side-effect free with respect to catalog state, and never
//! fails an operation.
//!
//! ```ignore
//! use mangastore::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::RecordCreate, &[("key", "978-85-7351-001-2")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

fn severity_for(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_for(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severity_mapping() {
        assert_eq!(severity_for(Event::DataCorruption), Severity::Fatal);
        assert_eq!(severity_for(Event::IndexOpenFailed), Severity::Warn);
        assert_eq!(severity_for(Event::CatalogOpen), Severity::Info);
    }

    #[test]
    fn test_log_event_does_not_panic() {
        log_event(Event::CatalogOpen);
        log_event_with_fields(Event::IndexLoad, &[("entries", "0")]);
    }
}
