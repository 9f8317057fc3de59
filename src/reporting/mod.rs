//! Reporting of unexpected errors.
//!
//! Errors that fall outside a form's known failure kinds are handed to an
//! [`ErrorReporter`] before the user sees a generic message.

use std::error::Error;

pub trait ErrorReporter: Send + Sync {
    /// Fire-and-forget. Must not fail or block.
    fn capture(&self, error: &(dyn Error + 'static));
}

/// Reports errors, including their source chain, to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn capture(&self, error: &(dyn Error + 'static)) {
        tracing::error!(error = %error, chain = %source_chain(error), "unexpected error captured");
    }
}

/// Render the sources below `error` as `inner: innermost`. The error itself
/// is not included.
pub fn source_chain(error: &(dyn Error + 'static)) -> String {
    let mut parts = Vec::new();
    let mut current = error.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records the display text of every captured error.
    #[derive(Debug, Default)]
    pub struct RecordingReporter {
        pub captured: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        pub fn count(&self) -> usize {
            self.captured.lock().map(|c| c.len()).unwrap_or(0)
        }
    }

    impl ErrorReporter for RecordingReporter {
        fn capture(&self, error: &(dyn Error + 'static)) {
            if let Ok(mut captured) = self.captured.lock() {
                captured.push(error.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_source_chain() {
        let err = Outer(std::io::Error::other("disk gone"));
        assert_eq!(source_chain(&err), "disk gone");
        assert_eq!(source_chain(&std::io::Error::other("leaf")), "");
    }

    #[derive(Debug, thiserror::Error)]
    #[error("top")]
    struct Top(#[source] Middle);

    #[derive(Debug, thiserror::Error)]
    #[error("middle")]
    struct Middle(#[source] Leaf);

    #[derive(Debug, thiserror::Error)]
    #[error("leaf")]
    struct Leaf;

    #[test]
    fn test_source_chain_orders_inner_to_innermost() {
        assert_eq!(source_chain(&Top(Middle(Leaf))), "middle: leaf");
    }
}
