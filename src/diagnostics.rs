//! Diagnostics sinks.
//!
//! Contract violations in the core (duplicate identities, backend errors on
//! degraded paths) are recovered locally and reported through an injected
//! [`Diagnostics`] observer instead of global I/O. Components that can emit
//! diagnostics take an explicit `Rc<dyn Diagnostics>`; convenience
//! constructors default to [`LogDiagnostics`].

use std::rc::Rc;

/// Receives warnings and debug traces from the runtime.
pub trait Diagnostics {
    /// A recovered contract violation or degraded operation.
    fn warning(&self, origin: &str, message: &str);

    /// A low-importance trace.
    fn debug(&self, origin: &str, message: &str) {
        let _ = (origin, message);
    }
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warning(&self, origin: &str, message: &str) {
        log::warn!("{}: {}", origin, message);
    }

    fn debug(&self, origin: &str, message: &str) {
        log::debug!("{}: {}", origin, message);
    }
}

/// Discards all diagnostics.
#[derive(Debug, Default)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn warning(&self, _origin: &str, _message: &str) {}
}

/// The default sink used by convenience constructors.
pub fn default_diagnostics() -> Rc<dyn Diagnostics> {
    Rc::new(LogDiagnostics)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Diagnostics;
    use std::cell::RefCell;

    /// Records messages for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingDiagnostics {
        pub warnings: RefCell<Vec<String>>,
    }

    impl Diagnostics for RecordingDiagnostics {
        fn warning(&self, origin: &str, message: &str) {
            self.warnings
                .borrow_mut()
                .push(format!("{}: {}", origin, message));
        }
    }
}
