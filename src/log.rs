//! Attachable log sink.
//!
//! Every coder and generator owns a [`Log`]. While a callback is attached the
//! coder reports what it does as `(zone, message)` pairs, for example
//! `("decoder", "symbol 3 pivot, rank 4")`. The sink is purely observational:
//! attaching, detaching or renaming it never changes coding results.
//!
//! Messages are formatted lazily, so a detached log costs one branch.

use std::fmt;

use crate::tracing_compat::trace;

/// Callback receiving `(zone, message)`.
pub type LogCallback = Box<dyn FnMut(&str, &str) + Send>;

/// Optional log sink plus the name it reports under.
#[derive(Default)]
pub struct Log {
    callback: Option<LogCallback>,
    name: String,
}

impl Log {
    /// A detached log with an empty name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `callback`, replacing any previous one.
    pub fn enable<F>(&mut self, callback: F)
    where
        F: FnMut(&str, &str) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Detaches and drops the callback.
    pub fn disable(&mut self) {
        self.callback = None;
    }

    /// True while a callback is attached.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.callback.is_some()
    }

    /// Sets the name prepended to the zone of every message.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The current log name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Emits one message if a callback is attached.
    pub(crate) fn write<F>(&mut self, zone: &str, message: F)
    where
        F: FnOnce() -> String,
    {
        let Some(callback) = self.callback.as_mut() else {
            return;
        };
        let message = message();
        trace!(log_name = %self.name, zone, message = %message, "coder log");
        if self.name.is_empty() {
            callback(zone, &message);
        } else {
            callback(&format!("{}.{zone}", self.name), &message);
        }
    }
}

impl fmt::Debug for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Log")
            .field("enabled", &self.is_enabled())
            .field("name", &self.name)
            .finish()
    }
}

/// Forwards the log accessors of a coder to its `log` field.
macro_rules! impl_log_accessors {
    ($ty:ty) => {
        impl $ty {
            /// Attaches a `(zone, message)` log callback.
            pub fn enable_log<F>(&mut self, callback: F)
            where
                F: FnMut(&str, &str) + Send + 'static,
            {
                self.log.enable(callback);
            }

            /// Detaches the log callback.
            pub fn disable_log(&mut self) {
                self.log.disable();
            }

            /// True while a log callback is attached.
            #[must_use]
            pub fn is_log_enabled(&self) -> bool {
                self.log.is_enabled()
            }

            /// Sets the name reported with every log message.
            pub fn set_log_name(&mut self, name: impl Into<String>) {
                self.log.set_name(name);
            }

            /// The current log name.
            #[must_use]
            pub fn log_name(&self) -> &str {
                self.log.name()
            }
        }
    };
}

pub(crate) use impl_log_accessors;
