//! # Lifecycle Callbacks
//!
//! Opaque invocables a script supplies for the process-wide hooks. The DSL
//! only stores them; the process manager decides when and with what arguments
//! they run.

use std::fmt;
use std::sync::Arc;

use super::SettingValue;

type CallbackFn = dyn Fn(&[SettingValue]) -> anyhow::Result<()> + Send + Sync;

/// A cloneable handle to a lifecycle hook
#[derive(Clone)]
pub struct Callback {
    label: String,
    func: Arc<CallbackFn>,
}

impl Callback {
    /// Wrap a closure, labelled for debug and JSON output
    pub fn new<L, F>(label: L, func: F) -> Self
    where
        L: Into<String>,
        F: Fn(&[SettingValue]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the hook with whatever arguments the process manager passes
    pub fn call(&self, args: &[SettingValue]) -> anyhow::Result<()> {
        (self.func)(args)
    }

    /// Two handles share the same underlying closure
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("label", &self.label)
            .field("func", &"<Arc<dyn Fn>>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_callback_passes_arguments_through() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let callback = Callback::new("count_args", move |args| {
            counter.fetch_add(args.len(), Ordering::SeqCst);
            Ok(())
        });

        callback
            .call(&[serde_json::json!("pool-1"), serde_json::json!(4242)])
            .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(callback.label(), "count_args");
    }

    #[test]
    fn test_clones_share_closure() {
        let callback = Callback::new("noop", |_| Ok(()));
        let other = Callback::new("noop", |_| Ok(()));
        assert!(callback.ptr_eq(&callback.clone()));
        assert!(!callback.ptr_eq(&other));
    }

    #[test]
    fn test_callback_errors_propagate() {
        let callback = Callback::new("failing", |_| anyhow::bail!("database unavailable"));
        let err = callback.call(&[]).unwrap_err();
        assert_eq!(err.to_string(), "database unavailable");
    }
}
