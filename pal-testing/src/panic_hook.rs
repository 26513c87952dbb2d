//! Panic hook installation
//!
//! Panics caught by the framework are reported through the result log, so
//! the hook stays quiet on threads that are observing a panic and defers to
//! the previous hook everywhere else.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

static PANIC_HOOK_INIT: Once = Once::new();

thread_local! {
    static OBSERVING: Cell<usize> = const { Cell::new(0) };
    static SILENCED: Cell<usize> = const { Cell::new(0) };
}

fn install_panic_hook() {
    PANIC_HOOK_INIT.call_once(|| {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            if OBSERVING.with(Cell::get) > 0 {
                SILENCED.with(|count| count.set(count.get() + 1));
                tracing::debug!(panic_message = %panic_info, "Caught panic");
            } else {
                default_hook(panic_info);
            }
        }));
    });
}

/// Run `f`, catching a panic without printing it.
pub(crate) fn catch_silent<R>(f: impl FnOnce() -> R) -> Result<R, Box<dyn Any + Send>> {
    install_panic_hook();

    OBSERVING.with(|depth| depth.set(depth.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    OBSERVING.with(|depth| depth.set(depth.get() - 1));

    result
}

/// Panics swallowed by the hook on the current thread
#[cfg(test)]
pub(crate) fn silenced_panics() -> usize {
    SILENCED.with(Cell::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caught_panic_goes_through_silent_hook() {
        let before = silenced_panics();

        let result = catch_silent(|| -> u32 { panic!("expected boom") });

        assert!(result.is_err());
        assert_eq!(silenced_panics(), before + 1);
    }

    #[test]
    fn test_value_passes_through() {
        let before = silenced_panics();

        assert_eq!(catch_silent(|| 7).ok(), Some(7));
        assert_eq!(silenced_panics(), before);
    }

    #[test]
    fn test_nested_catch_restores_depth() {
        let inner = catch_silent(|| catch_silent(|| -> u8 { panic!("inner") }).is_err());
        assert_eq!(inner.ok(), Some(true));
        assert_eq!(OBSERVING.with(Cell::get), 0);
    }
}
