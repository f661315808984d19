//! Close-on-outside-click detection

use std::fmt;

use super::geometry::{Point, Rect};

type CloseCallback = Box<dyn FnMut() + Send>;

/// Calls a close callback when a pointer-down lands outside a container.
///
/// Nothing fires while the container has no bounds (not laid out yet) or
/// when no callback is set.
#[derive(Default)]
pub struct OutsideClickGuard {
    bounds: Option<Rect>,
    on_close: Option<CloseCallback>,
}

impl OutsideClickGuard {
    /// Creates a guard with no bounds and no callback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a guard that calls `on_close` on outside clicks.
    #[must_use]
    pub fn with_close(on_close: impl FnMut() + Send + 'static) -> Self {
        Self {
            bounds: None,
            on_close: Some(Box::new(on_close)),
        }
    }

    /// Updates the container bounds; `None` detaches it.
    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
    }

    /// Replaces the close callback.
    pub fn set_on_close(&mut self, on_close: Option<CloseCallback>) {
        self.on_close = on_close;
    }

    /// Handles a pointer-down. Returns true if the callback was invoked.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };
        if bounds.contains(point) {
            return false;
        }
        match self.on_close.as_mut() {
            Some(close) => {
                close();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for OutsideClickGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutsideClickGuard")
            .field("bounds", &self.bounds)
            .field("has_on_close", &self.on_close.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_guard() -> (OutsideClickGuard, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let guard = OutsideClickGuard::with_close(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (guard, count)
    }

    #[test]
    fn test_outside_click_closes() {
        let (mut guard, count) = counting_guard();
        guard.set_bounds(Some(Rect::new(0.0, 0.0, 200.0, 300.0)));

        assert!(guard.pointer_down(Point::new(250.0, 10.0)));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_inside_click_is_ignored() {
        let (mut guard, count) = counting_guard();
        guard.set_bounds(Some(Rect::new(0.0, 0.0, 200.0, 300.0)));

        assert!(!guard.pointer_down(Point::new(100.0, 100.0)));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_bounds_or_no_callback_never_fires() {
        let (mut guard, count) = counting_guard();
        assert!(!guard.pointer_down(Point::new(1.0, 1.0)));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        let mut bare = OutsideClickGuard::new();
        bare.set_bounds(Some(Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert!(!bare.pointer_down(Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_replaced_callback_is_the_one_called() {
        let (mut guard, first) = counting_guard();
        guard.set_bounds(Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let second = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&second);
        guard.set_on_close(Some(Box::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })));

        assert!(guard.pointer_down(Point::new(20.0, 20.0)));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        guard.set_on_close(None);
        assert!(!guard.pointer_down(Point::new(20.0, 20.0)));
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
