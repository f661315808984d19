//! Headless viewport utilities.
//!
//! Plain-geometry versions of the small UI helpers a front end needs:
//! evaluating media queries against a viewport, closing a popover on a
//! pointer-down outside it, and tracking how much of an element is visible.

mod geometry;
mod intersection;
mod media_query;
mod outside_click;

pub use geometry::{ColorScheme, MediaType, Point, Rect, Viewport};
pub use intersection::{IntersectionEntry, IntersectionOptions, IntersectionTracker, RootMargin};
pub use media_query::{MediaQuery, MediaQueryWatcher};
pub use outside_click::OutsideClickGuard;
