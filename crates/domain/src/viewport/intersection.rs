//! Visibility tracking for an element inside a scroll root

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::error::{DomainError, DomainResult};

/// Pixel margins applied to the root before intersecting, CSS shorthand
/// order: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RootMargin {
    /// Top margin
    pub top: f64,
    /// Right margin
    pub right: f64,
    /// Bottom margin
    pub bottom: f64,
    /// Left margin
    pub left: f64,
}

impl RootMargin {
    /// The same margin on every side.
    #[must_use]
    pub const fn uniform(px: f64) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }

    fn apply(&self, root: &Rect) -> Rect {
        root.expand(self.top, self.right, self.bottom, self.left)
    }
}

impl FromStr for RootMargin {
    type Err = DomainError;

    /// Parses `"10px"`, `"10px 20px"`, `"10px 20px 30px"` or four values.
    /// Units are `px`; a bare `0` is accepted.
    fn from_str(s: &str) -> DomainResult<Self> {
        let values = s
            .split_whitespace()
            .map(|part| {
                let number = part.strip_suffix("px").unwrap_or(part);
                let px: f64 = number
                    .parse()
                    .map_err(|_| DomainError::InvalidRootMargin(s.to_string()))?;
                if number.len() == part.len() && px != 0.0 {
                    return Err(DomainError::InvalidRootMargin(s.to_string()));
                }
                Ok(px)
            })
            .collect::<DomainResult<Vec<f64>>>()?;

        match values.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(DomainError::InvalidRootMargin(s.to_string())),
        }
    }
}

/// Options for an [`IntersectionTracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionOptions {
    /// Visibility ratios at which a new entry is reported.
    pub thresholds: Vec<f64>,
    /// Margin around the root.
    pub root_margin: RootMargin,
    /// Stop updating once the target has been seen intersecting.
    pub freeze_once_visible: bool,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            thresholds: vec![0.1],
            root_margin: RootMargin::default(),
            freeze_once_visible: false,
        }
    }
}

/// One visibility observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    /// Target bounds
    pub target: Rect,
    /// Root bounds after the margin was applied
    pub root: Rect,
    /// Visible part of the target; zero-sized when not intersecting
    pub intersection: Rect,
    /// Visible fraction of the target, 0.0 to 1.0
    pub ratio: f64,
    /// True if the target touches the root at all
    pub is_intersecting: bool,
}

/// Reports an entry whenever the target crosses a threshold.
///
/// The first observation always reports. Later observations report only
/// when the crossed-threshold index or the intersecting flag changes.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionTracker {
    options: IntersectionOptions,
    entry: Option<IntersectionEntry>,
    last_index: Option<usize>,
}

impl IntersectionTracker {
    /// Creates a tracker.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidThreshold`] if a threshold lies
    /// outside `0.0..=1.0`.
    pub fn new(mut options: IntersectionOptions) -> DomainResult<Self> {
        if options
            .thresholds
            .iter()
            .any(|t| !(0.0..=1.0).contains(t))
        {
            return Err(DomainError::InvalidThreshold(format!(
                "{:?}",
                options.thresholds
            )));
        }
        if options.thresholds.is_empty() {
            options.thresholds.push(0.0);
        }
        options.thresholds.sort_by(f64::total_cmp);
        options.thresholds.dedup();

        Ok(Self {
            options,
            entry: None,
            last_index: None,
        })
    }

    /// Latest reported entry.
    #[must_use]
    pub const fn entry(&self) -> Option<&IntersectionEntry> {
        self.entry.as_ref()
    }

    /// True once frozen by `freeze_once_visible`.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.options.freeze_once_visible && self.entry.is_some_and(|e| e.is_intersecting)
    }

    /// Observes `target` within `root`, returning a new entry if one is due.
    pub fn observe(&mut self, target: Rect, root: Rect) -> Option<&IntersectionEntry> {
        if self.is_frozen() {
            return None;
        }

        let root = self.options.root_margin.apply(&root);
        let overlap = target.intersection(&root);
        let is_intersecting = overlap.is_some();
        let ratio = match overlap {
            Some(_) if target.area() == 0.0 => 1.0,
            Some(visible) => (visible.area() / target.area()).clamp(0.0, 1.0),
            None => 0.0,
        };

        let index = if is_intersecting {
            self.options.thresholds.iter().filter(|t| **t <= ratio).count()
        } else {
            0
        };

        let changed = match (self.last_index, self.entry) {
            (Some(last), Some(previous)) => {
                last != index || previous.is_intersecting != is_intersecting
            }
            _ => true,
        };
        if !changed {
            return None;
        }

        self.last_index = Some(index);
        self.entry = Some(IntersectionEntry {
            target,
            root,
            intersection: overlap.unwrap_or_else(|| Rect::new(target.x, target.y, 0.0, 0.0)),
            ratio,
            is_intersecting,
        });
        self.entry.as_ref()
    }

    /// Forgets the last entry so the next observation reports again.
    pub fn disconnect(&mut self) {
        self.entry = None;
        self.last_index = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn card_at(y: f64) -> Rect {
        Rect::new(100.0, y, 200.0, 100.0)
    }

    #[test]
    fn test_first_observation_always_reports() {
        let mut tracker = IntersectionTracker::new(IntersectionOptions::default()).unwrap();
        let entry = *tracker.observe(card_at(1_000.0), root()).unwrap();
        assert!(!entry.is_intersecting);
        assert_eq!(entry.ratio, 0.0);
    }

    #[test]
    fn test_reports_only_on_threshold_crossing() {
        let mut tracker = IntersectionTracker::new(IntersectionOptions::default()).unwrap();
        tracker.observe(card_at(1_000.0), root());

        // Still hidden: nothing new.
        assert!(tracker.observe(card_at(900.0), root()).is_none());

        // 50% visible crosses the 0.1 threshold.
        let entry = *tracker.observe(card_at(550.0), root()).unwrap();
        assert!(entry.is_intersecting);
        assert_eq!(entry.ratio, 0.5);

        // Fully visible stays above the only threshold.
        assert!(tracker.observe(card_at(100.0), root()).is_none());
    }

    #[test]
    fn test_freeze_once_visible_stops_updates() {
        let mut tracker = IntersectionTracker::new(IntersectionOptions {
            freeze_once_visible: true,
            ..IntersectionOptions::default()
        })
        .unwrap();

        tracker.observe(card_at(100.0), root());
        assert!(tracker.is_frozen());
        assert!(tracker.observe(card_at(5_000.0), root()).is_none());
        assert!(tracker.entry().unwrap().is_intersecting);
    }

    #[test]
    fn test_root_margin_extends_the_root() {
        let mut tracker = IntersectionTracker::new(IntersectionOptions {
            root_margin: "0px 0px 200px 0px".parse().unwrap(),
            ..IntersectionOptions::default()
        })
        .unwrap();

        let entry = *tracker.observe(card_at(650.0), root()).unwrap();
        assert!(entry.is_intersecting);
        assert_eq!(entry.ratio, 1.0);
    }

    #[test]
    fn test_root_margin_shorthand() {
        assert_eq!("0".parse::<RootMargin>().unwrap(), RootMargin::uniform(0.0));
        assert_eq!(
            "10px 20px".parse::<RootMargin>().unwrap(),
            RootMargin {
                top: 10.0,
                right: 20.0,
                bottom: 10.0,
                left: 20.0
            }
        );
        assert!("10%".parse::<RootMargin>().is_err());
        assert!("5".parse::<RootMargin>().is_err());
        assert!("".parse::<RootMargin>().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_thresholds() {
        let result = IntersectionTracker::new(IntersectionOptions {
            thresholds: vec![0.5, 1.5],
            ..IntersectionOptions::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_disconnect_reports_again() {
        let mut tracker = IntersectionTracker::new(IntersectionOptions::default()).unwrap();
        tracker.observe(card_at(100.0), root());
        assert!(tracker.observe(card_at(100.0), root()).is_none());
        tracker.disconnect();
        assert!(tracker.observe(card_at(100.0), root()).is_some());
    }
}
