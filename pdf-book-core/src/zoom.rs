//! Discrete zoom ladder used by the zoom controls and as pinch bounds.

use serde::{Deserialize, Serialize};

use crate::error::{BookError, Result};
use crate::page_map::Direction;

/// Ascending list of zoom multipliers offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoomLevels(Vec<f32>);

impl Default for ZoomLevels {
    fn default() -> Self {
        Self(vec![1.0, 1.5, 1.75, 2.0, 4.0, 8.0])
    }
}

impl ZoomLevels {
    pub fn new(levels: Vec<f32>) -> Result<Self> {
        let levels = Self(levels);
        levels.validate()?;
        Ok(levels)
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(BookError::InvalidConfig("zoom levels must not be empty".into()));
        }
        if self.0.iter().any(|level| !(level.is_finite() && *level > 0.0)) {
            return Err(BookError::InvalidConfig(
                "zoom levels must be finite and positive".into(),
            ));
        }
        if self.0.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(BookError::InvalidConfig(
                "zoom levels must be strictly ascending".into(),
            ));
        }
        // The viewport resets to 100% on every page turn and resize.
        if !self.0.contains(&1.0) {
            return Err(BookError::InvalidConfig("zoom levels must include 1.0".into()));
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn min(&self) -> f32 {
        self.0.first().copied().unwrap_or(1.0)
    }

    pub fn max(&self) -> f32 {
        self.0.last().copied().unwrap_or(1.0)
    }

    pub fn clamp(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min(), self.max())
    }

    /// Index of the level closest to `zoom`. Ties go to the 100% level when
    /// present, then to the lower level.
    pub fn nearest_index(&self, zoom: f32) -> usize {
        let start = self
            .0
            .iter()
            .position(|level| *level == 1.0)
            .unwrap_or(0);
        self.0
            .iter()
            .enumerate()
            .fold(start, |best, (index, level)| {
                if (level - zoom).abs() < (self.0[best] - zoom).abs() {
                    index
                } else {
                    best
                }
            })
    }

    /// The neighbouring level of the one nearest to `zoom`, or `None` when
    /// already at that end of the ladder.
    pub fn step(&self, zoom: f32, direction: Direction) -> Option<f32> {
        if !self.can_step(zoom, direction) {
            return None;
        }
        let nearest = self.nearest_index(zoom);
        let index = match direction {
            Direction::Increment => nearest.checked_add(1)?,
            Direction::Decrement => nearest.checked_sub(1)?,
        };
        self.0.get(index).copied()
    }

    pub fn can_step(&self, zoom: f32, direction: Direction) -> bool {
        let nearest = self.nearest_index(zoom);
        match direction {
            Direction::Increment => zoom < self.max() && nearest + 1 < self.0.len(),
            Direction::Decrement => zoom > self.min() && nearest > 0,
        }
    }

    /// Percentage label, e.g. `"175%"`.
    pub fn label(zoom: f32) -> String {
        format!("{}%", (zoom * 100.0).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_ladder_bounds() {
        let levels = ZoomLevels::default();
        assert_eq!(levels.min(), 1.0);
        assert_eq!(levels.max(), 8.0);
        assert_eq!(levels.clamp(12.0), 8.0);
        assert_eq!(levels.clamp(0.3), 1.0);
    }

    #[test]
    fn nearest_index_snaps_to_closest_level() {
        let levels = ZoomLevels::default();
        assert_eq!(levels.nearest_index(1.0), 0);
        assert_eq!(levels.nearest_index(1.6), 1);
        assert_eq!(levels.nearest_index(1.7), 2);
        assert_eq!(levels.nearest_index(3.2), 4);
        assert_eq!(levels.nearest_index(100.0), 5);
    }

    #[test]
    fn stepping_walks_the_ladder() {
        let levels = ZoomLevels::default();
        assert_eq!(levels.step(1.0, Direction::Increment), Some(1.5));
        assert_eq!(levels.step(1.5, Direction::Increment), Some(1.75));
        assert_eq!(levels.step(2.2, Direction::Decrement), Some(1.75));
        assert_eq!(levels.step(8.0, Direction::Increment), None);
        assert_eq!(levels.step(1.0, Direction::Decrement), None);
    }

    #[test]
    fn stepping_is_disabled_past_the_ends() {
        let levels = ZoomLevels::default();
        assert!(!levels.can_step(9.0, Direction::Increment));
        assert!(levels.can_step(9.0, Direction::Decrement));
        assert!(!levels.can_step(0.5, Direction::Decrement));
    }

    #[test]
    fn labels_are_rounded_percentages() {
        assert_eq!(ZoomLevels::label(1.0), "100%");
        assert_eq!(ZoomLevels::label(1.75), "175%");
        assert_eq!(ZoomLevels::label(2.3456), "235%");
    }

    #[test]
    fn rejects_bad_ladders() {
        assert!(ZoomLevels::new(vec![]).is_err());
        assert!(ZoomLevels::new(vec![1.0, 1.0]).is_err());
        assert!(ZoomLevels::new(vec![2.0, 1.0]).is_err());
        assert!(ZoomLevels::new(vec![0.0, 1.0]).is_err());
        assert!(ZoomLevels::new(vec![1.5, 2.0]).is_err());
        assert!(ZoomLevels::new(vec![0.5, 1.0, 3.0]).is_ok());
    }
}
