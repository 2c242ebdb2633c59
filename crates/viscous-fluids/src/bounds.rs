use glam::Vec2;

use crate::ConfigError;

/// Axis-aligned simulation rectangle. Particles leaving it are culled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2D {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds2D {
    /// Creates bounds centered on `center`, extending `half_extent` in each direction.
    pub fn new(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Bounds visible through an orthographic camera at `center` with the given half height and
    /// aspect ratio (width / height).
    pub fn from_viewport(center: Vec2, half_height: f32, aspect: f32) -> Self {
        Self::new(center, Vec2::new(half_height * aspect, half_height))
    }

    #[inline(always)]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline(always)]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Whether `p` lies strictly beyond any edge. Points on an edge are inside.
    #[inline]
    pub fn is_outside(&self, p: Vec2) -> bool {
        p.x > self.max.x || p.y > self.max.y || p.x < self.min.x || p.y < self.min.y
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        !self.is_outside(p)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.size();
        if !self.min.is_finite() || !self.max.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
            return Err(ConfigError::DegenerateBounds {
                min: self.min.into(),
                max: self.max.into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_inside() {
        let bounds = Bounds2D::new(Vec2::ZERO, Vec2::new(2.0, 1.0));

        assert!(bounds.contains(Vec2::new(2.0, 1.0)));
        assert!(bounds.contains(Vec2::new(-2.0, -1.0)));
        assert!(bounds.is_outside(Vec2::new(2.001, 0.0)));
        assert!(bounds.is_outside(Vec2::new(0.0, -1.001)));
    }

    #[test]
    fn viewport_uses_aspect_for_width() {
        let bounds = Bounds2D::from_viewport(Vec2::new(1.0, 0.0), 5.0, 2.0);

        assert_eq!(bounds.min, Vec2::new(-9.0, -5.0));
        assert_eq!(bounds.max, Vec2::new(11.0, 5.0));
    }

    #[test]
    fn rejects_flat_bounds() {
        let bounds = Bounds2D::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert!(matches!(bounds.validate(), Err(ConfigError::DegenerateBounds { .. })));
    }
}
