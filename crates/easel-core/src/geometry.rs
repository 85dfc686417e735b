//! Mapping pointer positions onto surface pixels.

use kurbo::Point;

/// Position of a pointer relative to an element's top-left corner, floored
/// to whole pixels. The result may lie outside the element.
pub fn relative_pos(pointer: Point, origin: Point) -> Point {
    Point::new(
        (pointer.x - origin.x).floor(),
        (pointer.y - origin.y).floor(),
    )
}

/// Where the surface is presented inside the host window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left corner of the surface in physical pixels.
    pub origin: Point,
    /// Physical pixels per surface pixel.
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(origin: Point, scale: f64) -> Self {
        Self { origin, scale }
    }

    /// Map a physical pointer position to a surface pixel position.
    pub fn to_surface(&self, pointer: Point) -> Point {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let local = (pointer - self.origin) / scale;
        relative_pos(Point::ZERO + local, Point::ZERO)
    }

    /// Whether a physical pointer position lies over a surface of the given size.
    pub fn contains(&self, pointer: Point, width: u32, height: u32) -> bool {
        let p = self.to_surface(pointer);
        p.x >= 0.0 && p.y >= 0.0 && p.x < width as f64 && p.y < height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_pos_floors() {
        let p = relative_pos(Point::new(110.7, 52.2), Point::new(10.0, 2.5));
        assert_eq!(p, Point::new(100.0, 49.0));
    }

    #[test]
    fn test_relative_pos_outside_is_negative() {
        let p = relative_pos(Point::new(5.5, 5.0), Point::new(10.0, 10.0));
        assert_eq!(p, Point::new(-5.0, -5.0));
    }

    #[test]
    fn test_viewport_scaling() {
        let viewport = Viewport::new(Point::new(32.0, 32.0), 2.0);
        assert_eq!(viewport.to_surface(Point::new(33.0, 35.0)), Point::new(0.0, 1.0));
        assert_eq!(viewport.to_surface(Point::new(232.0, 132.0)), Point::new(100.0, 50.0));
        assert!(viewport.contains(Point::new(40.0, 40.0), 500, 300));
        assert!(!viewport.contains(Point::new(31.0, 40.0), 500, 300));
    }
}
