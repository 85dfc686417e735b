//! Freehand stroking for the Line and Erase tools.

use crate::drag::DragHandler;
use crate::surface::{CompositeOp, LineCap, Surface};
use kurbo::Point;

/// Connects each pointer sample to the previous one with a round-capped segment.
#[derive(Debug, Clone)]
pub struct StrokeSession {
    name: &'static str,
    last: Point,
    segments: usize,
    /// Composite op to put back when the stroke ends.
    restore_composite: Option<CompositeOp>,
}

impl StrokeSession {
    /// Begin a Line stroke. Nothing is painted until the pointer moves.
    pub fn line(surface: &mut Surface, pos: Point) -> Self {
        surface.state.line_cap = LineCap::Round;
        Self {
            name: "line",
            last: pos,
            segments: 0,
            restore_composite: None,
        }
    }

    /// Begin an Erase stroke: a Line stroke that removes pixels.
    pub fn erase(surface: &mut Surface, pos: Point) -> Self {
        surface.state.composite = CompositeOp::DestinationOut;
        Self {
            name: "erase",
            restore_composite: Some(CompositeOp::SourceOver),
            ..Self::line(surface, pos)
        }
    }

    /// Last sampled position.
    pub fn last(&self) -> Point {
        self.last
    }
}

impl DragHandler for StrokeSession {
    fn name(&self) -> &'static str {
        self.name
    }

    fn on_move(&mut self, surface: &mut Surface, pos: Point) {
        surface.stroke_segment(self.last, pos);
        self.last = pos;
        self.segments += 1;
    }

    fn on_end(&mut self, surface: &mut Surface, _pos: Option<Point>) {
        if let Some(op) = self.restore_composite.take() {
            surface.state.composite = op;
        }
        log::debug!("{} stroke ended after {} segments", self.name, self.segments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn alpha(surface: &Surface, x: u32, y: u32) -> u8 {
        surface.pixel(x, y).map(|p| p.a).unwrap_or(0)
    }

    #[test]
    fn test_line_paints_only_on_move() {
        let mut surface = Surface::new(50, 50).unwrap();
        surface.state.line_width = 3.0;
        let mut stroke = StrokeSession::line(&mut surface, Point::new(10.0, 10.0));

        assert_eq!(surface.state.line_cap, LineCap::Round);
        assert_eq!(alpha(&surface, 10, 10), 0);

        stroke.on_move(&mut surface, Point::new(40.0, 10.0));
        stroke.on_move(&mut surface, Point::new(40.0, 40.0));
        stroke.on_end(&mut surface, Some(Point::new(40.0, 40.0)));

        assert_eq!(alpha(&surface, 25, 10), 255);
        assert_eq!(alpha(&surface, 40, 25), 255);
        assert_eq!(alpha(&surface, 25, 25), 0);
        assert_eq!(stroke.last(), Point::new(40.0, 40.0));
    }

    #[test]
    fn test_erase_restores_source_over() {
        let mut surface = Surface::new(30, 30).unwrap();
        surface.state.fill = Rgba::rgb(0, 128, 0);
        surface.fill_rect(0.0, 0.0, 30.0, 30.0);
        surface.state.line_width = 5.0;

        let mut stroke = StrokeSession::erase(&mut surface, Point::new(0.0, 15.0));
        assert_eq!(surface.state.composite, CompositeOp::DestinationOut);

        stroke.on_move(&mut surface, Point::new(30.0, 15.0));
        stroke.on_end(&mut surface, None);

        assert_eq!(surface.state.composite, CompositeOp::SourceOver);
        assert_eq!(alpha(&surface, 15, 15), 0);
        assert_eq!(alpha(&surface, 15, 3), 255);
    }
}
