//! Drag tracking.
//!
//! A tool that keeps painting while the pointer is held opens a drag
//! session. The session sees every pointer move and the final release no
//! matter where the pointer is, and is torn down on release before another
//! session can start.

use crate::surface::Surface;
use kurbo::Point;

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Callbacks for an in-progress drag.
pub trait DragHandler {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The pointer moved to `pos` (surface pixels).
    fn on_move(&mut self, surface: &mut Surface, pos: Point);

    /// The drag finished. `pos` is `None` when the pointer was lost rather
    /// than released.
    fn on_end(&mut self, surface: &mut Surface, pos: Option<Point>);

    /// Periodic work; returns true if the surface changed.
    fn tick(&mut self, _surface: &mut Surface, _now: Instant) -> bool {
        false
    }
}

/// Owns the single active drag session, if any.
#[derive(Default)]
pub struct DragTracker {
    session: Option<Box<dyn DragHandler>>,
}

impl std::fmt::Debug for DragTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragTracker")
            .field("session", &self.session.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session. Returns false, dropping `handler`, if one is already active.
    pub fn begin(&mut self, handler: Box<dyn DragHandler>) -> bool {
        if let Some(active) = &self.session {
            log::debug!(
                "Ignoring {} drag while {} is active",
                handler.name(),
                active.name()
            );
            return false;
        }
        log::debug!("Drag started: {}", handler.name());
        self.session = Some(handler);
        true
    }

    /// Whether a session is active.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Name of the active session.
    pub fn active_name(&self) -> Option<&'static str> {
        self.session.as_ref().map(|s| s.name())
    }

    /// Forward a pointer move. Returns true if a session consumed it.
    pub fn pointer_move(&mut self, surface: &mut Surface, pos: Point) -> bool {
        match self.session.as_mut() {
            Some(session) => {
                session.on_move(surface, pos);
                true
            }
            None => false,
        }
    }

    /// Finish the session on release. Returns true if one was active.
    pub fn pointer_up(&mut self, surface: &mut Surface, pos: Point) -> bool {
        self.finish(surface, Some(pos))
    }

    /// Finish the session without a release position.
    pub fn cancel(&mut self, surface: &mut Surface) -> bool {
        self.finish(surface, None)
    }

    /// Drive periodic work of the active session.
    pub fn tick(&mut self, surface: &mut Surface, now: Instant) -> bool {
        match self.session.as_mut() {
            Some(session) => session.tick(surface, now),
            None => false,
        }
    }

    fn finish(&mut self, surface: &mut Surface, pos: Option<Point>) -> bool {
        // Detach before running the end hook so a finished session never
        // sees another event.
        let Some(mut session) = self.session.take() else {
            return false;
        };
        session.on_end(surface, pos);
        log::debug!("Drag finished: {}", session.name());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Log {
        moves: Vec<Point>,
        ends: Vec<Option<Point>>,
        ticks: usize,
    }

    struct Recorder(Rc<RefCell<Log>>);

    impl DragHandler for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn on_move(&mut self, _surface: &mut Surface, pos: Point) {
            self.0.borrow_mut().moves.push(pos);
        }

        fn on_end(&mut self, _surface: &mut Surface, pos: Option<Point>) {
            self.0.borrow_mut().ends.push(pos);
        }

        fn tick(&mut self, _surface: &mut Surface, _now: Instant) -> bool {
            self.0.borrow_mut().ticks += 1;
            true
        }
    }

    fn recorder() -> (Box<dyn DragHandler>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        (Box::new(Recorder(log.clone())), log)
    }

    #[test]
    fn test_session_receives_moves_until_release() {
        let mut surface = Surface::new(10, 10).unwrap();
        let mut tracker = DragTracker::new();
        let (handler, log) = recorder();

        assert!(tracker.begin(handler));
        assert!(tracker.pointer_move(&mut surface, Point::new(1.0, 1.0)));
        assert!(tracker.pointer_move(&mut surface, Point::new(-50.0, 400.0)));
        assert!(tracker.pointer_up(&mut surface, Point::new(2.0, 2.0)));

        assert!(!tracker.is_active());
        assert!(!tracker.pointer_move(&mut surface, Point::new(3.0, 3.0)));
        assert!(!tracker.pointer_up(&mut surface, Point::new(3.0, 3.0)));

        let log = log.borrow();
        assert_eq!(log.moves, vec![Point::new(1.0, 1.0), Point::new(-50.0, 400.0)]);
        assert_eq!(log.ends, vec![Some(Point::new(2.0, 2.0))]);
    }

    #[test]
    fn test_only_one_session() {
        let mut surface = Surface::new(10, 10).unwrap();
        let mut tracker = DragTracker::new();
        let (first, first_log) = recorder();
        let (second, second_log) = recorder();

        assert!(tracker.begin(first));
        assert!(!tracker.begin(second));
        tracker.pointer_move(&mut surface, Point::new(4.0, 4.0));

        assert_eq!(first_log.borrow().moves.len(), 1);
        assert!(second_log.borrow().moves.is_empty());
    }

    #[test]
    fn test_cancel_ends_without_position() {
        let mut surface = Surface::new(10, 10).unwrap();
        let mut tracker = DragTracker::new();
        let (handler, log) = recorder();

        tracker.begin(handler);
        assert!(tracker.cancel(&mut surface));
        assert!(!tracker.cancel(&mut surface));
        assert_eq!(log.borrow().ends, vec![None]);
    }

    #[test]
    fn test_ticks_stop_after_release() {
        let mut surface = Surface::new(10, 10).unwrap();
        let mut tracker = DragTracker::new();
        let (handler, log) = recorder();
        let now = Instant::now();

        tracker.begin(handler);
        assert!(tracker.tick(&mut surface, now));
        tracker.pointer_up(&mut surface, Point::ZERO);
        assert!(!tracker.tick(&mut surface, now));
        assert_eq!(log.borrow().ticks, 1);
    }
}
