//! Drag-and-drop gesture tracking.
//!
//! Turns raw pointer input into move requests:
//! `Idle -> press -> Armed -> motion past threshold -> Dragging -> drop -> Idle`.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Pointer position in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Current phase of the gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    /// No button held.
    Idle,
    /// Button pressed on `source`, pointer has not travelled far enough yet.
    Armed { source: PathBuf, origin: Point },
    /// `source` is being dragged.
    Dragging { source: PathBuf },
}

/// Feedback for the node under the pointer while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    Move,
    None,
}

/// A completed drop, to be executed with `VaultTreeSync::move_node`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Drag-and-drop state machine.
#[derive(Debug, Clone)]
pub struct DragGesture {
    threshold: f64,
    state: GestureState,
}

impl DragGesture {
    /// Create a gesture tracker; `threshold` is the per-axis travel in
    /// pixels that starts a drag.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            state: GestureState::Idle,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Button pressed on the node at `source`.
    pub fn press(&mut self, source: impl Into<PathBuf>, at: Point) {
        self.state = GestureState::Armed {
            source: source.into(),
            origin: at,
        };
    }

    /// Pointer moved with the button held. Returns true when this motion
    /// started the drag.
    pub fn motion(&mut self, at: Point) -> bool {
        let GestureState::Armed { source, origin } = &self.state else {
            return false;
        };

        let dx = (at.x - origin.x).abs();
        let dy = (at.y - origin.y).abs();
        if dx > self.threshold || dy > self.threshold {
            debug!(source = %source.display(), "Drag started");
            let source = source.clone();
            self.state = GestureState::Dragging { source };
            return true;
        }
        false
    }

    /// Drop feedback for the node under the pointer.
    ///
    /// Only folders accept a drop, and never the dragged node itself.
    pub fn hover(&self, target: &Path, target_is_directory: bool) -> DropEffect {
        match &self.state {
            GestureState::Dragging { source } if source != target && target_is_directory => {
                DropEffect::Move
            }
            _ => DropEffect::None,
        }
    }

    /// Button released over `target`.
    ///
    /// Returns a move request when a drag was in progress and the target is
    /// a different node. A file target is forwarded as-is; the move resolves
    /// it to the file's parent folder.
    pub fn drop_on(&mut self, target: impl Into<PathBuf>) -> Option<MoveRequest> {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        let GestureState::Dragging { source } = state else {
            return None;
        };

        let target = target.into();
        if source == target {
            return None;
        }
        Some(MoveRequest { source, target })
    }

    /// Button released outside any node, or the drag was aborted.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}

impl Default for DragGesture {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DRAG_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_motion_does_not_start_drag() {
        let mut gesture = DragGesture::default();
        gesture.press("/v/a.pdf", Point::new(10.0, 10.0));

        assert!(!gesture.motion(Point::new(15.0, 14.0)));
        assert!(matches!(gesture.state(), GestureState::Armed { .. }));
        assert!(gesture.drop_on("/v/dir").is_none());
        assert_eq!(gesture.state(), &GestureState::Idle);
    }

    #[test]
    fn test_full_drag_produces_request() {
        let mut gesture = DragGesture::default();
        gesture.press("/v/a.pdf", Point::new(0.0, 0.0));
        assert!(gesture.motion(Point::new(0.0, 6.0)));
        assert!(!gesture.motion(Point::new(0.0, 20.0)));

        let request = gesture.drop_on("/v/dir").unwrap();
        assert_eq!(request.source, PathBuf::from("/v/a.pdf"));
        assert_eq!(request.target, PathBuf::from("/v/dir"));
        assert_eq!(gesture.state(), &GestureState::Idle);
    }

    #[test]
    fn test_drop_on_self_ignored() {
        let mut gesture = DragGesture::default();
        gesture.press("/v/dir", Point::new(0.0, 0.0));
        gesture.motion(Point::new(50.0, 0.0));

        assert!(gesture.drop_on("/v/dir").is_none());
        assert_eq!(gesture.state(), &GestureState::Idle);
    }

    #[test]
    fn test_hover_feedback() {
        let mut gesture = DragGesture::default();
        assert_eq!(gesture.hover(Path::new("/v/dir"), true), DropEffect::None);

        gesture.press("/v/a.pdf", Point::new(0.0, 0.0));
        gesture.motion(Point::new(10.0, 10.0));

        assert_eq!(gesture.hover(Path::new("/v/dir"), true), DropEffect::Move);
        assert_eq!(gesture.hover(Path::new("/v/b.pdf"), false), DropEffect::None);
        assert_eq!(gesture.hover(Path::new("/v/a.pdf"), false), DropEffect::None);
    }

    #[test]
    fn test_motion_without_press_is_ignored() {
        let mut gesture = DragGesture::new(1.0);
        assert!(!gesture.motion(Point::new(100.0, 100.0)));
        assert_eq!(gesture.state(), &GestureState::Idle);
    }

    #[test]
    fn test_cancel_resets() {
        let mut gesture = DragGesture::default();
        gesture.press("/v/a.pdf", Point::new(0.0, 0.0));
        gesture.motion(Point::new(10.0, 0.0));
        gesture.cancel();
        assert_eq!(gesture.state(), &GestureState::Idle);
    }
}
