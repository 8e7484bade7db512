//! Rubber-band selection on the canvas background.
//!
//! A marquee only starts from a pointer-down no object claimed. While the
//! pointer moves, everything inside the rectangle is shown as a selection
//! preview; releasing commits it. With Shift (or Ctrl/Meta) held the
//! rectangle adds to the existing selection instead of replacing it.

use crate::events::is_marked_event;
use crate::input::AsPointerEvent;
use crate::selection::{SelectionCoordinator, SelectionMode};
use wf_core::CanvasConfig;
use wf_core::geometry::{Position, Rect};
use wf_core::model::{ObjectRef, Workflow};
use wf_render::hit::hit_test_rect;

#[derive(Debug, Clone, PartialEq)]
pub enum MarqueeEnd {
    /// The rectangle selected this many objects.
    Selected(usize),
    /// The pointer never moved: a plain click on the background.
    Click { additive: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marquee {
    pointer_id: i32,
    start: Position,
    current: Position,
    /// Selection kept regardless of the rectangle (additive marquee).
    base: Vec<ObjectRef>,
    additive: bool,
    moved: bool,
}

impl Marquee {
    /// Start a marquee at `start` (canvas coordinates). Returns `None` when
    /// an object already handled the event.
    pub fn start(
        event: &impl AsPointerEvent,
        start: Position,
        selection: &SelectionCoordinator,
    ) -> Option<Self> {
        if is_marked_event(event, None) {
            return None;
        }
        let pointer = event.pointer();
        let additive = pointer.modifiers.is_multi_select();
        let base = if additive {
            selection
                .query_selection(SelectionMode::Committed)
                .selected_objects
        } else {
            Vec::new()
        };
        log::trace!("marquee started at {start:?}");
        Some(Self {
            pointer_id: pointer.pointer_id,
            start,
            current: start,
            base,
            additive,
            moved: false,
        })
    }

    pub fn pointer_id(&self) -> i32 {
        self.pointer_id
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.start, self.current)
    }

    /// Move the free corner to `current` and refresh the preview.
    pub fn update(
        &mut self,
        current: Position,
        workflow: &Workflow,
        config: &CanvasConfig,
        selection: &mut SelectionCoordinator,
    ) -> Vec<ObjectRef> {
        self.current = current;
        if current != self.start {
            self.moved = true;
        }
        let hits = hit_test_rect(workflow, config, self.rect());
        selection.deselect_all(&self.base, SelectionMode::Preview);
        selection.select(&self.base, SelectionMode::Preview);
        selection.select(&hits, SelectionMode::Preview);
        hits
    }

    pub fn end(self, selection: &mut SelectionCoordinator) -> MarqueeEnd {
        if !self.moved {
            selection.discard_selection_preview();
            return MarqueeEnd::Click {
                additive: self.additive,
            };
        }
        selection.commit_selection_preview();
        let count = selection
            .query_selection(SelectionMode::Committed)
            .selected_objects
            .len();
        log::debug!("marquee selected {count} object(s)");
        MarqueeEnd::Selected(count)
    }

    pub fn abort(self, selection: &mut SelectionCoordinator) {
        selection.discard_selection_preview();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{MarkOptions, mark_event_as_handled};
    use crate::input::{Modifiers, PointerEvent};
    use pretty_assertions::assert_eq;
    use wf_core::id::{NodeId, WorkflowId};
    use wf_core::model::WorkflowNode;

    fn workflow() -> Workflow {
        let mut wf = Workflow::new(WorkflowId::intern("root"));
        wf.add_node(WorkflowNode::new(NodeId::intern("m1"), Position::new(0.0, 0.0)));
        wf.add_node(WorkflowNode::new(NodeId::intern("m2"), Position::new(200.0, 0.0)));
        wf
    }

    fn node(id: &str) -> ObjectRef {
        ObjectRef::Node(NodeId::intern(id))
    }

    #[test]
    fn marked_events_do_not_start_a_marquee() {
        let selection = SelectionCoordinator::new();
        let ev = PointerEvent::new(0.0, 0.0, Modifiers::NONE, 0.0);
        mark_event_as_handled(&ev, MarkOptions::new("node"));
        assert_eq!(Marquee::start(&ev, Position::ORIGIN, &selection), None);
    }

    #[test]
    fn rectangle_replaces_selection() {
        let wf = workflow();
        let config = CanvasConfig::default();
        let mut selection = SelectionCoordinator::new();
        selection.select(&[node("m2")], SelectionMode::Committed);
        let ev = PointerEvent::new(-10.0, -10.0, Modifiers::NONE, 0.0);
        let mut marquee =
            Marquee::start(&ev, Position::new(-10.0, -10.0), &selection).expect("unmarked");
        let hits = marquee.update(Position::new(50.0, 50.0), &wf, &config, &mut selection);
        assert_eq!(hits, vec![node("m1")]);
        // Committed selection is untouched until release.
        assert!(selection.is_object_selected(&node("m2"), SelectionMode::Committed));
        assert_eq!(marquee.end(&mut selection), MarqueeEnd::Selected(1));
        assert_eq!(
            selection.query_selection(SelectionMode::Committed).selected_objects,
            vec![node("m1")]
        );
    }

    #[test]
    fn shift_marquee_adds_to_selection() {
        let wf = workflow();
        let config = CanvasConfig::default();
        let mut selection = SelectionCoordinator::new();
        selection.select(&[node("m2")], SelectionMode::Committed);
        let ev = PointerEvent::new(0.0, 0.0, Modifiers::SHIFT, 0.0);
        let mut marquee =
            Marquee::start(&ev, Position::new(-10.0, -10.0), &selection).expect("unmarked");
        marquee.update(Position::new(50.0, 50.0), &wf, &config, &mut selection);
        assert_eq!(marquee.end(&mut selection), MarqueeEnd::Selected(2));
    }

    #[test]
    fn click_without_movement_is_reported() {
        let mut selection = SelectionCoordinator::new();
        let ev = PointerEvent::new(0.0, 0.0, Modifiers::NONE, 0.0);
        let marquee = Marquee::start(&ev, Position::ORIGIN, &selection).expect("unmarked");
        assert_eq!(
            marquee.end(&mut selection),
            MarqueeEnd::Click { additive: false }
        );
        assert!(!selection.is_previewing());
    }
}
