//! Selection coordination.
//!
//! Keeps two selection sets: the committed one that listeners (side panel,
//! toolbar) observe, and a preview set that follows the pointer while a
//! gesture is in progress. Preview changes only become visible to listeners
//! on [`SelectionCoordinator::commit_selection_preview`].
//!
//! Clearing a selection may need the user's consent (e.g. unsaved node
//! configuration). That is modelled as an explicit two-step request instead
//! of an awaited prompt: [`SelectionCoordinator::try_clear_selection`] either
//! clears right away or reports that confirmation is needed, and the caller
//! resumes with [`SelectionCoordinator::resolve_clear`].

use std::collections::BTreeSet;
use wf_core::id::NodeId;
use wf_core::model::ObjectRef;

/// Which set an operation reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// The gesture-local preview (falls back to committed when no preview
    /// is running).
    Preview,
    Committed,
}

/// Result of [`SelectionCoordinator::try_clear_selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    /// The user has to confirm first; nothing was changed.
    NeedsConfirmation,
}

/// Result of [`SelectionCoordinator::resolve_clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearResult {
    pub was_aborted: bool,
}

/// Read-only view of a selection set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSnapshot {
    pub selected_objects: Vec<ObjectRef>,
    pub selected_node_ids: Vec<NodeId>,
    pub single_selected_object: Option<ObjectRef>,
    pub is_selection_empty: bool,
}

impl SelectionSnapshot {
    fn of(set: &BTreeSet<ObjectRef>) -> Self {
        let selected_objects: Vec<ObjectRef> = set.iter().copied().collect();
        let selected_node_ids = set.iter().filter_map(ObjectRef::as_node).collect();
        let single_selected_object = match selected_objects.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        Self {
            is_selection_empty: selected_objects.is_empty(),
            selected_objects,
            selected_node_ids,
            single_selected_object,
        }
    }

    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.selected_objects.contains(object)
    }
}

#[derive(Debug, Default)]
pub struct SelectionCoordinator {
    committed: BTreeSet<ObjectRef>,
    preview: Option<BTreeSet<ObjectRef>>,
    focus: Option<ObjectRef>,
    /// Unsaved edits that would be lost when the selection changes.
    has_unsaved_changes: bool,
    pending_clear: bool,
    revision: u64,
}

impl SelectionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn query_selection(&self, mode: SelectionMode) -> SelectionSnapshot {
        SelectionSnapshot::of(self.set(mode))
    }

    pub fn is_object_selected(&self, object: &ObjectRef, mode: SelectionMode) -> bool {
        self.set(mode).contains(object)
    }

    pub fn is_previewing(&self) -> bool {
        self.preview.is_some()
    }

    /// Number of times listeners were notified.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn set(&self, mode: SelectionMode) -> &BTreeSet<ObjectRef> {
        match (mode, &self.preview) {
            (SelectionMode::Preview, Some(preview)) => preview,
            _ => &self.committed,
        }
    }

    fn set_mut(&mut self, mode: SelectionMode) -> &mut BTreeSet<ObjectRef> {
        match mode {
            SelectionMode::Preview => self
                .preview
                .get_or_insert_with(|| self.committed.clone()),
            SelectionMode::Committed => &mut self.committed,
        }
    }

    fn notify(&mut self) {
        self.revision += 1;
        log::trace!("selection changed (revision {})", self.revision);
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    pub fn select(&mut self, objects: &[ObjectRef], mode: SelectionMode) {
        self.set_mut(mode).extend(objects.iter().copied());
        if mode == SelectionMode::Committed {
            self.notify();
        }
    }

    pub fn deselect(&mut self, objects: &[ObjectRef], mode: SelectionMode) {
        let set = self.set_mut(mode);
        for object in objects {
            set.remove(object);
        }
        if self.focus.as_ref().is_some_and(|f| objects.contains(f)) {
            self.focus = None;
        }
        if mode == SelectionMode::Committed {
            self.notify();
        }
    }

    /// Deselect everything except `except`.
    pub fn deselect_all(&mut self, except: &[ObjectRef], mode: SelectionMode) {
        self.set_mut(mode).retain(|o| except.contains(o));
        if self.focus.as_ref().is_some_and(|f| !except.contains(f)) {
            self.focus = None;
        }
        if mode == SelectionMode::Committed {
            self.notify();
        }
    }

    /// Replace the committed selection with the preview and notify listeners,
    /// even when the contents didn't change.
    pub fn commit_selection_preview(&mut self) {
        if let Some(preview) = self.preview.take() {
            self.committed = preview;
        }
        self.notify();
    }

    /// Drop the preview without committing it.
    pub fn discard_selection_preview(&mut self) {
        self.preview = None;
    }

    // ─── Clearing with consent ───────────────────────────────────────────

    pub fn set_has_unsaved_changes(&mut self, unsaved: bool) {
        self.has_unsaved_changes = unsaved;
    }

    pub fn can_clear_current_selection(&self) -> bool {
        !self.has_unsaved_changes || self.committed.is_empty()
    }

    pub fn has_pending_clear(&self) -> bool {
        self.pending_clear
    }

    pub fn try_clear_selection(&mut self) -> ClearOutcome {
        if self.can_clear_current_selection() {
            self.deselect_all(&[], SelectionMode::Committed);
            return ClearOutcome::Cleared;
        }
        self.pending_clear = true;
        ClearOutcome::NeedsConfirmation
    }

    /// Finish a clear that needed confirmation. Confirming discards the
    /// unsaved changes.
    pub fn resolve_clear(&mut self, confirmed: bool) -> ClearResult {
        if !self.pending_clear {
            log::warn!("resolve_clear without a pending clear request");
        }
        self.pending_clear = false;
        if confirmed {
            self.has_unsaved_changes = false;
            self.deselect_all(&[], SelectionMode::Committed);
        }
        ClearResult {
            was_aborted: !confirmed,
        }
    }

    // ─── Keyboard focus ──────────────────────────────────────────────────

    pub fn focus(&self) -> Option<ObjectRef> {
        self.focus
    }

    pub fn set_focus(&mut self, object: Option<ObjectRef>) {
        self.focus = object;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wf_core::id::AnnotationId;

    fn node(id: &str) -> ObjectRef {
        ObjectRef::Node(NodeId::intern(id))
    }

    #[test]
    fn preview_is_invisible_until_committed() {
        let mut sel = SelectionCoordinator::new();
        sel.select(&[node("a")], SelectionMode::Preview);
        assert!(sel.is_object_selected(&node("a"), SelectionMode::Preview));
        assert!(!sel.is_object_selected(&node("a"), SelectionMode::Committed));

        let before = sel.revision();
        sel.commit_selection_preview();
        assert!(sel.is_object_selected(&node("a"), SelectionMode::Committed));
        assert_eq!(sel.revision(), before + 1);
        assert!(!sel.is_previewing());
    }

    #[test]
    fn commit_notifies_even_without_changes() {
        let mut sel = SelectionCoordinator::new();
        sel.select(&[node("a")], SelectionMode::Committed);
        let before = sel.revision();
        sel.select(&[node("a")], SelectionMode::Preview);
        sel.commit_selection_preview();
        assert_eq!(sel.revision(), before + 1);
    }

    #[test]
    fn snapshot_reports_single_object_and_nodes() {
        let mut sel = SelectionCoordinator::new();
        let annotation = ObjectRef::Annotation(AnnotationId::intern("a1"));
        sel.select(&[annotation], SelectionMode::Committed);
        let snap = sel.query_selection(SelectionMode::Committed);
        assert_eq!(snap.single_selected_object, Some(annotation));
        assert!(snap.selected_node_ids.is_empty());

        sel.select(&[node("n1")], SelectionMode::Committed);
        let snap = sel.query_selection(SelectionMode::Committed);
        assert_eq!(snap.single_selected_object, None);
        assert_eq!(snap.selected_node_ids, vec![NodeId::intern("n1")]);
        assert!(!snap.is_selection_empty);
    }

    #[test]
    fn deselect_all_keeps_exceptions() {
        let mut sel = SelectionCoordinator::new();
        sel.select(&[node("a"), node("b"), node("c")], SelectionMode::Committed);
        sel.set_focus(Some(node("a")));
        sel.deselect_all(&[node("b")], SelectionMode::Committed);
        let snap = sel.query_selection(SelectionMode::Committed);
        assert_eq!(snap.selected_objects, vec![node("b")]);
        assert_eq!(sel.focus(), None);
    }

    #[test]
    fn clear_needs_confirmation_with_unsaved_changes() {
        let mut sel = SelectionCoordinator::new();
        sel.select(&[node("a")], SelectionMode::Committed);
        sel.set_has_unsaved_changes(true);
        assert!(!sel.can_clear_current_selection());
        assert_eq!(sel.try_clear_selection(), ClearOutcome::NeedsConfirmation);
        assert!(sel.has_pending_clear());
        assert!(sel.is_object_selected(&node("a"), SelectionMode::Committed));

        let result = sel.resolve_clear(false);
        assert!(result.was_aborted);
        assert!(sel.is_object_selected(&node("a"), SelectionMode::Committed));

        assert_eq!(sel.try_clear_selection(), ClearOutcome::NeedsConfirmation);
        let result = sel.resolve_clear(true);
        assert!(!result.was_aborted);
        assert!(sel.query_selection(SelectionMode::Committed).is_selection_empty);
        assert!(sel.can_clear_current_selection());
    }
}
