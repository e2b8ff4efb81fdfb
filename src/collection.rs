//! Diffable collections.
//!
//! [`Section`] groups identity-bearing items behind a [`Binding`], and
//! [`Reconciler`] keeps a live native list/grid view synchronized with a
//! `Binding<Vec<Section>>` by translating diffs into minimal batched
//! insert/delete/reload operations instead of full reloads. A view that is
//! not attached to a window falls back to one unconditional full reload;
//! incremental update APIs misbehave on views that were never laid out.

use core::fmt;
use std::collections::HashMap;
use std::rc::Rc;
use std::cell::RefCell;

use uuid::Uuid;

use crate::binding::Binding;
use crate::cancel::DisposeBag;
use crate::diagnostics::{default_diagnostics, Diagnostics};
use crate::diff::Diff;
use crate::identity::{distinct_by_id, AnyItem, Eid, Identifiable};
use crate::view::ViewNode;

/// A row position inside a sectioned collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    pub fn new(section: usize, row: usize) -> IndexPath {
        IndexPath { section, row }
    }
}

/// One batched row transaction, applied delete-then-insert so index paths
/// stay valid after the delete phase.
#[derive(Debug, Clone, PartialEq)]
pub struct TableUpdate {
    pub deleted: Vec<IndexPath>,
    pub inserted: Vec<IndexPath>,
}

impl TableUpdate {
    pub fn has_updates(&self) -> bool {
        !self.deleted.is_empty() || !self.inserted.is_empty()
    }
}

/// An identity-bearing group of items with optional header/footer views.
///
/// The item list is itself a binding; items are de-duplicated by identity
/// on the way in (first occurrence wins, with a diagnostics warning), so
/// the diff engine only ever sees duplicate-free input.
#[derive(Clone)]
pub struct Section {
    id: String,
    header: Option<ViewNode>,
    footer: Option<ViewNode>,
    items: Binding<Vec<AnyItem>>,
    content: Rc<dyn Fn(&AnyItem) -> Option<ViewNode>>,
}

impl Section {
    /// Creates a section over a bound item list with a per-item content
    /// builder. The section gets a generated id.
    pub fn new<T, F>(data: Binding<Vec<T>>, content: F) -> Section
    where
        T: Identifiable + Clone + 'static,
        F: Fn(&T) -> ViewNode + 'static,
    {
        Section::with_diagnostics(default_diagnostics(), data, content)
    }

    /// As [`new`](Section::new), with an explicit diagnostics sink for the
    /// duplicate-identity warning.
    pub fn with_diagnostics<T, F>(
        diagnostics: Rc<dyn Diagnostics>,
        data: Binding<Vec<T>>,
        content: F,
    ) -> Section
    where
        T: Identifiable + Clone + 'static,
        F: Fn(&T) -> ViewNode + 'static,
    {
        let unique = data.map(move |items: &Vec<T>| {
            let unique = distinct_by_id(items);
            if unique.len() != items.len() {
                diagnostics.warning(
                    "Section",
                    "duplicate identities in items update; only unique items will be displayed",
                );
            }
            unique
        });
        let items = unique.map(|items: &Vec<T>| {
            items
                .iter()
                .cloned()
                .map(AnyItem::new)
                .collect::<Vec<AnyItem>>()
        });
        Section {
            id: Uuid::new_v4().to_string(),
            header: None,
            footer: None,
            items,
            content: Rc::new(move |item: &AnyItem| item.downcast_ref::<T>().map(|t| content(t))),
        }
    }

    /// Creates a section over a fixed item list.
    pub fn from_items<T, F>(data: Vec<T>, content: F) -> Section
    where
        T: Identifiable + Clone + 'static,
        F: Fn(&T) -> ViewNode + 'static,
    {
        Section::new(Binding::create(data), content)
    }

    /// Creates a section from a static list of views, each auto-keyed.
    pub fn from_views(views: Vec<ViewNode>) -> Section {
        let ids: Vec<Eid> = views
            .iter()
            .map(|_| Eid::new(Uuid::new_v4().to_string()))
            .collect();
        let lookup = ids.clone();
        Section::new(Binding::create(ids), move |item: &Eid| {
            lookup
                .iter()
                .position(|eid| eid.id == item.id)
                .and_then(|index| views.get(index).cloned())
                .unwrap_or_else(ViewNode::empty)
        })
    }

    /// Replaces the generated id with a stable one.
    pub fn with_id(mut self, id: impl Into<String>) -> Section {
        self.id = id.into();
        self
    }

    pub fn header(mut self, header: ViewNode) -> Section {
        self.header = Some(header);
        self
    }

    pub fn footer(mut self, footer: ViewNode) -> Section {
        self.footer = Some(footer);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header_view(&self) -> Option<&ViewNode> {
        self.header.as_ref()
    }

    pub fn footer_view(&self) -> Option<&ViewNode> {
        self.footer.as_ref()
    }

    /// The de-duplicated, type-erased item list.
    pub fn items(&self) -> &Binding<Vec<AnyItem>> {
        &self.items
    }

    /// Builds the row view for an item, if the item's concrete type matches
    /// this section's builder.
    pub fn view_for_item(&self, item: &AnyItem) -> Option<ViewNode> {
        (self.content)(item)
    }
}

impl PartialEq for Section {
    fn eq(&self, other: &Section) -> bool {
        self.id == other.id
    }
}

impl Identifiable for Section {
    fn id(&self) -> String {
        self.id.clone()
    }
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Section")
            .field("id", &self.id)
            .field("header", &self.header.is_some())
            .field("footer", &self.footer.is_some())
            .finish()
    }
}

/// The live native list/grid view contract consumed by the reconciler.
///
/// Each update method is one batched transaction; the delete phase precedes
/// the insert phase inside it.
pub trait CollectionHost {
    /// Whether the view is in a window and responsive to incremental
    /// updates.
    fn is_attached(&self) -> bool;

    /// Deletes, inserts, and reloads whole sections in one transaction.
    fn update_sections(&mut self, deleted: &[usize], inserted: &[usize], reloaded: &[usize]);

    /// Deletes and inserts rows in one transaction.
    fn update_rows(&mut self, deleted: &[IndexPath], inserted: &[IndexPath]);

    /// Unconditional full reload.
    fn reload_all(&mut self);
}

struct ReconcilerState<H> {
    host: H,
    sections: Vec<Section>,
    /// Snapshot of each section's items at the last applied update, keyed
    /// by section id.
    items: HashMap<String, Vec<AnyItem>>,
    /// Subscriptions to the current sections' item bindings.
    updates_bag: DisposeBag,
    /// Subscription to the section-list binding itself.
    sections_bag: DisposeBag,
    diagnostics: Rc<dyn Diagnostics>,
}

/// Keeps a [`CollectionHost`] synchronized with a `Binding<Vec<Section>>`.
pub struct Reconciler<H: CollectionHost> {
    state: Rc<RefCell<ReconcilerState<H>>>,
}

impl<H: CollectionHost> Clone for Reconciler<H> {
    fn clone(&self) -> Reconciler<H> {
        Reconciler {
            state: Rc::clone(&self.state),
        }
    }
}

impl<H: CollectionHost + 'static> Reconciler<H> {
    pub fn new(host: H, diagnostics: Rc<dyn Diagnostics>) -> Reconciler<H> {
        Reconciler {
            state: Rc::new(RefCell::new(ReconcilerState {
                host,
                sections: Vec::new(),
                items: HashMap::new(),
                updates_bag: DisposeBag::new(),
                sections_bag: DisposeBag::new(),
                diagnostics,
            })),
        }
    }

    /// Subscribes to the section list and applies its current value.
    pub fn attach(&self, sections: &Binding<Vec<Section>>) {
        let weak = Rc::downgrade(&self.state);
        let subscription = sections.bind(move |new_sections: &Vec<Section>| {
            if let Some(state) = weak.upgrade() {
                Reconciler { state }.reload(new_sections.clone());
            }
        });
        self.state.borrow_mut().sections_bag.insert(subscription);
        self.reload(sections.value().unwrap_or_default());
    }

    /// Applies a new section list.
    pub fn reload(&self, sections: Vec<Section>) {
        let diagnostics = self.state.borrow().diagnostics.clone();
        let unique = distinct_by_id(&sections);
        if unique.len() != sections.len() {
            diagnostics.warning(
                "Reconciler",
                "duplicate identities in sections update; only unique sections will be displayed",
            );
        }

        let old_sections = self.state.borrow().sections.clone();
        let diff = Diff::new(&old_sections, &unique);

        let old_items = {
            let mut state = self.state.borrow_mut();
            let old_items = std::mem::take(&mut state.items);
            state.sections = unique.clone();
            for section in &unique {
                state.items.insert(
                    section.id().to_string(),
                    section.items().value().unwrap_or_default(),
                );
            }
            old_items
        };

        let attached = self.state.borrow().host.is_attached();
        if attached {
            if diff.has_updates() {
                let deleted: Vec<usize> = diff.deleted.iter().map(|(index, _)| *index).collect();
                let inserted: Vec<usize> = diff.inserted.iter().map(|(index, _)| *index).collect();
                let common: Vec<usize> = diff.common.iter().map(|(index, _)| *index).collect();
                // Common sections are reloaded conservatively; their
                // header/footer descriptors may have changed identity.
                self.state
                    .borrow_mut()
                    .host
                    .update_sections(&deleted, &inserted, &common);
            } else {
                for (index, section) in unique.iter().enumerate() {
                    let old = old_items.get(section.id()).cloned().unwrap_or_default();
                    let new = section.items().value().unwrap_or_default();
                    self.update_rows(&old, &new, index);
                }
            }
        } else {
            self.state.borrow_mut().host.reload_all();
        }

        self.bind_section_updates();
    }

    /// Re-subscribes to every current section's item binding, dropping
    /// subscriptions to sections no longer present so stale sections
    /// neither leak nor act.
    fn bind_section_updates(&self) {
        self.state.borrow_mut().updates_bag.cancel_all();

        let sections = self.state.borrow().sections.clone();
        for section in sections {
            let weak = Rc::downgrade(&self.state);
            let section_id = section.id().to_string();
            let subscription = section.items().bind(move |new_items: &Vec<AnyItem>| {
                let state = match weak.upgrade() {
                    Some(state) => state,
                    None => return,
                };
                let (old, index) = {
                    let mut state = state.borrow_mut();
                    let index = match state.sections.iter().position(|s| s.id() == section_id) {
                        Some(index) => index,
                        None => return,
                    };
                    let old = state
                        .items
                        .insert(section_id.clone(), new_items.clone())
                        .unwrap_or_default();
                    (old, index)
                };
                Reconciler { state }.update_rows(&old, new_items, index);
            });
            self.state.borrow_mut().updates_bag.insert(subscription);
        }
    }

    fn update_rows(&self, old: &[AnyItem], new: &[AnyItem], section: usize) {
        let updates = calculate_updates(old, new, section);
        if !updates.has_updates() {
            return;
        }
        let mut state = self.state.borrow_mut();
        if state.host.is_attached() {
            state.host.update_rows(&updates.deleted, &updates.inserted);
        } else {
            state.host.reload_all();
        }
    }

    pub fn section_count(&self) -> usize {
        self.state.borrow().sections.len()
    }

    pub fn row_count(&self, section: usize) -> usize {
        let state = self.state.borrow();
        state
            .sections
            .get(section)
            .and_then(|s| state.items.get(s.id()))
            .map_or(0, |items| items.len())
    }

    /// Builds the row view at `path`. Called once per newly materialized
    /// row; structurally common rows are never rebuilt.
    pub fn view_for(&self, path: IndexPath) -> Option<ViewNode> {
        let (section, item) = {
            let state = self.state.borrow();
            let section = state.sections.get(path.section)?.clone();
            let item = state.items.get(section.id())?.get(path.row)?.clone();
            (section, item)
        };
        section.view_for_item(&item)
    }

    pub fn header_for(&self, section: usize) -> Option<ViewNode> {
        let state = self.state.borrow();
        state.sections.get(section)?.header_view().cloned()
    }

    pub fn footer_for(&self, section: usize) -> Option<ViewNode> {
        let state = self.state.borrow();
        state.sections.get(section)?.footer_view().cloned()
    }

    /// Access to the underlying host, mainly for tests and adapters.
    pub fn with_host<R, F: FnOnce(&mut H) -> R>(&self, f: F) -> R {
        f(&mut self.state.borrow_mut().host)
    }
}

/// Translates an item diff into section-scoped index paths.
fn calculate_updates(old: &[AnyItem], new: &[AnyItem], section: usize) -> TableUpdate {
    let old_ids: Vec<Eid> = old.iter().map(|item| Eid::new(item.id())).collect();
    let new_ids: Vec<Eid> = new.iter().map(|item| Eid::new(item.id())).collect();
    let diff = Diff::new(&old_ids, &new_ids);
    TableUpdate {
        deleted: diff
            .deleted
            .iter()
            .map(|(row, _)| IndexPath::new(section, *row))
            .collect(),
        inserted: diff
            .inserted
            .iter()
            .map(|(row, _)| IndexPath::new(section, *row))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::testing::RecordingDiagnostics;
    use crate::views::Text;
    use crate::view::IntoViewNode;

    #[derive(Debug, Clone, PartialEq)]
    enum HostOp {
        Sections {
            deleted: Vec<usize>,
            inserted: Vec<usize>,
            reloaded: Vec<usize>,
        },
        Rows {
            deleted: Vec<IndexPath>,
            inserted: Vec<IndexPath>,
        },
        ReloadAll,
    }

    #[derive(Clone)]
    struct MockHost {
        attached: Rc<Cell<bool>>,
        ops: Rc<RefCell<Vec<HostOp>>>,
    }

    use std::cell::Cell;

    impl MockHost {
        fn new(attached: bool) -> MockHost {
            MockHost {
                attached: Rc::new(Cell::new(attached)),
                ops: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn ops(&self) -> Vec<HostOp> {
            self.ops.borrow().clone()
        }

        fn clear(&self) {
            self.ops.borrow_mut().clear();
        }
    }

    impl CollectionHost for MockHost {
        fn is_attached(&self) -> bool {
            self.attached.get()
        }

        fn update_sections(&mut self, deleted: &[usize], inserted: &[usize], reloaded: &[usize]) {
            self.ops.borrow_mut().push(HostOp::Sections {
                deleted: deleted.to_vec(),
                inserted: inserted.to_vec(),
                reloaded: reloaded.to_vec(),
            });
        }

        fn update_rows(&mut self, deleted: &[IndexPath], inserted: &[IndexPath]) {
            self.ops.borrow_mut().push(HostOp::Rows {
                deleted: deleted.to_vec(),
                inserted: inserted.to_vec(),
            });
        }

        fn reload_all(&mut self) {
            self.ops.borrow_mut().push(HostOp::ReloadAll);
        }
    }

    fn eids(ids: &[&str]) -> Vec<Eid> {
        ids.iter().map(|id| Eid::new(*id)).collect()
    }

    fn row(item: &Eid) -> ViewNode {
        Text::new(item.id.clone()).into_node()
    }

    fn quiet() -> Rc<dyn Diagnostics> {
        Rc::new(crate::diagnostics::NullDiagnostics)
    }

    #[test]
    fn item_update_issues_minimal_row_batch() {
        let items = Binding::create(eids(&["A", "B", "C"]));
        let section = Section::new(items.clone(), row).with_id("s0");
        let sections = Binding::create(vec![section]);

        let host = MockHost::new(true);
        let reconciler = Reconciler::new(host.clone(), quiet());
        reconciler.attach(&sections);
        host.clear();

        items.update(eids(&["A", "C", "D"]));

        assert_eq!(
            host.ops(),
            vec![HostOp::Rows {
                deleted: vec![IndexPath::new(0, 1)],
                inserted: vec![IndexPath::new(0, 2)],
            }],
            "B deleted at row 1, D inserted at row 2; A and C untouched"
        );
        assert_eq!(reconciler.row_count(0), 3);
    }

    #[test]
    fn pure_reorder_issues_nothing() {
        let items = Binding::create(eids(&["A", "B", "C"]));
        let sections = Binding::create(vec![Section::new(items.clone(), row).with_id("s0")]);

        let host = MockHost::new(true);
        Reconciler::new(host.clone(), quiet()).attach(&sections);
        host.clear();

        items.update(eids(&["C", "A", "B"]));
        assert_eq!(host.ops(), vec![], "moves are not detected as updates");
    }

    #[test]
    fn section_change_issues_batched_section_update() {
        let first = Section::from_items(eids(&["A"]), row).with_id("first");
        let second = Section::from_items(eids(&["B"]), row).with_id("second");
        let third = Section::from_items(eids(&["C"]), row).with_id("third");

        let sections = Binding::create(vec![first.clone(), second]);
        let host = MockHost::new(true);
        Reconciler::new(host.clone(), quiet()).attach(&sections);
        host.clear();

        // second is removed, third appears; first stays and is reloaded.
        sections.update(vec![first, third]);

        assert_eq!(
            host.ops(),
            vec![HostOp::Sections {
                deleted: vec![1],
                inserted: vec![1],
                reloaded: vec![0],
            }]
        );
    }

    #[test]
    fn unattached_view_falls_back_to_full_reload() {
        let items = Binding::create(eids(&["A", "B"]));
        let sections = Binding::create(vec![Section::new(items.clone(), row).with_id("s0")]);

        let host = MockHost::new(false);
        Reconciler::new(host.clone(), quiet()).attach(&sections);
        assert_eq!(host.ops(), vec![HostOp::ReloadAll], "initial attach");
        host.clear();

        items.update(eids(&["A", "B", "C"]));
        assert_eq!(host.ops(), vec![HostOp::ReloadAll]);
    }

    #[test]
    fn duplicate_sections_are_deduplicated_with_warning() {
        let section = Section::from_items(eids(&["A"]), row).with_id("dup");
        let sections = Binding::create(vec![section.clone(), section]);

        let diagnostics = Rc::new(RecordingDiagnostics::default());
        let host = MockHost::new(true);
        let reconciler = Reconciler::new(host.clone(), diagnostics.clone());
        reconciler.attach(&sections);

        assert_eq!(reconciler.section_count(), 1);
        assert_eq!(diagnostics.warnings.borrow().len(), 1);
    }

    #[test]
    fn duplicate_items_are_deduplicated_with_warning() {
        let diagnostics = Rc::new(RecordingDiagnostics::default());
        let items = Binding::create(eids(&["A", "A", "B"]));
        let section =
            Section::with_diagnostics(diagnostics.clone(), items, row).with_id("s0");

        assert_eq!(section.items().value().unwrap().len(), 2);
        assert_eq!(diagnostics.warnings.borrow().len(), 1);
    }

    #[test]
    fn stale_section_updates_are_inert_after_replacement() {
        let old_items = Binding::create(eids(&["A"]));
        let old_section = Section::new(old_items.clone(), row).with_id("old");
        let new_section = Section::from_items(eids(&["B"]), row).with_id("new");

        let sections = Binding::create(vec![old_section]);
        let host = MockHost::new(true);
        Reconciler::new(host.clone(), quiet()).attach(&sections);

        sections.update(vec![new_section]);
        host.clear();

        // The replaced section's binding still fires, but its subscription
        // was cancelled and its id is gone from the section list.
        old_items.update(eids(&["A", "X"]));
        assert_eq!(host.ops(), vec![]);
    }

    #[test]
    fn item_changes_in_two_sections_apply_per_section() {
        let left_items = Binding::create(eids(&["A"]));
        let right_items = Binding::create(eids(&["B"]));
        let sections = Binding::create(vec![
            Section::new(left_items.clone(), row).with_id("left"),
            Section::new(right_items.clone(), row).with_id("right"),
        ]);

        let host = MockHost::new(true);
        Reconciler::new(host.clone(), quiet()).attach(&sections);
        host.clear();

        right_items.update(eids(&["B", "C"]));
        assert_eq!(
            host.ops(),
            vec![HostOp::Rows {
                deleted: vec![],
                inserted: vec![IndexPath::new(1, 1)],
            }]
        );
    }

    #[test]
    fn view_for_builds_row_content_once_per_request() {
        let items = Binding::create(eids(&["A", "B"]));
        let sections = Binding::create(vec![Section::new(items, row).with_id("s0")]);

        let host = MockHost::new(true);
        let reconciler = Reconciler::new(host, quiet());
        reconciler.attach(&sections);

        assert!(reconciler.view_for(IndexPath::new(0, 1)).is_some());
        assert!(reconciler.view_for(IndexPath::new(0, 9)).is_none());
        assert!(reconciler.view_for(IndexPath::new(3, 0)).is_none());
    }

    #[test]
    fn header_and_footer_accessors() {
        let section = Section::from_items(eids(&["A"]), row)
            .with_id("s0")
            .header(Text::new("Header").into_node())
            .footer(Text::new("Footer").into_node());
        let sections = Binding::create(vec![section]);

        let reconciler = Reconciler::new(MockHost::new(true), quiet());
        reconciler.attach(&sections);

        assert!(reconciler.header_for(0).is_some());
        assert!(reconciler.footer_for(0).is_some());
        assert!(reconciler.header_for(1).is_none());
    }

    #[test]
    fn replacing_section_list_rebinds_new_items() {
        let new_items = Binding::create(eids(&["B"]));
        let sections = Binding::create(vec![Section::from_items(eids(&["A"]), row).with_id("a")]);

        let host = MockHost::new(true);
        Reconciler::new(host.clone(), quiet()).attach(&sections);

        sections.update(vec![Section::new(new_items.clone(), row).with_id("b")]);
        host.clear();

        new_items.update(eids(&["B", "C"]));
        assert_eq!(
            host.ops(),
            vec![HostOp::Rows {
                deleted: vec![],
                inserted: vec![IndexPath::new(0, 1)],
            }],
            "the new section's binding is live after re-subscription"
        );
    }
}
