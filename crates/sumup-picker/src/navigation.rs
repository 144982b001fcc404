//! Hierarchy levels visited while drilling into organizations

use crate::record::{MembershipRecord, ParentRef};

/// Identity of a navigation level, unique for the lifetime of a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(pub u64);

/// Monotonically increasing fetch sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// One node on the path from the root to the displayed list
#[derive(Debug, Clone)]
pub struct NavigationLevel {
    id: LevelId,
    parent: Option<ParentRef>,
    /// Unfiltered listing of this level
    items: Vec<MembershipRecord>,
    /// Search results for this level, shown instead of `items` when present
    filtered: Option<Vec<MembershipRecord>>,
    /// Latest listing request issued for this level and still outstanding
    pub(crate) pending_listing: Option<RequestId>,
    /// Latest search request issued for this level and still outstanding
    pub(crate) pending_search: Option<RequestId>,
}

impl NavigationLevel {
    fn new(id: LevelId, parent: Option<ParentRef>, items: Vec<MembershipRecord>) -> Self {
        Self {
            id,
            parent,
            items,
            filtered: None,
            pending_listing: None,
            pending_search: None,
        }
    }

    pub fn id(&self) -> LevelId {
        self.id
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.name.as_str())
    }

    pub fn items(&self) -> &[MembershipRecord] {
        &self.items
    }

    pub fn filtered(&self) -> Option<&[MembershipRecord]> {
        self.filtered.as_deref()
    }

    /// Items currently on screen for this level
    pub fn displayed(&self) -> &[MembershipRecord] {
        self.filtered.as_deref().unwrap_or(&self.items)
    }

    /// Whether a fetch for this level is outstanding
    pub fn is_loading(&self) -> bool {
        self.pending_listing.is_some() || self.pending_search.is_some()
    }

    pub(crate) fn replace_items(&mut self, items: Vec<MembershipRecord>) {
        self.items = items;
    }

    pub(crate) fn set_filtered(&mut self, items: Vec<MembershipRecord>) {
        self.filtered = Some(items);
    }

    /// Drop search results and forget the outstanding search request
    pub(crate) fn clear_filter(&mut self) {
        self.filtered = None;
        self.pending_search = None;
    }
}

/// Back history plus exactly one current level
#[derive(Debug, Clone)]
pub struct NavigationStack {
    history: Vec<NavigationLevel>,
    current: NavigationLevel,
    next_level_id: u64,
}

impl NavigationStack {
    /// Stack positioned at the root with an already fetched listing
    pub fn new(root_items: Vec<MembershipRecord>) -> Self {
        Self {
            history: Vec::new(),
            current: NavigationLevel::new(LevelId(0), None, root_items),
            next_level_id: 1,
        }
    }

    pub fn current(&self) -> &NavigationLevel {
        &self.current
    }

    pub(crate) fn current_mut(&mut self) -> &mut NavigationLevel {
        &mut self.current
    }

    /// Number of levels behind the current one
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Parent names from the root down to the current level
    pub fn breadcrumb(&self) -> Vec<&str> {
        self.history
            .iter()
            .chain(std::iter::once(&self.current))
            .filter_map(NavigationLevel::parent_name)
            .collect()
    }

    pub fn displayed(&self) -> &[MembershipRecord] {
        self.current.displayed()
    }

    /// Drill down: the current level moves into history and an empty level
    /// scoped to `parent` becomes current.
    pub fn push(&mut self, parent: ParentRef) -> LevelId {
        let id = LevelId(self.next_level_id);
        self.next_level_id += 1;

        let mut previous =
            std::mem::replace(&mut self.current, NavigationLevel::new(id, Some(parent), Vec::new()));
        previous.clear_filter();
        self.history.push(previous);
        id
    }

    /// Back out to the previous level, restoring its stored items as they were.
    /// Returns false when already at the root.
    pub fn pop(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.current = previous;
        true
    }

    pub fn replace_current_items(&mut self, items: Vec<MembershipRecord>) {
        self.current.replace_items(items);
    }

    /// Live level with the given id, current or in history
    pub(crate) fn level_mut(&mut self, id: LevelId) -> Option<&mut NavigationLevel> {
        if self.current.id == id {
            return Some(&mut self.current);
        }
        self.history.iter_mut().find(|level| level.id == id)
    }
}
