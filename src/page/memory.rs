//! In-memory document.
//!
//! [`MemoryPage`] implements [`Page`] over a plain element tree. Every edit
//! made through its mutation methods is reported to registered watchers, the
//! way a browser's `MutationObserver` would see it. Activation is simulated:
//! `click()` and dispatched events run an optional handler installed with
//! [`MemoryPage::on_activate`], which is where a test decides how the "page"
//! reacts.
//!
//! # Example
//!
//! ```
//! use following_tab::page::{By, MemoryPage, NodeSpec, Page, Selector};
//!
//! # tokio_test::block_on(async {
//! let page = MemoryPage::new("https://x.com/home", None);
//! page.append(
//!     page.root(),
//!     NodeSpec::new("main").with_child(NodeSpec::new("div").with_role("tablist")),
//! )?;
//!
//! let lists = page.query_all(&Selector::new(By::role("tablist"))).await?;
//! assert_eq!(lists.len(), 1);
//! # Ok::<(), following_tab::Error>(())
//! # });
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::{NodeId, WatcherId};

use super::mutation::{MutationBatch, MutationFilter, MutationRecord, MutationWatcher};
use super::selector::{By, ElementView, Selector};
use super::{Page, ReadyState, SyntheticEvent};

// ============================================================================
// Types
// ============================================================================

/// How an element was activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationKind {
    /// `element.click()`.
    Invoke,
    /// `element.dispatchEvent(event)`.
    Dispatch(SyntheticEvent),
}

/// Page reaction to an activation. An `Err` is reported to the caller of
/// `click`/`dispatch_event`, like an exception thrown by a page handler.
pub type ActivationHandler =
    dyn Fn(&MemoryPage, NodeId, &ActivationKind) -> Result<()> + Send + Sync;

/// Declarative element subtree.
///
/// Deserializes from JSON fixtures:
///
/// ```json
/// { "tag": "div", "attributes": { "role": "tab" }, "children": [] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Tag name.
    pub tag: String,

    /// Attributes, `class` included.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Child elements in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Creates an element with no attributes or children.
    #[inline]
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Sets an attribute.
    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets the `role` attribute.
    #[inline]
    #[must_use]
    pub fn with_role(self, role: impl Into<String>) -> Self {
        self.with_attribute("role", role)
    }

    /// Appends a class to the `class` attribute.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        let list = self.attributes.entry("class".to_string()).or_default();
        if !list.is_empty() {
            list.push(' ');
        }
        list.push_str(class);
        self
    }

    /// Appends a child.
    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several children.
    #[inline]
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

// ============================================================================
// Tree
// ============================================================================

struct Node {
    tag: String,
    attributes: FxHashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl ElementView for Node {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

struct Tree {
    root: NodeId,
    nodes: FxHashMap<NodeId, Node>,
    detached: FxHashSet<NodeId>,
}

impl Tree {
    fn new(body: NodeSpec) -> Self {
        let mut tree = Self {
            root: NodeId::new(0),
            nodes: FxHashMap::default(),
            detached: FxHashSet::default(),
        };
        tree.root = tree.insert(None, body);
        tree
    }

    fn insert(&mut self, parent: Option<NodeId>, spec: NodeSpec) -> NodeId {
        let id = NodeId::next();
        let NodeSpec {
            tag,
            attributes,
            children,
        } = spec;

        self.nodes.insert(
            id,
            Node {
                tag: tag.to_ascii_lowercase(),
                attributes: attributes.into_iter().collect(),
                parent,
                children: Vec::new(),
            },
        );

        let child_ids: Vec<NodeId> = children
            .into_iter()
            .map(|child| self.insert(Some(id), child))
            .collect();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = child_ids;
        }
        id
    }

    fn missing(&self, id: NodeId) -> Error {
        if self.detached.contains(&id) {
            Error::stale_node(id)
        } else {
            Error::node_not_found(id)
        }
    }

    fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or_else(|| self.missing(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        if !self.nodes.contains_key(&id) {
            return Err(self.missing(id));
        }
        self.nodes.get_mut(&id).ok_or_else(|| Error::node_not_found(id))
    }

    /// Pre-order traversal from `start`.
    fn preorder(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                order.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    fn matches(&self, id: NodeId, steps: &[By]) -> bool {
        let Some((last, rest)) = steps.split_last() else {
            return true;
        };
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }

        let mut cursor = node.parent;
        while let Some(ancestor) = cursor {
            if self.matches(ancestor, rest) {
                return true;
            }
            cursor = self.nodes.get(&ancestor).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, id: NodeId) -> Result<Option<NodeId>> {
        let parent = self.get(id)?.parent;
        for descendant in self.preorder(id) {
            self.nodes.remove(&descendant);
            self.detached.insert(descendant);
        }
        if let Some(parent_id) = parent
            && let Some(parent_node) = self.nodes.get_mut(&parent_id)
        {
            parent_node.children.retain(|child| *child != id);
        }
        Ok(parent)
    }
}

// ============================================================================
// Watchers
// ============================================================================

struct WatcherEntry {
    filter: MutationFilter,
    sender: mpsc::UnboundedSender<MutationBatch>,
}

#[derive(Default)]
struct Counters {
    clicks: AtomicU64,
    dispatches: AtomicU64,
    queries: AtomicU64,
    observes: AtomicU64,
    disconnects: AtomicU64,
}

// ============================================================================
// MemoryPage
// ============================================================================

/// In-memory [`Page`].
pub struct MemoryPage {
    url: String,
    referrer: Option<String>,
    root: NodeId,
    tree: RwLock<Tree>,
    watchers: Mutex<FxHashMap<WatcherId, WatcherEntry>>,
    ready: watch::Sender<ReadyState>,
    handler: RwLock<Option<Arc<ActivationHandler>>>,
    observers_blocked: AtomicBool,
    counters: Counters,
}

impl fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPage")
            .field("url", &self.url)
            .field("referrer", &self.referrer)
            .field("nodes", &self.tree.read().nodes.len())
            .field("watchers", &self.watchers.lock().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// MemoryPage - Constructors
// ============================================================================

impl MemoryPage {
    /// Creates a parsed document with an empty `<body>`.
    ///
    /// An empty `referrer` is treated as absent, like `document.referrer`.
    #[must_use]
    pub fn new(url: impl Into<String>, referrer: Option<&str>) -> Self {
        Self::with_body(url, referrer, NodeSpec::new("body"))
    }

    /// Creates a parsed document with the given body subtree.
    #[must_use]
    pub fn with_body(url: impl Into<String>, referrer: Option<&str>, body: NodeSpec) -> Self {
        let tree = Tree::new(body);
        let (ready, _) = watch::channel(ReadyState::Complete);

        Self {
            url: url.into(),
            referrer: referrer.filter(|r| !r.is_empty()).map(str::to_string),
            root: tree.root,
            tree: RwLock::new(tree),
            watchers: Mutex::new(FxHashMap::default()),
            ready,
            handler: RwLock::new(None),
            observers_blocked: AtomicBool::new(false),
            counters: Counters::default(),
        }
    }

    /// Creates a document from a JSON [`NodeSpec`] describing the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the fixture does not parse.
    pub fn from_json(url: impl Into<String>, referrer: Option<&str>, json: &str) -> Result<Self> {
        let body: NodeSpec = serde_json::from_str(json)?;
        Ok(Self::with_body(url, referrer, body))
    }

    /// Sets the initial ready state.
    #[must_use]
    pub fn with_ready_state(self, state: ReadyState) -> Self {
        self.ready.send_replace(state);
        self
    }
}

// ============================================================================
// MemoryPage - Accessors
// ============================================================================

impl MemoryPage {
    /// Returns the body element.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of `click()` invocations.
    #[must_use]
    pub fn click_count(&self) -> u64 {
        self.counters.clicks.load(Ordering::SeqCst)
    }

    /// Number of dispatched events.
    #[must_use]
    pub fn dispatch_count(&self) -> u64 {
        self.counters.dispatches.load(Ordering::SeqCst)
    }

    /// Number of `query_all` calls.
    #[must_use]
    pub fn query_count(&self) -> u64 {
        self.counters.queries.load(Ordering::SeqCst)
    }

    /// Number of watchers ever attached.
    #[must_use]
    pub fn observe_count(&self) -> u64 {
        self.counters.observes.load(Ordering::SeqCst)
    }

    /// Number of successful disconnects.
    #[must_use]
    pub fn disconnect_count(&self) -> u64 {
        self.counters.disconnects.load(Ordering::SeqCst)
    }

    /// Number of currently attached watchers.
    #[must_use]
    pub fn active_watchers(&self) -> usize {
        self.watchers.lock().len()
    }

    /// Elements matching `selector`, in document order.
    #[must_use]
    pub fn nodes_matching(&self, selector: &Selector) -> Vec<NodeId> {
        let tree = self.tree.read();
        tree.preorder(tree.root)
            .into_iter()
            .filter(|id| tree.matches(*id, selector.steps()))
            .collect()
    }
}

// ============================================================================
// MemoryPage - Mutations
// ============================================================================

impl MemoryPage {
    /// Installs the page's reaction to `click()` and dispatched events.
    pub fn on_activate<F>(&self, handler: F)
    where
        F: Fn(&MemoryPage, NodeId, &ActivationKind) -> Result<()> + Send + Sync + 'static,
    {
        *self.handler.write() = Some(Arc::new(handler));
    }

    /// Makes later `observe` calls fail, like a page that blocks
    /// `MutationObserver`.
    pub fn block_observers(&self) {
        self.observers_blocked.store(true, Ordering::SeqCst);
    }

    /// Changes the ready state, waking `dom_content_loaded` waiters.
    pub fn set_ready_state(&self, state: ReadyState) {
        self.ready.send_replace(state);
    }

    /// Inserts a subtree as the last child of `parent`.
    ///
    /// Reported as one child-list record, however deep the subtree is.
    pub fn append(&self, parent: NodeId, spec: NodeSpec) -> Result<NodeId> {
        let id = {
            let mut tree = self.tree.write();
            tree.get(parent)?;
            let id = tree.insert(Some(parent), spec);
            tree.get_mut(parent)?.children.push(id);
            id
        };
        self.notify(MutationRecord::child_list(parent, vec![id], Vec::new()));
        Ok(id)
    }

    /// Detaches `node` and its subtree. Old handles become stale.
    pub fn remove(&self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(Error::config("cannot remove the document body"));
        }
        let parent = self.tree.write().detach(node)?;
        if let Some(parent) = parent {
            self.notify(MutationRecord::child_list(parent, Vec::new(), vec![node]));
        }
        Ok(())
    }

    /// Sets an attribute.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.tree
            .write()
            .get_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        self.notify(MutationRecord::attribute(node, name));
        Ok(())
    }

    /// Removes an attribute. Removing an absent attribute is not a change.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<()> {
        let removed = self
            .tree
            .write()
            .get_mut(node)?
            .attributes
            .remove(name)
            .is_some();
        if removed {
            self.notify(MutationRecord::attribute(node, name));
        }
        Ok(())
    }

    /// Adds a class to the class list.
    pub fn add_class(&self, node: NodeId, class: &str) -> Result<()> {
        let changed = {
            let mut tree = self.tree.write();
            let node_ref = tree.get_mut(node)?;
            if node_ref.has_class(class) {
                false
            } else {
                let list = node_ref.attributes.entry("class".to_string()).or_default();
                if !list.is_empty() {
                    list.push(' ');
                }
                list.push_str(class);
                true
            }
        };
        if changed {
            self.notify(MutationRecord::attribute(node, "class"));
        }
        Ok(())
    }

    /// Removes a class from the class list.
    pub fn remove_class(&self, node: NodeId, class: &str) -> Result<()> {
        let changed = {
            let mut tree = self.tree.write();
            let node_ref = tree.get_mut(node)?;
            match node_ref.attributes.get_mut("class") {
                Some(list) if list.split_ascii_whitespace().any(|c| c == class) => {
                    *list = list
                        .split_ascii_whitespace()
                        .filter(|c| *c != class)
                        .collect::<Vec<_>>()
                        .join(" ");
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.notify(MutationRecord::attribute(node, "class"));
        }
        Ok(())
    }

    fn notify(&self, record: MutationRecord) {
        let watchers = self.watchers.lock();
        for (id, entry) in watchers.iter() {
            if entry.filter.accepts(&record, self.root) {
                trace!(watcher = %id, target = %record.target, kind = ?record.kind, "Delivering mutation");
                let _ = entry.sender.send(vec![record.clone()]);
            }
        }
    }

    fn activate(&self, node: NodeId, kind: &ActivationKind) -> Result<()> {
        self.tree.read().get(node)?;
        let handler = self.handler.read().clone();
        match handler {
            Some(handler) => handler(self, node, kind),
            None => Ok(()),
        }
    }
}

// ============================================================================
// MemoryPage - Page
// ============================================================================

#[async_trait]
impl Page for MemoryPage {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn referrer(&self) -> Option<String> {
        self.referrer.clone()
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready.borrow()
    }

    async fn dom_content_loaded(&self) -> Result<()> {
        let mut rx = self.ready.subscribe();
        let parsed = rx.wait_for(|state| state.is_parsed()).await.is_ok();
        if parsed {
            Ok(())
        } else {
            Err(Error::ChannelClosed)
        }
    }

    async fn query_all(&self, selector: &Selector) -> Result<Vec<NodeId>> {
        self.counters.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.nodes_matching(selector))
    }

    async fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        Ok(self.tree.read().get(node)?.attributes.get(name).cloned())
    }

    async fn has_class(&self, node: NodeId, class: &str) -> Result<bool> {
        Ok(self.tree.read().get(node)?.has_class(class))
    }

    async fn closest(&self, node: NodeId, selector: &Selector) -> Result<Option<NodeId>> {
        let tree = self.tree.read();
        tree.get(node)?;
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if tree.matches(id, selector.steps()) {
                return Ok(Some(id));
            }
            cursor = tree.nodes.get(&id).and_then(|n| n.parent);
        }
        Ok(None)
    }

    async fn click(&self, node: NodeId) -> Result<()> {
        self.counters.clicks.fetch_add(1, Ordering::SeqCst);
        self.activate(node, &ActivationKind::Invoke)
    }

    async fn dispatch_event(&self, node: NodeId, event: &SyntheticEvent) -> Result<()> {
        self.counters.dispatches.fetch_add(1, Ordering::SeqCst);
        self.activate(node, &ActivationKind::Dispatch(event.clone()))
    }

    fn observe(&self, filter: &MutationFilter) -> Result<MutationWatcher> {
        if self.observers_blocked.load(Ordering::SeqCst) {
            return Err(Error::observer("MutationObserver unavailable"));
        }

        let id = WatcherId::next();
        let (sender, receiver) = mpsc::unbounded_channel();
        self.watchers.lock().insert(
            id,
            WatcherEntry {
                filter: filter.clone(),
                sender,
            },
        );
        self.counters.observes.fetch_add(1, Ordering::SeqCst);
        trace!(watcher = %id, "Watcher attached");
        Ok(MutationWatcher::new(id, receiver))
    }

    fn disconnect(&self, watcher: WatcherId) {
        if self.watchers.lock().remove(&watcher).is_some() {
            self.counters.disconnects.fetch_add(1, Ordering::SeqCst);
            trace!(watcher = %watcher, "Watcher detached");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tablist(tabs: usize) -> NodeSpec {
        NodeSpec::new("main").with_child(
            NodeSpec::new("div")
                .with_role("tablist")
                .with_children((0..tabs).map(|_| NodeSpec::new("div").with_role("tab"))),
        )
    }

    fn tab_selector() -> Selector {
        Selector::new(By::tag("main"))
            .descendant(By::role("tablist"))
            .descendant(By::role("tab"))
    }

    #[tokio::test]
    async fn test_query_all_document_order() {
        let page = MemoryPage::new("https://x.com/", None);
        page.append(page.root(), tablist(3)).expect("append");

        let tabs = page.query_all(&tab_selector()).await.expect("query");
        assert_eq!(tabs.len(), 3);
        assert!(tabs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(page.query_count(), 1);
    }

    #[tokio::test]
    async fn test_descendant_chain_requires_ancestors() {
        let page = MemoryPage::new("https://x.com/", None);
        page.append(
            page.root(),
            NodeSpec::new("div")
                .with_role("tablist")
                .with_child(NodeSpec::new("div").with_role("tab")),
        )
        .expect("append");

        assert!(page.query_all(&tab_selector()).await.expect("query").is_empty());
    }

    #[tokio::test]
    async fn test_removed_node_is_stale() {
        let page = MemoryPage::new("https://x.com/", None);
        let main = page.append(page.root(), tablist(2)).expect("append");
        let tab = page.nodes_matching(&tab_selector())[0];

        page.remove(main).expect("remove");

        let err = page.attribute(tab, "role").await.unwrap_err();
        assert!(matches!(err, Error::StaleNode { .. }));
        assert!(page.nodes_matching(&tab_selector()).is_empty());
    }

    #[tokio::test]
    async fn test_closest_includes_self() {
        let page = MemoryPage::new("https://x.com/", None);
        let wrapper = page
            .append(
                page.root(),
                NodeSpec::new("div")
                    .with_attribute("aria-selected", "true")
                    .with_child(NodeSpec::new("span")),
            )
            .expect("append");
        let span = page.nodes_matching(&Selector::new(By::tag("span")))[0];
        let selected = Selector::new(By::attribute_eq("aria-selected", "true"));

        assert_eq!(page.closest(span, &selected).await.expect("closest"), Some(wrapper));
        assert_eq!(page.closest(wrapper, &selected).await.expect("closest"), Some(wrapper));
        assert_eq!(
            page.closest(page.root(), &selected).await.expect("closest"),
            None
        );
    }

    #[tokio::test]
    async fn test_watcher_receives_filtered_mutations() {
        let page = MemoryPage::new("https://x.com/", None);
        let mut watcher = page
            .observe(&MutationFilter::selection_markers())
            .expect("observe");
        let node = page.append(page.root(), NodeSpec::new("div")).expect("append");
        page.set_attribute(node, "style", "color: red").expect("set");
        page.set_attribute(node, "aria-selected", "true").expect("set");

        let first = watcher.next_batch().await.expect("batch");
        assert_eq!(first[0].added, vec![node]);
        let second = watcher.next_batch().await.expect("batch");
        assert_eq!(second[0].attribute_name.as_deref(), Some("aria-selected"));
    }

    #[tokio::test]
    async fn test_disconnect_counts_once() {
        let page = MemoryPage::new("https://x.com/", None);
        let mut watcher = page
            .observe(&MutationFilter::selection_markers())
            .expect("observe");
        assert_eq!(page.active_watchers(), 1);

        page.disconnect(watcher.id());
        page.disconnect(watcher.id());

        assert_eq!(page.active_watchers(), 0);
        assert_eq!(page.disconnect_count(), 1);
        assert!(watcher.next_batch().await.is_none());
    }

    #[test]
    fn test_blocked_observers() {
        let page = MemoryPage::new("https://x.com/", None);
        page.block_observers();

        let err = page
            .observe(&MutationFilter::selection_markers())
            .expect_err("blocked");
        assert!(matches!(err, Error::Observer { .. }));
        assert!(!err.is_recoverable());
        assert_eq!(page.observe_count(), 0);
    }

    #[tokio::test]
    async fn test_activation_handler_runs_for_both_mechanisms() {
        let page = MemoryPage::new("https://x.com/", None);
        let node = page.append(page.root(), NodeSpec::new("div")).expect("append");
        page.on_activate(|page, node, kind| match kind {
            ActivationKind::Invoke => page.add_class(node, "clicked"),
            ActivationKind::Dispatch(event) => {
                page.set_attribute(node, "data-event", &event.event_type)
            }
        });

        page.click(node).await.expect("click");
        page.dispatch_event(node, &SyntheticEvent::click())
            .await
            .expect("dispatch");

        assert!(page.has_class(node, "clicked").await.expect("class"));
        assert_eq!(
            page.attribute(node, "data-event").await.expect("attr"),
            Some("click".to_string())
        );
        assert_eq!(page.click_count(), 1);
        assert_eq!(page.dispatch_count(), 1);
    }

    #[tokio::test]
    async fn test_class_list_edits() {
        let page = MemoryPage::new("https://x.com/", None);
        let node = page
            .append(page.root(), NodeSpec::new("div").with_class("a").with_class("b"))
            .expect("append");

        page.add_class(node, "active").expect("add");
        page.remove_class(node, "a").expect("remove");

        assert_eq!(
            page.attribute(node, "class").await.expect("attr"),
            Some("b active".to_string())
        );
    }

    #[tokio::test]
    async fn test_dom_content_loaded_waits_for_parse() {
        let page = Arc::new(
            MemoryPage::new("https://x.com/", None).with_ready_state(ReadyState::Loading),
        );
        let waiter = tokio::spawn({
            let page = Arc::clone(&page);
            async move { page.dom_content_loaded().await }
        });

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        page.set_ready_state(ReadyState::Interactive);
        waiter.await.expect("join").expect("loaded");
    }

    #[test]
    fn test_from_json_fixture() {
        let json = r#"{
            "tag": "body",
            "children": [{
                "tag": "main",
                "children": [{
                    "tag": "div",
                    "attributes": { "role": "tablist" },
                    "children": [
                        { "tag": "div", "attributes": { "role": "tab" } },
                        { "tag": "div", "attributes": { "role": "tab", "aria-selected": "true" } }
                    ]
                }]
            }]
        }"#;
        let page = MemoryPage::from_json("https://x.com/home", Some(""), json).expect("fixture");

        assert_eq!(page.referrer(), None);
        assert_eq!(page.nodes_matching(&tab_selector()).len(), 2);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = MemoryPage::from_json("https://x.com/", None, "{ not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
