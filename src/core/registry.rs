//! Logger registry: the tree of named loggers
//!
//! Nodes live in an arena of slots addressed by [`NodeId`] (slot index plus
//! generation). A parent's child map stores ids only, so a child reference
//! is weak: it is followed only if the slot still holds the same generation.
//! Parent links are strong `Logger` handles. When the last handle to a node is
//! dropped, the node is detached from its parent and its slot is freed, all
//! under the tree lock, so a concurrent lookup sees the node either fully
//! alive or fully gone.
//!
//! Lock order: the tree lock is never acquired while another registry lock
//! is held, and no `Logger` is dropped while the tree lock is held.

use super::{
    diagnostics::Diagnostics,
    error::{LoggerError, Result},
    formatter::Formatter,
    log_level::{LogLevel, StreamTarget},
    logger::{Logger, Node},
    message::{floor_char_boundary, DEFAULT_MAX_MESSAGE_LENGTH},
    metrics::LoggerMetrics,
};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Default cap on a dotted logger name, in bytes
pub const DEFAULT_MAX_NAME_LENGTH: usize = 256;

/// Default cap on the number of dotted segments in a logger name
pub const DEFAULT_MAX_SUBFIELDS: usize = 24;

/// Stable address of a logger node: arena slot plus generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Size limits enforced by a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_name_length: usize,
    pub max_subfields: usize,
    pub max_message_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            max_subfields: DEFAULT_MAX_SUBFIELDS,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
        }
    }
}

impl Limits {
    /// Split a dotted name into its segments; the empty name has none
    pub fn split<'a>(&self, name: &'a str) -> Result<Vec<&'a str>> {
        if name.len() > self.max_name_length {
            let prefix = &name[..floor_char_boundary(name, self.max_name_length)];
            return Err(LoggerError::invalid_name(
                format!("{}...", prefix),
                format!("exceeded maximum length ({})", self.max_name_length),
            ));
        }
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let segments: Vec<&str> = name.split('.').collect();
        if segments.len() > self.max_subfields {
            return Err(LoggerError::invalid_name(
                name,
                format!("max number of subfields ({}) exceeded", self.max_subfields),
            ));
        }
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(LoggerError::invalid_name(name, "empty name segment"));
        }
        Ok(segments)
    }
}

struct SlotEntry {
    node: Arc<Node>,
    children: HashMap<String, NodeId>,
}

#[derive(Default)]
struct Slot {
    generation: u32,
    entry: Option<SlotEntry>,
}

enum Unlink {
    Removed,
    Replaced,
    Missing,
}

#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Arena {
    /// Id the next `occupy` must use
    fn next_id(&mut self) -> NodeId {
        if let Some(index) = self.free.pop() {
            return NodeId {
                index,
                generation: self.slots[index as usize].generation,
            };
        }
        self.slots.push(Slot::default());
        NodeId {
            index: (self.slots.len() - 1) as u32,
            generation: 0,
        }
    }

    fn occupy(&mut self, node: Arc<Node>) {
        let slot = &mut self.slots[node.id.index as usize];
        debug_assert!(slot.entry.is_none() && slot.generation == node.id.generation);
        slot.entry = Some(SlotEntry {
            node,
            children: HashMap::new(),
        });
    }

    fn entry(&self, id: NodeId) -> Option<&SlotEntry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut SlotEntry> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    fn vacate(&mut self, id: NodeId) -> Option<SlotEntry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(entry)
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.entry(id).is_some()
    }

    /// Follow the child reference for `segment`, purging it if it has expired
    fn live_child(&mut self, parent: NodeId, segment: &str) -> Option<Arc<Node>> {
        let child = *self.entry(parent)?.children.get(segment)?;
        if let Some(entry) = self.entry(child) {
            return Some(Arc::clone(&entry.node));
        }
        if let Some(entry) = self.entry_mut(parent) {
            entry.children.remove(segment);
        }
        None
    }

    fn link(&mut self, parent: NodeId, segment: &str, child: NodeId) {
        if let Some(entry) = self.entry_mut(parent) {
            entry.children.insert(segment.to_string(), child);
        }
    }

    fn unlink(&mut self, parent: NodeId, segment: &str, child: NodeId) -> Unlink {
        let Some(entry) = self.entry_mut(parent) else {
            return Unlink::Missing;
        };
        match entry.children.get(segment) {
            Some(id) if *id == child => {
                entry.children.remove(segment);
                Unlink::Removed
            }
            Some(_) => Unlink::Replaced,
            None => Unlink::Missing,
        }
    }

    /// Drop expired child references and return the live child segments
    fn live_children(&mut self, parent: NodeId) -> Vec<String> {
        let Some(entry) = self.entry(parent) else {
            return Vec::new();
        };
        let expired: Vec<String> = entry
            .children
            .iter()
            .filter(|(_, id)| !self.is_live(**id))
            .map(|(segment, _)| segment.clone())
            .collect();

        let entry = match self.entry_mut(parent) {
            Some(entry) => entry,
            None => return Vec::new(),
        };
        for segment in &expired {
            entry.children.remove(segment);
        }
        let mut live: Vec<String> = entry.children.keys().cloned().collect();
        live.sort();
        live
    }
}

/// State shared by a registry and every logger handle it produced
pub(crate) struct Shared {
    tree: Mutex<Arena>,
    root: OnceCell<Arc<Node>>,
    default_formatter: RwLock<Formatter>,
    pub(crate) dispatch_lock: Mutex<()>,
    pub(crate) limits: Limits,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) metrics: LoggerMetrics,
}

impl Shared {
    fn root_node(&self) -> &Arc<Node> {
        self.root.get_or_init(|| {
            let mut tree = self.tree.lock();
            let id = tree.next_id();
            let node = Arc::new(Node::root(id, self.default_formatter.read().clone()));
            tree.occupy(Arc::clone(&node));
            self.metrics.record_node_created();
            self.diagnostics.debug(format_args!("created root logger"));
            node
        })
    }

    pub(crate) fn children_of(&self, id: NodeId) -> Vec<String> {
        self.tree.lock().live_children(id)
    }

    /// Retire the node `id` if it has no handles left.
    ///
    /// Called when a handle count drops to zero. The count is checked again
    /// under the tree lock: a concurrent lookup may have handed the node out
    /// again, and an earlier call may already have retired it.
    pub(crate) fn release(&self, id: NodeId) {
        let retired = {
            let mut tree = self.tree.lock();
            let Some(entry) = tree.entry(id) else {
                return;
            };
            if entry.node.handles.load(Ordering::Acquire) > 0 {
                return;
            }

            if !tree.live_children(id).is_empty() {
                self.diagnostics.error(format_args!(
                    "logger '{}' destroyed with active children",
                    entry_path(&tree, id)
                ));
            }

            let Some(retired) = tree.vacate(id) else {
                return;
            };
            if let Some(parent) = &retired.node.parent {
                match tree.unlink(parent.node_id(), &retired.node.name, id) {
                    Unlink::Removed => {
                        self.diagnostics.debug(format_args!(
                            "detached '{}' from its parent",
                            retired.node.path
                        ));
                    }
                    Unlink::Replaced => {
                        self.diagnostics.error(format_args!(
                            "a new logger '{}' was created during destruction",
                            retired.node.path
                        ));
                    }
                    Unlink::Missing => {
                        self.diagnostics.error(format_args!(
                            "logger '{}' was missing from its parent's children",
                            retired.node.path
                        ));
                    }
                }
            }
            retired
        };

        self.metrics.record_node_destroyed();
        self.diagnostics
            .debug(format_args!("destroyed logger '{}'", retired.node.path));
        // the node, and with it the parent handle, is released outside the tree lock
        drop(retired);
    }
}

fn entry_path(tree: &Arena, id: NodeId) -> String {
    tree.entry(id)
        .map(|entry| entry.node.path.clone())
        .unwrap_or_default()
}

/// A tree of named loggers.
///
/// Registries are independent: each has its own root, default formatter,
/// limits and metrics. [`Registry::global`] is the process-wide instance used
/// by [`get_logger`] and [`root_logger`]. Cloning a registry yields another
/// handle to the same tree.
///
/// # Example
///
/// ```
/// use rust_logger_tree::{LogLevel, Registry};
///
/// let registry = Registry::new();
/// let pool = registry.resolve("app.db.pool");
/// let app = registry.resolve("app");
/// app.set_level(LogLevel::Debug);
///
/// assert_eq!(pool.effective_level(), LogLevel::Debug);
/// assert_eq!(app.children(), vec!["db".to_string()]);
/// ```
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The process-wide registry, created on first use
    pub fn global() -> &'static Registry {
        static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
        &GLOBAL_REGISTRY
    }

    /// Handle to the root logger, creating it on first use
    pub fn resolve_root(&self) -> Logger {
        Logger::attach(
            Arc::clone(self.shared.root_node()),
            Arc::clone(&self.shared),
        )
    }

    /// Handle to the logger named `name`, creating it and any missing
    /// ancestors. The empty name is the root.
    pub fn try_resolve(&self, name: &str) -> Result<Logger> {
        let segments = self.shared.limits.split(name)?;
        let mut current = Arc::clone(self.shared.root_node());
        if segments.is_empty() {
            return Ok(Logger::attach(current, Arc::clone(&self.shared)));
        }

        let diagnostics = &self.shared.diagnostics;
        let mut tree = self.shared.tree.lock();
        for segment in segments {
            // `current` is still referenced by its slot, so replacing it never
            // drops a node while the tree lock is held
            current = match tree.live_child(current.id, segment) {
                Some(child) => {
                    diagnostics.debug(format_args!("found existing logger '{}'", child.path));
                    child
                }
                None => {
                    let formatter = self.shared.default_formatter.read().clone();
                    let parent = Logger::attach(Arc::clone(&current), Arc::clone(&self.shared));
                    let id = tree.next_id();
                    let child = Arc::new(Node::child(id, segment, parent, formatter));
                    tree.occupy(Arc::clone(&child));
                    tree.link(current.id, segment, id);
                    self.shared.metrics.record_node_created();
                    diagnostics.debug(format_args!("created new logger '{}'", child.path));
                    child
                }
            };
        }
        let logger = Logger::attach(current, Arc::clone(&self.shared));
        drop(tree);

        Ok(logger)
    }

    /// Handle to the logger named `name`.
    ///
    /// An invalid name is a static configuration mistake: it is reported on
    /// the root logger and the diagnostic channel, then the process exits
    /// with status 1. Use [`Registry::try_resolve`] to handle it instead.
    pub fn resolve(&self, name: &str) -> Logger {
        match self.try_resolve(name) {
            Ok(logger) => logger,
            Err(err) => {
                self.resolve_root().error(&err);
                self.shared
                    .diagnostics
                    .critical(format_args!("fatal logger configuration error: {}", err));
                std::process::exit(1);
            }
        }
    }

    /// Resolve `name`, then apply `level` and `stream` unless they are
    /// `None` / `StreamTarget::Unchanged`.
    pub fn get_logger_with(
        &self,
        name: &str,
        level: Option<LogLevel>,
        stream: StreamTarget,
    ) -> Logger {
        let logger = self.resolve(name);
        if let Some(level) = level {
            logger.set_level(level);
        }
        logger.set_stream(stream);
        logger
    }

    /// Formatter installed on loggers created from now on
    pub fn default_formatter(&self) -> Formatter {
        self.shared.default_formatter.read().clone()
    }

    /// Returns the previous default; existing loggers keep their formatter
    pub fn set_default_formatter(&self, formatter: Formatter) -> Formatter {
        std::mem::replace(&mut *self.shared.default_formatter.write(), formatter)
    }

    pub fn self_logging(&self) -> bool {
        self.shared.diagnostics.enabled()
    }

    /// Report registry bookkeeping on standard error; returns the previous setting
    pub fn set_self_logging(&self, enabled: bool) -> bool {
        self.shared.diagnostics.set_enabled(enabled)
    }

    pub fn limits(&self) -> &Limits {
        &self.shared.limits
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    /// Live child segments of `logger`, sorted
    pub fn children_of(&self, logger: &Logger) -> Vec<String> {
        self.shared.children_of(logger.node_id())
    }

    /// Dotted names of every live logger except the root, sorted
    pub fn live_loggers(&self) -> Vec<String> {
        let tree = self.shared.tree.lock();
        let mut paths: Vec<String> = tree
            .slots
            .iter()
            .filter_map(|slot| slot.entry.as_ref())
            .map(|entry| entry.node.path.clone())
            .filter(|path| !path.is_empty())
            .collect();
        paths.sort();
        paths
    }

    /// Whether both handles refer to the same tree
    pub fn ptr_eq(&self, other: &Registry) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("limits", &self.shared.limits)
            .field("live_nodes", &self.shared.metrics.live_nodes())
            .finish()
    }
}

/// Builder for constructing a Registry with a fluent API
///
/// # Example
/// ```
/// use rust_logger_tree::{Formatter, Registry};
///
/// let registry = Registry::builder()
///     .max_name_length(128)
///     .max_subfields(8)
///     .default_formatter(Formatter::new("[%L] %N%m", "%H:%M:%S", true))
///     .build();
///
/// assert!(registry.try_resolve("a.b.c.d.e.f.g.h.i").is_err());
/// ```
pub struct RegistryBuilder {
    limits: Limits,
    default_formatter: Formatter,
    self_logging: bool,
}

impl RegistryBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            default_formatter: Formatter::default(),
            self_logging: false,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_name_length(mut self, max_name_length: usize) -> Self {
        self.limits.max_name_length = max_name_length;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_subfields(mut self, max_subfields: usize) -> Self {
        self.limits.max_subfields = max_subfields;
        self
    }

    /// Message buffer size; expanded messages keep at most one byte less
    #[must_use = "builder methods return a new value"]
    pub fn max_message_length(mut self, max_message_length: usize) -> Self {
        self.limits.max_message_length = max_message_length;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn default_formatter(mut self, formatter: Formatter) -> Self {
        self.default_formatter = formatter;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn self_logging(mut self, enabled: bool) -> Self {
        self.self_logging = enabled;
        self
    }

    /// Build the registry; its root logger is created on first use
    pub fn build(self) -> Registry {
        Registry {
            shared: Arc::new(Shared {
                tree: Mutex::new(Arena::default()),
                root: OnceCell::new(),
                default_formatter: RwLock::new(self.default_formatter),
                dispatch_lock: Mutex::new(()),
                limits: self.limits,
                diagnostics: Diagnostics::new(self.self_logging),
                metrics: LoggerMetrics::new(),
            }),
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Logger `name` from the process-wide registry
pub fn get_logger(name: &str) -> Logger {
    Registry::global().resolve(name)
}

/// Root logger of the process-wide registry
pub fn root_logger() -> Logger {
    Registry::global().resolve_root()
}
