//! Logger handles, tree nodes and record dispatch

use super::{
    error::Result,
    formatter::Formatter,
    log_level::{LogLevel, StreamTarget, UNCHANGED},
    message,
    registry::{NodeId, Shared},
    sink::Sink,
};
use crate::sinks::{FileSink, StreamSink};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct LevelSettings {
    level: LogLevel,
    propagate: bool,
}

/// At most one stream sink and one file sink per node
#[derive(Default)]
struct NodeSinks {
    stream: Option<StreamSink>,
    file: Option<FileSink>,
}

impl NodeSinks {
    fn is_empty(&self) -> bool {
        self.stream.is_none() && self.file.is_none()
    }

    /// Write and flush `record` on every sink, isolating failures per sink
    fn write(&mut self, record: &str, shared: &Shared) {
        let stream = self.stream.as_mut().map(|s| s as &mut dyn Sink);
        let file = self.file.as_mut().map(|s| s as &mut dyn Sink);

        for sink in [stream, file].into_iter().flatten() {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                sink.write_record(record).and_then(|()| sink.flush())
            }));

            match outcome {
                Ok(Ok(())) => {
                    shared.metrics.record_written();
                }
                Ok(Err(e)) => {
                    shared.metrics.record_write_failure();
                    shared
                        .diagnostics
                        .error(format_args!("sink '{}' failed: {}", sink.name(), e));
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    shared.metrics.record_write_failure();
                    shared.diagnostics.critical(format_args!(
                        "sink '{}' panicked: {}. Other sinks continue to function.",
                        sink.name(),
                        panic_msg
                    ));
                }
            }
        }
    }
}

/// One vertex of the logger tree.
///
/// `handles` counts the `Logger` handles pointing here, including the ones
/// children keep to their parent; the registry retires the node when it
/// drops to zero.
pub(crate) struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) parent: Option<Logger>,
    pub(crate) handles: AtomicUsize,
    settings: RwLock<LevelSettings>,
    sinks: Mutex<NodeSinks>,
    formatter: RwLock<Formatter>,
}

impl Node {
    /// The root starts with one pinned handle so it is never retired
    pub(crate) fn root(id: NodeId, formatter: Formatter) -> Self {
        Self {
            id,
            name: String::new(),
            path: String::new(),
            parent: None,
            handles: AtomicUsize::new(1),
            settings: RwLock::new(LevelSettings {
                level: LogLevel::Warning,
                propagate: false,
            }),
            sinks: Mutex::new(NodeSinks::default()),
            formatter: RwLock::new(formatter),
        }
    }

    pub(crate) fn child(id: NodeId, name: &str, parent: Logger, formatter: Formatter) -> Self {
        let path = if parent.node.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", parent.node.path, name)
        };

        Self {
            id,
            name: name.to_string(),
            path,
            parent: Some(parent),
            handles: AtomicUsize::new(0),
            settings: RwLock::new(LevelSettings {
                level: LogLevel::NotSet,
                propagate: true,
            }),
            sinks: Mutex::new(NodeSinks::default()),
            formatter: RwLock::new(formatter),
        }
    }

    fn propagates(&self) -> bool {
        self.settings.read().propagate
    }

    /// Render `message` with this node's formatter and write it to this node's sinks
    fn deliver(&self, message: &str, name: &str, severity: i32, shared: &Shared) {
        let mut sinks = self.sinks.lock();
        if sinks.is_empty() {
            return;
        }

        let record = {
            let formatter = self.formatter.read();
            let mut record = formatter.render_severity(message, name, severity);
            if formatter.append_newline() {
                record.push('\n');
            }
            record
        };

        sinks.write(&record, shared);
    }
}

/// Handle to a named logger.
///
/// Handles are cheap to clone. A logger stays alive while any handle to it,
/// or to one of its descendants, exists; once the last one is dropped the
/// registry forgets it, along with its level, sinks and formatter.
///
/// # Example
///
/// ```
/// use rust_logger_tree::{LogLevel, Registry, StreamTarget};
///
/// let registry = Registry::new();
/// let logger = registry.resolve("app.db");
/// logger.set_level(LogLevel::Debug);
/// logger.set_stream(StreamTarget::Stdout);
/// logger.info(format_args!("pool ready with {} connections", 8));
/// ```
pub struct Logger {
    node: Arc<Node>,
    shared: Arc<Shared>,
}

impl Logger {
    pub(crate) fn attach(node: Arc<Node>, shared: Arc<Shared>) -> Self {
        node.handles.fetch_add(1, Ordering::AcqRel);
        Self { node, shared }
    }

    pub(crate) fn node_id(&self) -> NodeId {
        self.node.id
    }

    /// Last segment of the dotted name; empty for the root
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Full dotted name; empty for the root
    pub fn path(&self) -> &str {
        &self.node.path
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    pub fn parent(&self) -> Option<Logger> {
        self.node.parent.clone()
    }

    /// Live child segments, sorted
    pub fn children(&self) -> Vec<String> {
        self.shared.children_of(self.node.id)
    }

    /// Whether both handles refer to the same logger node
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    // ---- levels and propagation -------------------------------------------

    /// The level set on this logger; `NotSet` means inherited
    pub fn level(&self) -> LogLevel {
        self.node.settings.read().level
    }

    /// Returns the previous level
    pub fn set_level(&self, level: LogLevel) -> LogLevel {
        std::mem::replace(&mut self.node.settings.write().level, level)
    }

    /// Set the level from a raw severity.
    ///
    /// `UNCHANGED` leaves the level as is; anything else is stored as
    /// `abs(raw)` clamped into `[NotSet, Critical]`. Returns the previous level.
    pub fn set_raw_level(&self, raw: i32) -> LogLevel {
        if raw == UNCHANGED {
            return self.level();
        }
        self.set_level(LogLevel::clamp_raw(raw))
    }

    /// Threshold applied to records logged here: the first level set on this
    /// logger or its ancestors, `NotSet` if there is none.
    pub fn effective_level(&self) -> LogLevel {
        let mut node: &Node = &*self.node;
        loop {
            let level = node.settings.read().level;
            if level.is_set() {
                return level;
            }
            match &node.parent {
                Some(parent) => node = &*parent.node,
                None => return LogLevel::NotSet,
            }
        }
    }

    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level >= self.effective_level()
    }

    pub fn propagates(&self) -> bool {
        self.node.propagates()
    }

    /// Returns the previous setting
    pub fn set_propagation(&self, propagate: bool) -> bool {
        std::mem::replace(&mut self.node.settings.write().propagate, propagate)
    }

    // ---- sinks ----------------------------------------------------------------

    /// Select a console stream, or `DevNull` to stop stream output.
    ///
    /// Returns the stream sink that was replaced. `Unchanged` does nothing and
    /// returns `None`.
    pub fn set_stream(&self, target: StreamTarget) -> Option<StreamSink> {
        if target == StreamTarget::Unchanged {
            return None;
        }
        self.replace_stream(StreamSink::for_target(target))
    }

    /// Install (or remove) the stream sink, returning the previous one
    pub fn replace_stream(&self, sink: Option<StreamSink>) -> Option<StreamSink> {
        std::mem::replace(&mut self.node.sinks.lock().stream, sink)
    }

    /// Route stream output to `writer`
    pub fn set_writer(
        &self,
        name: impl Into<String>,
        writer: impl std::io::Write + Send + 'static,
    ) -> Option<StreamSink> {
        self.replace_stream(Some(StreamSink::writer(name, writer)))
    }

    pub fn has_stream(&self) -> bool {
        self.node.sinks.lock().stream.is_some()
    }

    pub fn stream_name(&self) -> Option<String> {
        self.node
            .sinks
            .lock()
            .stream
            .as_ref()
            .map(|s| s.name().to_string())
    }

    /// Append records to the file at `path`; an empty path closes the file.
    ///
    /// Re-selecting the file already open (after path resolution) is a
    /// no-op. On failure the current file stays open, the error is logged
    /// through this logger and returned.
    pub fn set_logfile(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let outcome = {
            let mut sinks = self.node.sinks.lock();
            if path.as_os_str().is_empty() {
                sinks.file = None;
                Ok(())
            } else if sinks.file.as_ref().is_some_and(|f| f.is_open_to(path)) {
                Ok(())
            } else {
                FileSink::open(path).map(|file| {
                    sinks.file = Some(file);
                })
            }
        };

        if let Err(ref err) = outcome {
            self.error(err);
        }
        outcome
    }

    /// Resolved path of the open log file
    pub fn logfile(&self) -> Option<PathBuf> {
        self.node
            .sinks
            .lock()
            .file
            .as_ref()
            .map(|f| f.path().to_path_buf())
    }

    // ---- formatting -------------------------------------------------------------

    pub fn formatter(&self) -> Formatter {
        self.node.formatter.read().clone()
    }

    /// Returns the previous formatter
    pub fn set_formatter(&self, formatter: Formatter) -> Formatter {
        std::mem::replace(&mut *self.node.formatter.write(), formatter)
    }

    /// Change the time template of this logger's formatter, which may be shared
    pub fn set_time_format(&self, time_format: &str) {
        self.node.formatter.read().set_time_format(time_format);
    }

    /// Change the record template of this logger's formatter, which may be shared
    pub fn set_record_format(&self, record_format: &str) {
        self.node.formatter.read().set_record_format(record_format);
    }

    // ---- dispatch -------------------------------------------------------------

    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        self.log_raw(level as i32, message);
    }

    /// Log with a raw severity.
    ///
    /// The severity is checked once, against this logger's effective level.
    /// A record that passes is written to every sink from this logger up to
    /// the first logger that does not propagate, whatever the levels of the
    /// ancestors on the way.
    pub fn log_raw(&self, severity: i32, message: impl fmt::Display) {
        if severity < i32::from(self.effective_level()) {
            self.shared.metrics.record_filtered();
            return;
        }

        // expanded before locking so a message's Display impl may log itself
        let message = message::expand(&message, self.shared.limits.max_message_length);

        let _serial = self.shared.dispatch_lock.lock();
        let mut current: Option<&Node> = Some(&*self.node);
        while let Some(node) = current {
            node.deliver(&message, &self.node.path, severity, &self.shared);
            if !node.propagates() {
                break;
            }
            current = node.parent.as_ref().map(|parent| &*parent.node);
        }
    }

    pub fn critical(&self, message: impl fmt::Display) {
        self.log(LogLevel::Critical, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    pub fn warning(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warning, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }
}

impl Clone for Logger {
    fn clone(&self) -> Self {
        Logger::attach(Arc::clone(&self.node), Arc::clone(&self.shared))
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.node.handles.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.shared.release(self.node.id);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("path", &self.node.path)
            .field("id", &self.node.id)
            .finish()
    }
}
