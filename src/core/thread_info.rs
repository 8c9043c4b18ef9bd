//! Thread and process identification for the `%i`, `%I`, `%p` and `%P` directives

use once_cell::sync::OnceCell;
use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread::{self, ThreadId};

static MAIN_THREAD: OnceCell<ThreadId> = OnceCell::new();

// Thread-local cache so the hash is computed once per thread
thread_local! {
    static THREAD_TAG_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Record the calling thread as the process's main thread.
///
/// Returns `false` if another thread was designated first. Until a thread is
/// designated, the thread named `main` is treated as the main thread.
pub fn designate_main_thread() -> bool {
    MAIN_THREAD.set(thread::current().id()).is_ok()
}

/// Whether the calling thread is the designated main thread
pub fn is_main_thread() -> bool {
    match MAIN_THREAD.get() {
        Some(id) => *id == thread::current().id(),
        None => thread::current().name() == Some("main"),
    }
}

/// Stable hexadecimal tag of the calling thread
pub fn thread_tag() -> String {
    THREAD_TAG_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:x}", hash_thread_id(thread::current().id())))
            .clone()
    })
}

fn hash_thread_id(id: ThreadId) -> u32 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish() as u32
}

pub fn process_id() -> u32 {
    std::process::id()
}

/// Parent process id; `0` where the platform does not expose one
pub fn parent_process_id() -> u32 {
    #[cfg(unix)]
    {
        std::os::unix::process::parent_id()
    }
    #[cfg(not(unix))]
    {
        0
    }
}
