//! Captured stack traces for failed guarded calls.
//!
//! Panics are captured at the panic site by a process-wide hook that chains to
//! whatever hook was installed before it. The hook only records while a guarded
//! call is running on the current thread, and it stores the capture in a
//! thread-local slot that the guard drains after unwinding.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};
use std::sync::Once;

use backtrace::Backtrace;

use crate::ports::FileSystem;

/// Crate name as it appears at the start of demangled symbol paths.
const CRATE_NAME: &str = env!("CARGO_CRATE_NAME");

/// Directory holding this crate's sources.
const OWN_SOURCE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src");

/// Symbol prefixes of the standard library, the unwinder and the capture
/// machinery. Frames matching these never reach a report.
const RUNTIME_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "backtrace::",
    "<std::",
    "<core::",
    "<alloc::",
    "<backtrace::",
    "__rust",
    "rust_begin_unwind",
    "rust_panic",
    "_start",
    "__libc_start",
];

/// One stack frame of a captured failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    /// Source file path.
    pub filename: String,
    /// Demangled callable name.
    pub name: String,
    /// 1-based line number, `0` when unknown.
    pub lineno: u32,
    /// Trimmed source line, empty when the file cannot be read.
    pub line: String,
}

impl TraceFrame {
    /// Creates a frame.
    pub fn new(
        filename: impl Into<String>,
        name: impl Into<String>,
        lineno: u32,
        line: impl Into<String>,
    ) -> Self {
        Self { filename: filename.into(), name: name.into(), lineno, line: line.into() }
    }

    /// Returns `true` when the frame belongs to this crate's own code.
    #[must_use]
    pub fn is_own(&self) -> bool {
        let name = self.name.strip_prefix('<').unwrap_or(&self.name);
        let in_crate =
            name.strip_prefix(CRATE_NAME).is_some_and(|rest| rest.starts_with("::"));
        in_crate || Path::new(&self.filename).starts_with(OWN_SOURCE_DIR)
    }

    fn is_runtime(&self) -> bool {
        RUNTIME_PREFIXES.iter().any(|prefix| self.name.starts_with(prefix))
            || self.filename.starts_with("/rustc/")
    }
}

/// Path of this crate's source directory, for building frames that must be
/// recognized by [`TraceFrame::is_own`].
#[must_use]
pub fn own_source_dir() -> PathBuf {
    PathBuf::from(OWN_SOURCE_DIR)
}

/// Frames of a failure, outermost-first, with the unfiltered traceback text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    frames: Vec<TraceFrame>,
    raw: String,
}

impl Trace {
    /// Creates a trace from frames in outermost-first order.
    pub fn new(frames: Vec<TraceFrame>, raw: impl Into<String>) -> Self {
        Self { frames, raw: raw.into() }
    }

    /// Frames, outermost first.
    #[must_use]
    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }

    /// Full traceback text, including runtime frames.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Builds a trace for an error value returned by a guarded call.
    ///
    /// The error was already propagated out of the frames that produced it, so
    /// only its rendering is available.
    pub fn from_error<E: Debug + Display>(kind: &str, error: &E) -> Self {
        Self::new(Vec::new(), format!("{kind}: {error}\n\n{error:#?}"))
    }

    /// Resolves a captured backtrace into frames.
    ///
    /// Runtime frames are dropped, as are the leading frames of this crate that
    /// performed the capture. Source lines are looked up through `fs`.
    pub fn from_backtrace(mut backtrace: Backtrace, header: &str, fs: &dyn FileSystem) -> Self {
        backtrace.resolve();
        let mut sources = SourceLines::new(fs);

        let innermost_first: Vec<TraceFrame> = backtrace
            .frames()
            .iter()
            .flat_map(backtrace::BacktraceFrame::symbols)
            .filter_map(|symbol| {
                let name = format!("{:#}", symbol.name()?);
                let filename = symbol
                    .filename()
                    .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
                let lineno = symbol.lineno().unwrap_or(0);
                Some(TraceFrame::new(filename, name, lineno, String::new()))
            })
            .filter(|frame| !frame.is_runtime())
            .skip_while(TraceFrame::is_own)
            .collect();

        let frames = innermost_first
            .into_iter()
            .rev()
            .map(|mut frame| {
                frame.line = sources.line(&frame.filename, frame.lineno);
                frame
            })
            .collect();

        Self::new(frames, format!("{header}\n\nstack backtrace:\n{backtrace:?}"))
    }

    /// Builds a trace from a panic recorded by the guard hook.
    pub fn from_panic(capture: PanicCapture, fs: &dyn FileSystem) -> Self {
        let header = match &capture.location {
            Some(location) => format!("panicked at {location}:\n{}", capture.message),
            None => format!("panicked:\n{}", capture.message),
        };
        Self::from_backtrace(capture.backtrace, &header, fs)
    }
}

/// Source lines read on demand, one read per file.
struct SourceLines<'a> {
    fs: &'a dyn FileSystem,
    files: HashMap<String, Option<String>>,
}

impl<'a> SourceLines<'a> {
    fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs, files: HashMap::new() }
    }

    fn line(&mut self, filename: &str, lineno: u32) -> String {
        let Some(index) = lineno.checked_sub(1) else {
            return String::new();
        };
        let fs = self.fs;
        let contents = self
            .files
            .entry(filename.to_string())
            .or_insert_with(|| fs.read_to_string(Path::new(filename)).ok());
        contents
            .as_deref()
            .and_then(|text| text.lines().nth(index as usize))
            .map(|line| line.trim().to_string())
            .unwrap_or_default()
    }
}

/// Panic recorded at the panic site.
pub struct PanicCapture {
    /// Panic message, or a placeholder for non-string payloads.
    pub message: String,
    /// `file:line:column` of the panic.
    pub location: Option<String>,
    backtrace: Backtrace,
}

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_PANIC: RefCell<Option<PanicCapture>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Installs the capturing panic hook once per process.
pub(crate) fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(Cell::get) > 0 {
                let payload = info.payload();
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "Box<dyn Any>".to_string());
                let capture = PanicCapture {
                    message,
                    location: info.location().map(ToString::to_string),
                    backtrace: Backtrace::new_unresolved(),
                };
                LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(capture));
            }
            previous(info);
        }));
    });
}

/// Marks the current thread as running a guarded call until dropped.
pub(crate) struct GuardScope;

impl GuardScope {
    pub(crate) fn enter() -> Self {
        GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        GUARD_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Takes the panic captured on this thread, if any.
pub(crate) fn take_panic_capture() -> Option<PanicCapture> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}
