//! # Teleinfo Frame Store
//!
//! This module owns the most recently completed frame and the task that
//! produces it. Two operating modes share the same decoder:
//!
//! - **Push** ([`FrameStore`]): a background task continuously drives the
//!   serial stream through the decoder and atomically replaces the cached
//!   frame on every completion. Any number of uncoordinated readers call
//!   [`FrameStore::current_frame`] without ever blocking on the producer.
//! - **Pull** ([`ThrottledReader`]): a single consumer synchronously fetches
//!   one frame from a blocking transport, rate-limited by a minimum interval
//!   between performed fetches.
//!
//! Readers always observe either the previous complete frame or the next
//! one; the write lock is held only for the pointer swap, so a frame is
//! never seen half-written.

use crate::error::TeleinfoError;
use crate::teleinfo::decoder::{decode_line, FrameDecoder, FrameEvent};
use crate::teleinfo::frame::{FieldValue, Frame};
use crate::teleinfo::serial::LineReader;
use log::{debug, error, info, warn};
use std::io::BufRead;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;

// A poisoned lock only means a reader panicked mid-clone; the frame data
// itself is replaced wholesale and stays usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn read<T>(rwlock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rwlock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(rwlock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    rwlock.write().unwrap_or_else(|e| e.into_inner())
}

/// Latest-frame cache fed by a cancellable background reader task.
#[derive(Default)]
pub struct FrameStore {
    frame: Arc<RwLock<Option<Frame>>>,
    producer: Mutex<Option<JoinHandle<()>>>,
}

impl FrameStore {
    /// Creates a store with no frame and no producer task.
    pub fn new() -> Self {
        FrameStore::default()
    }

    /// Spawns the producer task reading the given stream.
    ///
    /// Idempotent: if a producer is already running the call is logged and
    /// ignored, so the same stream is never consumed by two readers. The
    /// very first line of a fresh connection is discarded unconditionally,
    /// it is almost always torn mid-group.
    pub fn start<R>(&self, stream: R, line_timeout: Duration)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let mut slot = lock(&self.producer);
        if slot.as_ref().is_some_and(|task| !task.is_finished()) {
            warn!("teleinfo reader already running, ignoring start request");
            return;
        }

        let cache = Arc::clone(&self.frame);
        *slot = Some(tokio::spawn(async move {
            match run_producer(stream, line_timeout, cache).await {
                Ok(()) => info!("teleinfo stream ended"),
                Err(e) => error!("teleinfo reader terminated: {e}"),
            }
        }));
    }

    /// Cancels the producer task. Safe to call when none is running.
    ///
    /// Closing the underlying port is the transport's concern: dropping the
    /// aborted task drops the stream it owns.
    pub fn stop(&self) {
        if let Some(task) = lock(&self.producer).take() {
            task.abort();
        }
    }

    /// Whether a producer task is currently running.
    pub fn is_running(&self) -> bool {
        lock(&self.producer)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Non-blocking read of the latest complete frame, if any.
    pub fn current_frame(&self) -> Option<Frame> {
        read(&self.frame).clone()
    }

    /// Looks a field up in the current frame by key, case-insensitively,
    /// with numeric coercion. `None` means "no data yet", not an error;
    /// consumers keep their previous value.
    pub fn field(&self, key: &str) -> Option<FieldValue> {
        read(&self.frame).as_ref().and_then(|frame| frame.field(key))
    }
}

impl Drop for FrameStore {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_producer<R>(
    stream: R,
    line_timeout: Duration,
    cache: Arc<RwLock<Option<Frame>>>,
) -> Result<(), TeleinfoError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = LineReader::new(stream, line_timeout);

    // Warm-up read: drop the first line before parsing begins.
    if reader.next_line().await?.is_none() {
        return Ok(());
    }

    let mut decoder = FrameDecoder::new();
    while let Some(raw) = reader.next_line().await? {
        let Some(line) = decode_line(&raw) else {
            debug!("dropping undecodable record of {} bytes", raw.len());
            continue;
        };
        // Rejected fields are logged by the decoder itself; only a
        // completed frame changes what readers see.
        if let FrameEvent::FrameCompleted(frame) = decoder.feed(&line) {
            debug!("frame completed with {} data groups", frame.len());
            *write(&cache) = Some(frame);
        }
    }
    Ok(())
}

/// One blocking fetch of the next complete frame, used by the pull mode.
pub trait FrameSource {
    fn fetch_frame(&mut self) -> Result<Frame, TeleinfoError>;
}

/// [`FrameSource`] over any blocking line-oriented byte stream.
pub struct BlockingLineSource<R> {
    reader: R,
    decoder: FrameDecoder,
    buf: Vec<u8>,
}

impl<R: BufRead> BlockingLineSource<R> {
    pub fn new(reader: R) -> Self {
        BlockingLineSource {
            reader,
            decoder: FrameDecoder::new(),
            buf: Vec::with_capacity(64),
        }
    }
}

impl<R: BufRead> FrameSource for BlockingLineSource<R> {
    fn fetch_frame(&mut self) -> Result<Frame, TeleinfoError> {
        loop {
            self.buf.clear();
            let n = self.reader.read_until(b'\n', &mut self.buf)?;
            if n == 0 {
                return Err(TeleinfoError::StreamClosed);
            }
            let Some(line) = decode_line(&self.buf) else {
                continue;
            };
            if let FrameEvent::FrameCompleted(frame) = self.decoder.feed(&line) {
                return Ok(frame);
            }
        }
    }
}

/// Throttled pull-mode reader: performs the underlying fetch at most once
/// per window and otherwise serves the cached frame.
///
/// Not reentrant; concurrent callers must serialize, which the `&mut`
/// receiver enforces at compile time.
pub struct ThrottledReader<S> {
    source: S,
    window: Duration,
    cached: Option<Frame>,
    last_fetch: Option<Instant>,
}

impl<S: FrameSource> ThrottledReader<S> {
    pub fn new(source: S, window: Duration) -> Self {
        ThrottledReader {
            source,
            window,
            cached: None,
            last_fetch: None,
        }
    }

    /// The cached frame from the last performed fetch, if any.
    pub fn frame(&self) -> Option<&Frame> {
        self.cached.as_ref()
    }

    /// Fetches a new frame if at least the window has elapsed since the
    /// previous performed fetch; otherwise returns the cached frame
    /// unchanged. A failed fetch leaves the cache and the throttle clock
    /// untouched, so the next call retries.
    pub fn fetch(&mut self) -> Result<Option<&Frame>, TeleinfoError> {
        let due = self
            .last_fetch
            .is_none_or(|at| at.elapsed() >= self.window);
        if due {
            self.cached = Some(self.source.fetch_frame()?);
            self.last_fetch = Some(Instant::now());
        }
        Ok(self.cached.as_ref())
    }
}
