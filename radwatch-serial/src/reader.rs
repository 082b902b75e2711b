//! Line Reader Worker
//!
//! ## Overview
//!
//! Ingestion runs on exactly one worker thread: it pulls byte chunks from
//! any `io::Read` source (a serial port, a mock device, a replay file),
//! reassembles complete lines across chunk boundaries, and hands them to
//! the consumer over a channel. The worker never parses - framing only -
//! so a slow parse can never back-pressure the device.
//!
//! ```text
//! device bytes ──▶ [worker thread] ──▶ mpsc channel ──▶ consumer drain
//!                   chunk → lines        SourceMessage     (Monitor::poll)
//! ```
//!
//! ## Control & teardown
//!
//! The worker is controlled through a command channel checked once per loop
//! iteration: a cooperative stop, no thread killing. A read timeout is the
//! idle state of a serial port with a short timeout configured and keeps
//! the loop spinning at timeout cadence; end-of-stream and real I/O errors
//! are reported as messages and end the worker. The consumer may drop the
//! reader while the worker is mid-read - the worker notices the dead
//! channels on its next iteration and exits.

use std::io::{ErrorKind, Read};
use std::sync::mpsc::{self, Receiver, Sender, TryIter, TryRecvError};
use std::thread::{self, JoinHandle};

/// Read chunk size; a telemetry line is well under 100 bytes.
const READ_CHUNK: usize = 1024;

/// What the worker reports to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMessage {
    /// One complete, non-empty, trimmed telemetry line
    Line(String),
    /// The source failed; the worker has exited
    Fault(String),
    /// The source reached end-of-stream; the worker has exited
    Closed,
}

/// Commands accepted by the worker.
enum ReaderCmd {
    Stop,
}

/// Handle to a running line-reader worker.
///
/// Dropping the handle signals the worker to stop; it is not joined, and
/// teardown tolerates a worker that has not yet exited.
pub struct LineReader {
    cmd_tx: Sender<ReaderCmd>,
    messages: Receiver<SourceMessage>,
    handle: Option<JoinHandle<()>>,
}

impl LineReader {
    /// Spawns the worker over `source`.
    pub fn spawn<R>(source: R) -> Self
    where
        R: Read + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (msg_tx, messages) = mpsc::channel();

        let handle = thread::spawn(move || read_loop(source, cmd_rx, msg_tx));

        Self {
            cmd_tx,
            messages,
            handle: Some(handle),
        }
    }

    /// Non-blocking drain of everything the worker has produced so far.
    pub fn try_iter(&self) -> TryIter<'_, SourceMessage> {
        self.messages.try_iter()
    }

    /// Signals the worker to stop after its current iteration.
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(ReaderCmd::Stop);
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Stops the worker and waits for it to exit.
    ///
    /// Only safe to call when the source is known to return promptly (short
    /// read timeout or a finite mock); used by tests.
    pub fn join(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for LineReader {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(ReaderCmd::Stop);
    }
}

fn read_loop<R: Read>(mut source: R, commands: Receiver<ReaderCmd>, out: Sender<SourceMessage>) {
    let mut pending = String::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        match commands.try_recv() {
            Ok(ReaderCmd::Stop) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match source.read(&mut chunk) {
            Ok(0) => {
                let _ = out.send(SourceMessage::Closed);
                break;
            }
            Ok(n) => {
                pending.push_str(&String::from_utf8_lossy(&chunk[..n]));
                while let Some(pos) = pending.find('\n') {
                    let raw: String = pending.drain(..=pos).collect();
                    let line = raw.trim();
                    if !line.is_empty()
                        && out.send(SourceMessage::Line(line.to_string())).is_err()
                    {
                        // consumer went away
                        return;
                    }
                }
            }
            // a timeout is the idle state of a port with a short read
            // timeout configured, not a fault
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                let _ = out.send(SourceMessage::Fault(format!("read error: {e}")));
                break;
            }
        }
    }
}
