//! The queued device
//!
//! [`Device`] wraps a [`Term`] behind a bounded write queue drained by a
//! single worker thread, so the write entry point is cheap enough to call
//! from an interrupt handler or any other producer context. The worker
//! also owns the ~2 Hz cursor-blink tick; the `cursor-blink` cargo
//! feature (on by default) compiles it out for event-driven builds.
//!
//! Ordering: bytes from one `write` call are enqueued contiguously and
//! interpreted before any later call's bytes. A returned write does not
//! mean the bytes have been rendered; observe the surface or the display
//! callback for that.

use std::io;
use std::sync::mpsc::{self, Receiver, SyncSender};
#[cfg(feature = "cursor-blink")]
use std::sync::mpsc::RecvTimeoutError;
use std::sync::{Arc, Mutex};
use std::thread;
#[cfg(feature = "cursor-blink")]
use std::time::Duration;

use crate::surface::Surface;
use crate::term::Term;
use crate::tiles::TileSets;

/// Queue depth; sized so producers do not stall under normal load.
const WRITE_QUEUE_DEPTH: usize = 256;

#[cfg(feature = "cursor-blink")]
const BLINK_INTERVAL: Duration = Duration::from_millis(500);

enum Msg {
    Data(Vec<u8>),
    Stop,
}

/// A terminal with its own interpreter thread.
pub struct Device {
    term: Arc<Mutex<Term>>,
    queue: SyncSender<Msg>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Device {
    /// Build a device of `cols` x `rows` cells and start its worker.
    pub fn new(cols: usize, rows: usize, surface: Box<dyn Surface>, tiles: TileSets) -> Self {
        Device::from_term(Term::new(cols, rows, surface, tiles))
    }

    /// Wrap an already-configured interpreter and start the worker.
    pub fn from_term(term: Term) -> Self {
        let term = Arc::new(Mutex::new(term));
        let (queue, rx) = mpsc::sync_channel(WRITE_QUEUE_DEPTH);
        let worker_term = term.clone();
        let worker = thread::spawn(move || worker_loop(worker_term, rx));
        Device {
            term,
            queue,
            worker: Some(worker),
        }
    }

    /// Enqueue bytes for interpretation. Copies the input; blocks only if
    /// the queue is full.
    pub fn write(&self, data: &[u8]) -> usize {
        let _ = self.queue.send(Msg::Data(data.to_vec()));
        data.len()
    }

    /// Run a closure against the interpreter state, serialized with the
    /// worker. This is how hosts read the surface, adjust configuration,
    /// or install callbacks after construction.
    pub fn with_term<R>(&self, f: impl FnOnce(&mut Term) -> R) -> R {
        let mut term = match self.term.lock() {
            Ok(t) => t,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut term)
    }

    /// Stop the worker. Bytes still queued behind the stop are discarded.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.queue.send(Msg::Stop);
            let _ = worker.join();
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl io::Write for Device {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Device::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn worker_loop(term: Arc<Mutex<Term>>, rx: Receiver<Msg>) {
    let mut run = |f: &mut dyn FnMut(&mut Term)| {
        if let Ok(mut t) = term.lock() {
            f(&mut t);
        }
    };

    loop {
        #[cfg(feature = "cursor-blink")]
        let msg = match rx.recv_timeout(BLINK_INTERVAL) {
            Ok(msg) => msg,
            Err(RecvTimeoutError::Timeout) => {
                run(&mut |t: &mut Term| t.blink_cursor());
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => return,
        };

        #[cfg(not(feature = "cursor-blink"))]
        let msg = match rx.recv() {
            Ok(msg) => msg,
            Err(_) => return,
        };

        match msg {
            Msg::Data(data) => run(&mut |t: &mut Term| t.process(&data)),
            Msg::Stop => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{cell_byte, test_term};
    use std::sync::mpsc::channel;

    fn test_device() -> Device {
        Device::from_term(test_term(10, 3))
    }

    #[test]
    fn test_write_is_interpreted_in_order() {
        let (tx, rx) = channel();
        let dev = test_device();
        dev.with_term(move |t| {
            t.set_display_fn(move || {
                let _ = tx.send(());
            })
        });

        dev.write(b"ab");
        dev.write(b"cd");
        // two drained writes, two display callbacks
        rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();

        dev.with_term(|t| {
            assert_eq!(cell_byte(t, 0, 0), Some(b'a'));
            assert_eq!(cell_byte(t, 3, 0), Some(b'd'));
        });
        dev.stop();
    }

    #[test]
    fn test_stop_joins_worker() {
        let dev = test_device();
        dev.write(b"hello");
        dev.stop();
    }

    #[test]
    fn test_drop_stops_worker() {
        let dev = test_device();
        dev.write(b"x");
        drop(dev);
    }

    #[test]
    fn test_io_write_trait() {
        use std::io::Write;
        let mut dev = test_device();
        assert_eq!(Write::write(&mut dev, b"abc").unwrap(), 3);
        dev.flush().unwrap();
    }
}
