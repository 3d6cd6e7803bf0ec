//! Event sources for the render loop.
//!
//! Two producer threads feed one bounded channel: a ticker that fires every
//! refresh interval, and a reader blocked on the next terminal event. The
//! driver drains the channel serially, so monitor and viewport state never
//! need a lock.

use std::sync::mpsc::{self, Receiver, RecvError, SyncSender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};

/// What the driver reacts to.
#[derive(Debug)]
pub enum Event {
    /// Refresh interval elapsed.
    Tick,
    Key(KeyEvent),
    Resize(u16, u16),
}

pub struct EventHandler {
    rx: Receiver<Event>,
}

impl EventHandler {
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::sync_channel(64);

        let tick_tx: SyncSender<Event> = tx.clone();
        thread::spawn(move || {
            loop {
                thread::sleep(delay);
                if tick_tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        thread::spawn(move || {
            loop {
                let forwarded = match event::read() {
                    Ok(CrosstermEvent::Key(key)) => tx.send(Event::Key(key)),
                    Ok(CrosstermEvent::Resize(width, height)) => {
                        tx.send(Event::Resize(width, height))
                    }
                    Ok(_) => continue,
                    Err(_) => break,
                };
                if forwarded.is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Blocks until the next event.
    pub fn next(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }

    /// Throws away everything queued so far. Used after resuming from
    /// suspension: keys pressed before the stop must not replay.
    pub fn drain(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}
