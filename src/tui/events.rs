use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CEvent, KeyEvent};

use crate::jobs::{Job, JobOutput};
use crate::platform::Services;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Terminal focus gained (`true`) or lost.
    Focus(bool),
    Tick,
    Job(JobOutput),
}

pub struct EventHandler {
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let input_tx = tx.clone();

        thread::spawn(move || {
            let tx = input_tx;
            let mut last_tick = std::time::Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                if event::poll(timeout).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(CEvent::Key(key)) => Some(Event::Key(key)),
                        Ok(CEvent::FocusGained) => Some(Event::Focus(true)),
                        Ok(CEvent::FocusLost) => Some(Event::Focus(false)),
                        Ok(_) => None,
                        Err(_) => break,
                    };
                    if let Some(ev) = forwarded {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = std::time::Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Runs each job on its own thread; results arrive as [`Event::Job`].
    pub fn spawn_jobs(&self, jobs: Vec<Job>, services: &Services) {
        for job in jobs {
            let tx = self.tx.clone();
            let services = services.clone();
            thread::spawn(move || {
                let output = job.run(&services);
                // The receiver is gone once the dashboard has quit.
                let _ = tx.send(Event::Job(output));
            });
        }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
