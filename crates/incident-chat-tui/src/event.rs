use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::time::{interval, Interval, MissedTickBehavior};

pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Terminal input merged with a redraw tick.
pub struct EventReader {
    stream: EventStream,
    tick: Interval,
}

impl EventReader {
    pub fn new(tick_rate_ms: u64) -> Self {
        let mut tick = interval(Duration::from_millis(tick_rate_ms));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            stream: EventStream::new(),
            tick,
        }
    }

    pub async fn next(&mut self) -> Result<AppEvent, std::io::Error> {
        loop {
            tokio::select! {
                _ = self.tick.tick() => return Ok(AppEvent::Tick),
                event = self.stream.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        return Ok(AppEvent::Key(key));
                    }
                    Some(Ok(Event::Resize(_, _))) => return Ok(AppEvent::Resize),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e),
                    None => {
                        return Err(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "terminal event stream closed",
                        ))
                    }
                },
            }
        }
    }
}
