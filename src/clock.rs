use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local, TimeZone};

use crate::state::Delta;

const TICK: Duration = Duration::from_secs(1);
const DAY: Duration = Duration::from_secs(24 * 3600);

/// "Hh Mm", seconds dropped.
pub fn format_countdown(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{hours}h {minutes}m")
}

/// Real time from `now` to the next midnight of its zone. Exactly at midnight
/// this is a full day; across a DST change it is 23 or 25 hours.
pub fn until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let tz = now.timezone();
    let next = now.date_naive().succ_opt().and_then(|day| {
        // Some zones jump over midnight; take the first hour that exists.
        (0..3).find_map(|hour| {
            let local = day.and_hms_opt(hour, 0, 0)?;
            tz.from_local_datetime(&local).earliest()
        })
    });
    let Some(next) = next else {
        return DAY;
    };
    let millis = next.timestamp_millis() - now.timestamp_millis();
    u64::try_from(millis)
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(DAY)
}

/// Owns the countdown and midnight timers. Dropping it stops and joins the
/// timer thread, so no `Tick`/`DailyReset` is sent after the drop returns.
pub struct TimerHandle {
    stop_tx: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// Stops and joins the timer thread. Errors if the thread panicked.
    pub fn stop(&mut self) -> Result<()> {
        // Dropping the sender wakes the thread with `Disconnected`.
        self.stop_tx.take();
        let Some(join) = self.join.take() else {
            return Ok(());
        };
        join.join().map_err(|_| anyhow!("timer thread panicked"))
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            eprintln!("error: {err:#}");
        }
    }
}

pub fn spawn_timers(tx: Sender<Delta>) -> TimerHandle {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let join = thread::spawn(move || {
        let mut next_tick = Instant::now() + TICK;
        let mut next_midnight = Instant::now() + until_next_midnight(&Local::now());

        loop {
            let wake = next_tick.min(next_midnight);
            let timeout = wake.saturating_duration_since(Instant::now());
            match stop_rx.recv_timeout(timeout) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }

            let now = Instant::now();
            if now >= next_tick {
                if tx.send(Delta::Tick).is_err() {
                    return;
                }
                next_tick += TICK;
                // Skip ticks missed while suspended instead of bursting them.
                if next_tick < now {
                    next_tick = now + TICK;
                }
            }
            if now >= next_midnight {
                if tx.send(Delta::DailyReset).is_err() {
                    return;
                }
                next_midnight = now + until_next_midnight(&Local::now());
            }
        }
    });

    TimerHandle {
        stop_tx: Some(stop_tx),
        join: Some(join),
    }
}
