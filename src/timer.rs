// timer.rs

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEnd {
    Finished,
    Cancelled,
}

pub trait Countdown {
    fn run(&mut self, seconds: u64) -> io::Result<CountdownEnd>;
}

extern "C" fn on_sigint(_: nix::libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Routes SIGINT to a flag while alive, restoring the previous disposition
/// on drop.
struct SigintGuard {
    previous: SigAction,
}

impl SigintGuard {
    fn install() -> io::Result<Self> {
        INTERRUPTED.store(false, Ordering::SeqCst);
        let action = SigAction::new(SigHandler::Handler(on_sigint), SaFlags::empty(), SigSet::empty());
        // the handler only touches an atomic
        let previous = unsafe { sigaction(Signal::SIGINT, &action) }?;
        Ok(Self { previous })
    }
}

impl Drop for SigintGuard {
    fn drop(&mut self) {
        if let Err(e) = unsafe { sigaction(Signal::SIGINT, &self.previous) } {
            log::warn!("could not restore SIGINT handler: {}", e);
        }
    }
}

fn too_long(what: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, format!("{} is too long", what))
}

/// Minutes to seconds, refusing a count whose seconds overflow `u64`.
pub fn minutes_to_seconds(minutes: u64) -> io::Result<u64> {
    minutes
        .checked_mul(60)
        .ok_or_else(|| too_long(format!("{} minutes", minutes)))
}

fn clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Redraws `mm:ss` in place on `out` until the time runs out or Ctrl-C.
pub struct TerminalCountdown<W: Write> {
    out: W,
}

impl<W: Write> TerminalCountdown<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Countdown for TerminalCountdown<W> {
    fn run(&mut self, seconds: u64) -> io::Result<CountdownEnd> {
        let end = Instant::now()
            .checked_add(Duration::from_secs(seconds))
            .ok_or_else(|| too_long(format!("a countdown of {} seconds", seconds)))?;
        let _guard = SigintGuard::install()?;
        let mut shown = None;
        loop {
            if INTERRUPTED.load(Ordering::SeqCst) {
                writeln!(self.out, "\nCancelled.")?;
                return Ok(CountdownEnd::Cancelled);
            }
            let remaining = end.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                writeln!(self.out, "\r{}", clock(0))?;
                return Ok(CountdownEnd::Finished);
            }
            let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
            if shown != Some(secs) {
                write!(self.out, "\r{}", clock(secs))?;
                self.out.flush()?;
                shown = Some(secs);
            }
            thread::sleep(TICK.min(remaining));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PomodoroPlan {
    pub work_minutes: u64,
    pub short_break_minutes: u64,
    pub cycles: u32,
}

impl Default for PomodoroPlan {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            cycles: 4,
        }
    }
}

/// Work and break periods back to back, no break after the last cycle.
/// Stops early when a countdown is cancelled. A plan whose periods do not
/// fit in seconds is refused before anything runs.
pub fn pomodoro<C, W>(countdown: &mut C, out: &mut W, plan: PomodoroPlan) -> io::Result<CountdownEnd>
where
    C: Countdown + ?Sized,
    W: Write + ?Sized,
{
    let work = minutes_to_seconds(plan.work_minutes)?;
    let short_break = minutes_to_seconds(plan.short_break_minutes)?;
    for cycle in 1..=plan.cycles {
        writeln!(out, "Cycle {}/{}: work {} min", cycle, plan.cycles, plan.work_minutes)?;
        if countdown.run(work)? == CountdownEnd::Cancelled {
            return Ok(CountdownEnd::Cancelled);
        }
        if cycle < plan.cycles {
            writeln!(out, "Short break {} min", plan.short_break_minutes)?;
            if countdown.run(short_break)? == CountdownEnd::Cancelled {
                return Ok(CountdownEnd::Cancelled);
            }
        }
    }
    writeln!(out, "Pomodoro complete!")?;
    Ok(CountdownEnd::Finished)
}
