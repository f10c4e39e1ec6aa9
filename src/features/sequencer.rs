//! Looping, timer-driven phase sequencer.
//!
//! [`PhaseSequencer`] is the state machine and takes the current time as an
//! argument, so it can be driven by a virtual clock. [`SequencerDriver`]
//! hosts one on a `calloop` loop with a single timer source.
//!
//! Each timer fire advances exactly one phase and the next deadline is
//! measured from the moment the fire was handled. A late timer therefore
//! shifts the rest of the schedule instead of replaying missed phases.

use anyhow::{ensure, Context, Result};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub name: String,
    pub duration_ms: u64,
}

impl PhaseSpec {
    pub fn new(name: &str, duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            duration_ms,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Validated, cyclic list of phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSequence {
    phases: Vec<PhaseSpec>,
    period: Duration,
}

impl PhaseSequence {
    pub fn new(phases: Vec<PhaseSpec>) -> Result<Self> {
        ensure!(!phases.is_empty(), "phase sequence needs at least one phase");
        for phase in &phases {
            ensure!(!phase.name.is_empty(), "phase names must not be empty");
            ensure!(
                phase.duration_ms > 0,
                "phase {:?} must have a positive duration",
                phase.name
            );
        }
        let period = phases.iter().map(PhaseSpec::duration).sum();
        Ok(Self { phases, period })
    }

    pub fn from_pairs(pairs: &[(&str, u64)]) -> Result<Self> {
        Self::new(pairs.iter().map(|&(name, ms)| PhaseSpec::new(name, ms)).collect())
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn phases(&self) -> &[PhaseSpec] {
        &self.phases
    }

    pub fn name(&self, index: usize) -> &str {
        &self.phases[index].name
    }

    pub fn duration(&self, index: usize) -> Duration {
        self.phases[index].duration()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.name == name)
    }

    /// Phase active `elapsed` after the start of an undisturbed run.
    pub fn phase_at(&self, elapsed: Duration) -> usize {
        let period = self.period.as_nanos();
        let mut offset = elapsed.as_nanos() % period;
        for (index, phase) in self.phases.iter().enumerate() {
            let length = phase.duration().as_nanos();
            if offset < length {
                return index;
            }
            offset -= length;
        }
        self.phases.len() - 1
    }
}

/// Emitted on start and on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange<'a> {
    pub index: usize,
    pub name: &'a str,
    /// Number of completed loops.
    pub cycle: u64,
    pub at: Duration,
    /// Length of the phase just entered.
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running {
        index: usize,
        cycle: u64,
        entered_at: Duration,
        deadline: Duration,
    },
    Stopped,
}

#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    label: String,
    sequence: PhaseSequence,
    state: State,
}

impl PhaseSequencer {
    pub fn new(label: &str, sequence: PhaseSequence) -> Self {
        Self {
            label: label.to_string(),
            sequence,
            state: State::Idle,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sequence(&self) -> &PhaseSequence {
        &self.sequence
    }

    /// Enters the first phase. Restarts from the top if already running.
    pub fn start(&mut self, now: Duration) -> PhaseChange<'_> {
        if self.is_running() {
            debug!("{}: restarting sequence", self.label);
        }
        self.state = State::Running {
            index: 0,
            cycle: 0,
            entered_at: now,
            deadline: now + self.sequence.duration(0),
        };
        info!(
            "{}: started at {:?} ({} phases, period {:?})",
            self.label,
            self.sequence.name(0),
            self.sequence.len(),
            self.sequence.period()
        );
        PhaseChange {
            index: 0,
            name: self.sequence.name(0),
            cycle: 0,
            at: now,
            duration: self.sequence.duration(0),
        }
    }

    /// Handles one timer fire. Advances a single phase if the current one
    /// has expired; an early fire is ignored.
    pub fn fire(&mut self, now: Duration) -> Option<PhaseChange<'_>> {
        let State::Running { index, cycle, deadline, .. } = self.state else {
            return None;
        };
        if now < deadline {
            return None;
        }
        let late = now - deadline;
        if late > self.sequence.duration(index) {
            debug!("{}: timer fired {:?} late, not replaying skipped phases", self.label, late);
        }
        let next = (index + 1) % self.sequence.len();
        let cycle = if next == 0 { cycle + 1 } else { cycle };
        self.state = State::Running {
            index: next,
            cycle,
            entered_at: now,
            deadline: now + self.sequence.duration(next),
        };
        debug!("{}: -> {:?} (cycle {})", self.label, self.sequence.name(next), cycle);
        Some(PhaseChange {
            index: next,
            name: self.sequence.name(next),
            cycle,
            at: now,
            duration: self.sequence.duration(next),
        })
    }

    pub fn stop(&mut self) {
        if !matches!(self.state, State::Stopped) {
            info!("{}: stopped", self.label);
        }
        self.state = State::Stopped;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// When the current phase expires, if running.
    pub fn deadline(&self) -> Option<Duration> {
        match self.state {
            State::Running { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            State::Running { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn current_phase(&self) -> Option<&str> {
        self.current_index().map(|i| self.sequence.name(i))
    }

    /// Fraction of the current phase elapsed at `now`, in [0, 1].
    pub fn phase_progress(&self, now: Duration) -> f32 {
        match self.state {
            State::Running { entered_at, deadline, .. } => {
                let length = (deadline - entered_at).as_secs_f32();
                let elapsed = now.saturating_sub(entered_at).as_secs_f32();
                (elapsed / length).clamp(0.0, 1.0)
            }
            State::Idle => 0.0,
            State::Stopped => 1.0,
        }
    }
}

struct Shared {
    sequencer: RefCell<PhaseSequencer>,
    stopped: Cell<bool>,
    /// Set while `on_change` runs.
    in_callback: Cell<bool>,
    epoch: Instant,
}

impl Shared {
    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.epoch)
    }
}

/// A running sequencer on a `calloop` loop. Dropping it stops it.
pub struct SequencerDriver<'l, D> {
    handle: LoopHandle<'l, D>,
    token: Option<RegistrationToken>,
    shared: Rc<Shared>,
}

impl<'l, D> SequencerDriver<'l, D> {
    /// Starts `sequence` immediately. `on_change` runs on every transition
    /// after the first phase; read [`Self::current_phase`] for the initial
    /// one.
    pub fn start<F>(
        handle: &LoopHandle<'l, D>,
        label: &str,
        sequence: PhaseSequence,
        mut on_change: F,
    ) -> Result<Self>
    where
        F: FnMut(PhaseChange<'_>, &mut D) + 'l,
    {
        let epoch = Instant::now();
        let mut sequencer = PhaseSequencer::new(label, sequence);
        sequencer.start(Duration::ZERO);
        let first = sequencer.sequence().duration(0);
        let sequence = sequencer.sequence().clone();

        let shared = Rc::new(Shared {
            sequencer: RefCell::new(sequencer),
            stopped: Cell::new(false),
            in_callback: Cell::new(false),
            epoch,
        });

        let inner = shared.clone();
        let token = handle
            .insert_source(Timer::from_duration(first), move |_, _, data| {
                if inner.stopped.get() {
                    return TimeoutAction::Drop;
                }
                let now = inner.elapsed();
                // Released before on_change so the driver can be queried and
                // stopped from inside it.
                let fired = inner
                    .sequencer
                    .borrow_mut()
                    .fire(now)
                    .map(|c| (c.index, c.cycle, c.at));
                if let Some((index, cycle, at)) = fired {
                    let change = PhaseChange {
                        index,
                        name: sequence.name(index),
                        cycle,
                        at,
                        duration: sequence.duration(index),
                    };
                    inner.in_callback.set(true);
                    on_change(change, data);
                    inner.in_callback.set(false);
                }
                let mut sequencer = inner.sequencer.borrow_mut();
                if inner.stopped.get() {
                    sequencer.stop();
                    return TimeoutAction::Drop;
                }
                match sequencer.deadline() {
                    Some(deadline) => TimeoutAction::ToInstant(inner.epoch + deadline),
                    None => TimeoutAction::Drop,
                }
            })
            .map_err(|e| e.error)
            .with_context(|| format!("registering timer for sequencer {label:?}"))?;

        Ok(Self {
            handle: handle.clone(),
            token: Some(token),
            shared,
        })
    }

    /// The phase being shown. Also valid from inside `on_change`, where it
    /// is the phase just entered.
    pub fn current_phase(&self) -> Option<String> {
        self.shared
            .sequencer
            .try_borrow()
            .ok()
            .and_then(|s| s.current_phase().map(str::to_string))
    }

    pub fn phase_progress(&self) -> f32 {
        match self.shared.sequencer.try_borrow() {
            Ok(s) => s.phase_progress(self.shared.elapsed()),
            Err(_) => 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.shared.stopped.get()
    }

    /// Cancels the pending timer. No transition is emitted afterwards.
    pub fn stop(&mut self) {
        if self.shared.stopped.replace(true) {
            return;
        }
        if self.shared.in_callback.get() {
            // The running callback sees the flag and drops its own timer.
            self.token = None;
            return;
        }
        self.shared.sequencer.borrow_mut().stop();
        if let Some(token) = self.token.take() {
            self.handle.remove(token);
        }
    }
}

impl<D> Drop for SequencerDriver<'_, D> {
    fn drop(&mut self) {
        self.stop();
    }
}
