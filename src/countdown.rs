//! Countdown widget for Bubble Tea applications.
//!
//! The countdown owns a user-entered duration, a remaining-seconds counter,
//! and the run/pause/reset transitions between them. While running, a tick
//! command decrements the counter once per interval until it reaches zero.
//!
//! # Basic Usage
//!
//! ```rust
//! use desk_widgets::countdown::{new, RunState};
//!
//! let mut countdown = new();
//! countdown.set_input("90");
//! countdown.set_duration();
//! assert_eq!(countdown.remaining(), 90);
//! assert_eq!(countdown.view(), "01:30");
//!
//! let _cmd = countdown.start();
//! assert_eq!(countdown.state(), RunState::Running);
//! ```
//!
//! # bubbletea-rs Integration
//!
//! ```rust
//! use bubbletea_rs::{Model as BubbleTeaModel, Msg, Cmd};
//! use desk_widgets::countdown::{new, Model, CompletedMsg};
//!
//! struct MyApp {
//!     countdown: Model,
//! }
//!
//! impl BubbleTeaModel for MyApp {
//!     fn init() -> (Self, Option<Cmd>) {
//!         (Self { countdown: new() }, None)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         // Handle expiry
//!         if let Some(done) = msg.downcast_ref::<CompletedMsg>() {
//!             if done.id == self.countdown.id() {
//!                 // Countdown finished!
//!             }
//!         }
//!
//!         // Forward tick messages
//!         self.countdown.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         format!("Time remaining: {}", self.countdown.view())
//!     }
//! }
//! ```
//!
//! # Input Handling
//!
//! Duration entry is deliberately forgiving: the raw text is parsed on every
//! edit, and anything that is not a strictly positive integer simply never
//! commits. There is no error to surface; the counter keeps its previous
//! value.
//!
//! ```rust
//! use desk_widgets::countdown::new;
//!
//! let mut countdown = new();
//! countdown.set_input("not a number");
//! countdown.set_duration();
//! assert_eq!(countdown.remaining(), 0); // unchanged
//! ```

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Model as BubbleTeaModel, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

// Internal ID management for countdown instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generates unique identifiers for countdown instances.
///
/// Each countdown gets a unique ID so that several instances can coexist in
/// one application without consuming each other's tick messages. IDs are
/// generated atomically and start from 1.
fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Formats a whole number of seconds as a zero-padded `MM:SS` string.
///
/// Minutes are not clamped to 59; a four-hour countdown renders as
/// `"240:00"`.
///
/// # Examples
///
/// ```rust
/// use desk_widgets::countdown::format_time;
///
/// assert_eq!(format_time(0), "00:00");
/// assert_eq!(format_time(65), "01:05");
/// assert_eq!(format_time(3600), "60:00");
/// ```
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// The run state of a countdown.
///
/// `Completed` is reached only through tick expiry; its observable counter
/// state is identical to a reset `Idle` (zero remaining, not running), but
/// hosts often want to react to expiry specifically, so the distinction is
/// kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No countdown is in progress. Remaining seconds may be zero or a
    /// freshly committed duration waiting for [`Model::start`].
    Idle,
    /// A tick command is live and decrementing the counter once per interval.
    Running,
    /// A countdown exists but ticking is suspended. [`Model::start`] resumes
    /// from the current remaining value.
    Paused,
    /// The counter reached zero via decrement. Terminal until a new duration
    /// is committed (or `reset` returns the widget to `Idle`).
    Completed,
}

/// Ownership token for the live tick stream.
///
/// Exactly one handle exists while the countdown is running, held by the
/// model. Every entry into the running state replaces the handle with one
/// carrying a fresh generation tag, and every `TickMsg` carries the tag of
/// the handle that scheduled it, so a tick scheduled before a pause, reset,
/// or restart arrives with a dead tag and is dropped. Cancellation is
/// idempotent: clearing an already-cleared handle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    tag: u64,
}

/// Message sent on every countdown tick.
///
/// Generated by the countdown's own tick command; hosts only need to forward
/// it to [`Model::update`]. Ticks are filtered by instance `id` and by the
/// scheduling handle's generation `tag`, which is what prevents two
/// concurrent decrement streams after rapid pause/resume sequences.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// The unique identifier of the countdown that scheduled this tick.
    pub id: i64,
    /// Generation tag of the handle that scheduled this tick. Stale tags are
    /// rejected by `update`.
    tag: u64,
}

/// Message sent when the counter reaches zero.
///
/// Delivered once, after the final decrement, alongside the transition to
/// [`RunState::Completed`].
///
/// # Examples
///
/// ```rust
/// use desk_widgets::countdown::{new, CompletedMsg};
/// use bubbletea_rs::Msg;
///
/// let countdown = new();
/// let msg: Msg = Box::new(CompletedMsg { id: countdown.id() });
/// assert!(msg.downcast_ref::<CompletedMsg>().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct CompletedMsg {
    /// The unique identifier of the countdown that expired.
    pub id: i64,
}

/// Countdown widget model.
///
/// Follows the Elm Architecture: user actions mutate the model synchronously,
/// while the periodic decrement arrives as a [`TickMsg`] through
/// [`Model::update`] on the same single-threaded message queue. No tick can
/// observe a half-applied action and no action can race a tick.
///
/// # Examples
///
/// ```rust
/// use desk_widgets::countdown::{new, RunState};
///
/// let mut c = new();
/// c.set_input("10");
/// c.set_duration();
/// let _cmd = c.start();
/// assert!(c.is_running());
///
/// c.pause();
/// assert_eq!(c.state(), RunState::Paused);
///
/// c.reset();
/// assert_eq!(c.remaining(), 0);
/// assert_eq!(c.input(), "10"); // reset keeps the entered duration
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    /// Raw duration text as last entered by the user.
    input: String,
    /// Parsed duration in seconds; `None` unless the raw text is a strictly
    /// positive integer.
    duration: Option<u64>,
    /// The authoritative countdown value, in whole seconds. Floor is 0.
    remaining: u64,
    state: RunState,
    /// Time between ticks. Each tick still removes exactly one second from
    /// `remaining`; shrinking the interval speeds the countdown up rather
    /// than refining it.
    interval: Duration,
    id: i64,
    /// Live tick stream token; `Some` only while `state` is `Running`.
    handle: Option<TickHandle>,
    /// Generation counter for tick handles. Never reused within an instance.
    next_tag: u64,
}

/// Creates a new idle countdown with the default 1-second tick interval.
///
/// # Examples
///
/// ```rust
/// use desk_widgets::countdown::{new, RunState};
///
/// let countdown = new();
/// assert_eq!(countdown.remaining(), 0);
/// assert_eq!(countdown.state(), RunState::Idle);
/// assert!(!countdown.is_running());
/// ```
pub fn new() -> Model {
    new_with_interval(Duration::from_secs(1))
}

/// Creates a new idle countdown with a custom tick interval.
///
/// The counter still moves one second per tick; a shorter interval makes the
/// countdown run faster than wall-clock time. Useful for demos and tests.
///
/// # Examples
///
/// ```rust
/// use desk_widgets::countdown::new_with_interval;
/// use std::time::Duration;
///
/// let countdown = new_with_interval(Duration::from_millis(50));
/// assert_eq!(countdown.interval(), Duration::from_millis(50));
/// ```
pub fn new_with_interval(interval: Duration) -> Model {
    Model {
        input: String::new(),
        duration: None,
        remaining: 0,
        state: RunState::Idle,
        interval,
        id: next_id(),
        handle: None,
        next_tag: 0,
    }
}

impl Model {
    /// Returns the unique identifier of this countdown instance.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the raw duration text as last entered.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the parsed duration, if the current input is a strictly
    /// positive integer number of seconds.
    pub fn duration(&self) -> Option<u64> {
        self.duration
    }

    /// Returns the remaining whole seconds.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns the current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Returns whether the countdown is actively ticking.
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Returns whether the countdown is paused.
    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    /// Records a user edit of the duration field.
    ///
    /// The raw text is kept for display and parsed immediately: anything
    /// other than a strictly positive integer (empty, zero, negative,
    /// non-numeric) parses to "no value". Parse failures never raise; they
    /// just leave nothing for [`set_duration`](Model::set_duration) to
    /// commit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use desk_widgets::countdown::new;
    ///
    /// let mut c = new();
    /// c.set_input("42");
    /// assert_eq!(c.duration(), Some(42));
    ///
    /// c.set_input("0");
    /// assert_eq!(c.duration(), None);
    ///
    /// c.set_input("nonsense");
    /// assert_eq!(c.duration(), None);
    /// ```
    pub fn set_input(&mut self, raw: impl Into<String>) {
        self.input = raw.into();
        self.duration = self
            .input
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|&secs| secs > 0);
    }

    /// Commits the entered duration into the remaining counter.
    ///
    /// If the current input holds a strictly positive integer, the counter is
    /// set to it, any live tick stream is cancelled, and the state returns to
    /// [`RunState::Idle`] awaiting [`start`](Model::start). Invalid input is
    /// rejected silently: no state changes and no error is raised.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use desk_widgets::countdown::new;
    ///
    /// let mut c = new();
    /// c.set_input("30");
    /// c.set_duration();
    /// assert_eq!(c.remaining(), 30);
    ///
    /// c.set_input("-1");
    /// c.set_duration();
    /// assert_eq!(c.remaining(), 30); // silent no-op
    /// ```
    pub fn set_duration(&mut self) {
        if let Some(secs) = self.duration {
            self.remaining = secs;
            self.state = RunState::Idle;
            self.cancel();
        }
    }

    /// Starts or resumes the countdown.
    ///
    /// A no-op when nothing remains (including the `Completed` state).
    /// Resuming from `Paused` continues from the current counter value.
    /// Entering the running state always cancels any pre-existing tick
    /// stream before scheduling a new one, so repeated starts can never
    /// compound into multiple decrements per interval.
    ///
    /// # Returns
    ///
    /// The tick command to hand to the runtime, or `None` if the start was a
    /// no-op.
    pub fn start(&mut self) -> Option<Cmd> {
        if self.remaining == 0 {
            return None;
        }
        self.cancel();
        self.handle = Some(TickHandle {
            tag: self.next_tag(),
        });
        self.state = RunState::Running;
        Some(self.tick())
    }

    /// Pauses a running countdown.
    ///
    /// The tick stream is cancelled immediately; a tick already scheduled
    /// before the pause carries a dead handle tag and will be dropped. The
    /// counter keeps its value, so a later [`start`](Model::start) resumes
    /// exactly where the countdown left off. A no-op unless running.
    pub fn pause(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        self.cancel();
        self.state = RunState::Paused;
    }

    /// Resets the countdown unconditionally.
    ///
    /// The counter drops to zero, any live tick stream is cancelled, and the
    /// state returns to [`RunState::Idle`]. The entered duration text is left
    /// untouched; only the countdown itself is reset.
    pub fn reset(&mut self) {
        self.cancel();
        self.state = RunState::Idle;
        self.remaining = 0;
    }

    /// Returns the message the live tick stream will deliver next, if the
    /// countdown is running.
    ///
    /// Mostly useful for tests and for hosts that drive the widget manually.
    pub fn tick_msg(&self) -> Option<TickMsg> {
        self.handle.map(|handle| TickMsg {
            id: self.id,
            tag: handle.tag,
        })
    }

    /// Cancels the live tick stream, if any. Idempotent.
    ///
    /// The handle is cleared and its tag retired; in-flight ticks scheduled
    /// under the old tag no longer match anything and are rejected on
    /// arrival.
    fn cancel(&mut self) {
        self.handle = None;
    }

    fn next_tag(&mut self) -> u64 {
        self.next_tag += 1;
        self.next_tag
    }

    /// Schedules the next tick under the current handle.
    fn tick(&self) -> Cmd {
        let id = self.id;
        let tag = self.handle.map(|handle| handle.tag).unwrap_or_default();
        bubbletea_tick(self.interval, move |_| Box::new(TickMsg { id, tag }) as Msg)
    }

    /// Emits the completion notification.
    fn completed_cmd(&self) -> Cmd {
        let id = self.id;
        bubbletea_tick(Duration::from_nanos(1), move |_| {
            Box::new(CompletedMsg { id }) as Msg
        })
    }

    /// Processes tick messages and advances the countdown.
    ///
    /// Ticks are accepted only when all of the following hold: the countdown
    /// is running, the message's `id` matches this instance, and the
    /// message's generation tag matches the live handle. Everything else is
    /// ignored and returns `None`.
    ///
    /// An accepted tick either decrements the counter and schedules the next
    /// tick, or — when one second or less remains — floors the counter at
    /// zero, cancels the handle, transitions to [`RunState::Completed`], and
    /// returns the command that delivers [`CompletedMsg`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use desk_widgets::countdown::{new, RunState};
    ///
    /// let mut c = new();
    /// c.set_input("2");
    /// c.set_duration();
    /// let _cmd = c.start();
    ///
    /// let tick = c.tick_msg().unwrap();
    /// c.update(Box::new(tick));
    /// assert_eq!(c.remaining(), 1);
    ///
    /// let tick = c.tick_msg().unwrap();
    /// c.update(Box::new(tick));
    /// assert_eq!(c.remaining(), 0);
    /// assert_eq!(c.state(), RunState::Completed);
    /// ```
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(tick_msg) = msg.downcast_ref::<TickMsg>() {
            if tick_msg.id != self.id || self.state != RunState::Running {
                return None;
            }

            // Reject ticks from a retired handle. This is what stops a tick
            // scheduled just before a pause, reset, or restart from landing
            // afterwards and double-decrementing.
            let live_tag = match self.handle {
                Some(handle) => handle.tag,
                None => return None,
            };
            if tick_msg.tag != live_tag {
                return None;
            }

            if self.remaining <= 1 {
                self.remaining = 0;
                self.cancel();
                self.state = RunState::Completed;
                return Some(self.completed_cmd());
            }

            self.remaining -= 1;
            return Some(self.tick());
        }

        None
    }

    /// Renders the remaining time as `MM:SS`.
    pub fn view(&self) -> String {
        format_time(self.remaining)
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        (new(), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}

impl Default for Model {
    fn default() -> Self {
        new()
    }
}
