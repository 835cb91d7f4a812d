#![warn(missing_docs)]

//! # desk-widgets
//!
//! A pair of small desk-accessory TUI widgets for
//! [bubbletea-rs](https://github.com/whit3rabbit/bubbletea-rs): a countdown
//! timer and a weather lookup panel.
//!
//! Each widget follows the Elm Architecture: a `Model` struct per module,
//! messages processed by `update()`, and a side-effect-free `view()` that
//! renders the current state to a string. User actions are plain methods that
//! mutate the model synchronously; anything periodic or remote (the countdown
//! tick, the weather HTTP lookup) runs as a `Cmd` and comes back through the
//! message queue, so widget state never races its own side effects.
//!
//! ## Components
//!
//! - [`countdown`] — duration entry, a remaining-seconds counter, and
//!   run/pause/reset transitions driven by a once-per-interval tick.
//! - [`weather`] — a location field bound to a current-conditions lookup
//!   behind the pluggable [`weather::Provider`] trait, with a
//!   `reqwest`-backed default provider.
//!
//! ## Quick Start
//!
//! ```rust
//! use desk_widgets::prelude::*;
//!
//! let mut countdown = countdown_new();
//! countdown.set_input("300");
//! countdown.set_duration();
//! let _cmd = countdown.start();
//! assert_eq!(countdown.view(), "05:00");
//! ```
//!
//! ## Integration with bubbletea-rs
//!
//! ```rust
//! use desk_widgets::prelude::*;
//! use bubbletea_rs::{Model, Cmd, Msg};
//!
//! struct App {
//!     countdown: Countdown,
//! }
//!
//! impl Model for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         (Self { countdown: countdown_new() }, None)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         if let Some(done) = msg.downcast_ref::<CountdownCompletedMsg>() {
//!             if done.id == self.countdown.id() {
//!                 // react to expiry
//!             }
//!         }
//!         self.countdown.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.countdown.view()
//!     }
//! }
//! ```

pub mod countdown;
pub mod weather;

pub use countdown::{
    format_time, new as countdown_new, new_with_interval as countdown_new_with_interval,
    CompletedMsg as CountdownCompletedMsg, Model as Countdown, RunState,
    TickMsg as CountdownTickMsg,
};
pub use weather::{
    condition_message, location_message, new as weather_new, temperature_message, LookupError,
    Model as Weather, Provider as WeatherProvider, ProviderFuture as WeatherProviderFuture,
    ReportMsg as WeatherReportMsg, WeatherApi, WeatherReport,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use desk_widgets::prelude::*;
///
/// let countdown = countdown_new();
/// assert_eq!(countdown.view(), "00:00");
/// ```
pub mod prelude {
    pub use crate::countdown::{
        format_time, new as countdown_new, new_with_interval as countdown_new_with_interval,
        CompletedMsg as CountdownCompletedMsg, Model as Countdown, RunState,
        TickMsg as CountdownTickMsg,
    };
    pub use crate::weather::{
        condition_message, location_message, new as weather_new, temperature_message, LookupError,
        Model as Weather, Provider as WeatherProvider, ProviderFuture as WeatherProviderFuture,
        ReportMsg as WeatherReportMsg, WeatherApi, WeatherReport,
    };
}
