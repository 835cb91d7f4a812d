//! Weather lookup widget for Bubble Tea applications.
//!
//! The widget binds a free-text location field to a remote current-conditions
//! lookup. The remote service sits behind the [`Provider`] trait; the crate
//! ships [`WeatherApi`], a `reqwest`-backed provider for weatherapi.com, and
//! tests or hosts can plug in their own.
//!
//! Unlike the countdown, there is no state machine here: one request, one
//! response, and a small amount of display state (report, error message,
//! loading flag).
//!
//! # Basic Usage
//!
//! ```rust
//! use desk_widgets::weather::{new, Provider, ProviderFuture, WeatherReport, LookupError};
//! use std::sync::Arc;
//!
//! struct Stub;
//!
//! impl Provider for Stub {
//!     fn fetch(&self, location: String) -> ProviderFuture {
//!         Box::pin(async move {
//!             Ok(WeatherReport {
//!                 temperature_celsius: 21.0,
//!                 condition: "Sunny".to_string(),
//!                 location,
//!             })
//!         })
//!     }
//! }
//!
//! let mut weather = new(Arc::new(Stub));
//! weather.set_location("Lisbon");
//! let cmd = weather.submit();
//! assert!(cmd.is_some()); // lookup dispatched
//! assert!(weather.is_loading());
//! ```
//!
//! # bubbletea-rs Integration
//!
//! Hand the command returned by [`Model::submit`] to the runtime and forward
//! the resulting [`ReportMsg`] back into [`Model::update`]:
//!
//! ```rust,ignore
//! fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!     if enter_pressed {
//!         return self.weather.submit();
//!     }
//!     self.weather.update(msg)
//! }
//! ```

use bubbletea_rs::{Cmd, Msg};
use chrono::{Local, Timelike};
use lipgloss_extras::prelude::*;
use log::{debug, warn};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use thiserror::Error;

// Internal ID management for weather widget instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Shown when the submitted location is empty or whitespace-only. No request
/// is dispatched in that case.
pub const INVALID_LOCATION_MESSAGE: &str = "Please enter a valid location";

/// The single user-facing failure message. "Location not found" and transport
/// failures deliberately collapse into this one string; the [`LookupError`]
/// taxonomy is available to hosts that want to distinguish them.
pub const LOOKUP_FAILED_MESSAGE: &str = "City not found. Please try again!";

const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

/// Environment variable holding the weatherapi.com API key, read by
/// [`WeatherApi::from_env`].
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Current conditions for a location, as reported by a [`Provider`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Air temperature in degrees Celsius.
    pub temperature_celsius: f64,
    /// Free-text condition description, e.g. "Partly cloudy".
    pub condition: String,
    /// The provider's canonical name for the matched location.
    pub location: String,
}

/// Why a lookup failed.
///
/// The default widget behavior maps every variant to
/// [`LOOKUP_FAILED_MESSAGE`]; the taxonomy exists for hosts that want finer
/// handling.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    /// The provider does not know the requested location.
    #[error("location not found")]
    NotFound,
    /// The provider could not be reached, or answered with a server error.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The provider answered, but the body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The future a [`Provider`] lookup resolves to.
pub type ProviderFuture = Pin<Box<dyn Future<Output = Result<WeatherReport, LookupError>> + Send>>;

/// The remote weather service, seen from the widget.
///
/// Implementations take a free-text location (already trimmed and known to be
/// non-empty; the widget validates that locally before dispatching) and
/// resolve to a report or a [`LookupError`].
pub trait Provider: Send + Sync {
    /// Looks up current conditions for `location`.
    fn fetch(&self, location: String) -> ProviderFuture;
}

/// Message carrying the outcome of a dispatched lookup.
///
/// Produced by the command returned from [`Model::submit`]; forward it to
/// [`Model::update`]. Results are filtered by instance `id` so multiple
/// weather widgets can coexist.
#[derive(Debug)]
pub struct ReportMsg {
    /// The unique identifier of the widget that dispatched the lookup.
    pub id: i64,
    /// The lookup outcome.
    pub result: Result<WeatherReport, LookupError>,
}

/// Weather lookup widget model.
///
/// Display state follows one rule: a report and an error message are never
/// shown together. Any failure clears previously displayed weather data.
#[derive(Clone)]
pub struct Model {
    /// Raw location text as last entered by the user.
    location: String,
    report: Option<WeatherReport>,
    error: Option<String>,
    loading: bool,
    id: i64,
    provider: Arc<dyn Provider>,
    error_style: Style,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("location", &self.location)
            .field("report", &self.report)
            .field("error", &self.error)
            .field("loading", &self.loading)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Creates a new weather widget backed by the given provider.
///
/// # Examples
///
/// ```rust,no_run
/// use desk_widgets::weather::{new, WeatherApi};
/// use std::sync::Arc;
///
/// let weather = new(Arc::new(WeatherApi::new("my-api-key")));
/// assert!(weather.report().is_none());
/// ```
pub fn new(provider: Arc<dyn Provider>) -> Model {
    Model {
        location: String::new(),
        report: None,
        error: None,
        loading: false,
        id: next_id(),
        provider,
        error_style: Style::new().foreground(Color::from("9")),
    }
}

impl Model {
    /// Returns the unique identifier of this widget instance.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the raw location text as last entered.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the currently displayed report, if any.
    pub fn report(&self) -> Option<&WeatherReport> {
        self.report.as_ref()
    }

    /// Returns the currently displayed error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns whether a lookup is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sets the style used to render error messages.
    pub fn with_error_style(mut self, style: Style) -> Self {
        self.error_style = style;
        self
    }

    /// Records a user edit of the location field.
    pub fn set_location(&mut self, raw: impl Into<String>) {
        self.location = raw.into();
    }

    /// Submits the current location for lookup.
    ///
    /// A whitespace-only location is rejected locally: the error message is
    /// set, any displayed report is cleared, and no request goes out (returns
    /// `None`). Otherwise the widget enters its loading state and returns the
    /// command that performs the lookup and delivers a [`ReportMsg`].
    pub fn submit(&mut self) -> Option<Cmd> {
        let location = self.location.trim().to_string();
        if location.is_empty() {
            self.report = None;
            self.error = Some(INVALID_LOCATION_MESSAGE.to_string());
            return None;
        }

        self.loading = true;
        self.error = None;

        let id = self.id;
        let provider = Arc::clone(&self.provider);
        Some(Box::pin(async move {
            let result = provider.fetch(location).await;
            Some(Box::new(ReportMsg { id, result }) as Msg)
        }))
    }

    /// Processes lookup results.
    ///
    /// On a matching [`ReportMsg`], leaves the loading state and either shows
    /// the report (clearing any error) or shows the generic failure message
    /// (clearing any stale report). Messages for other instances and
    /// unrelated message types are ignored.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(report_msg) = msg.downcast_ref::<ReportMsg>() {
            if report_msg.id != self.id {
                return None;
            }

            self.loading = false;
            match &report_msg.result {
                Ok(report) => {
                    self.report = Some(report.clone());
                    self.error = None;
                }
                Err(err) => {
                    warn!("weather lookup failed: {err}");
                    self.report = None;
                    self.error = Some(LOOKUP_FAILED_MESSAGE.to_string());
                }
            }
        }

        None
    }

    /// Renders the widget: a loading line, a styled error, or the three
    /// commentary lines for the current report.
    pub fn view(&self) -> String {
        if self.loading {
            return "Loading...".to_string();
        }
        if let Some(error) = &self.error {
            return self.error_style.render(error);
        }
        match &self.report {
            Some(report) => [
                temperature_message(report.temperature_celsius),
                location_message(&report.location),
                condition_message(&report.condition),
            ]
            .join("\n"),
            None => String::new(),
        }
    }
}

/// Phrases a Celsius temperature as a short comment.
///
/// # Examples
///
/// ```rust
/// use desk_widgets::weather::temperature_message;
///
/// assert_eq!(temperature_message(-3.0), "It's freezing at -3°C!");
/// assert_eq!(temperature_message(24.0), "It's a pleasant temperature at 24°C.");
/// ```
pub fn temperature_message(celsius: f64) -> String {
    if celsius < 0.0 {
        format!("It's freezing at {celsius}°C!")
    } else if celsius < 10.0 {
        format!("It's quite cold at {celsius}°C.")
    } else if celsius < 20.0 {
        format!("It's a bit chilly at {celsius}°C.")
    } else if celsius < 30.0 {
        format!("It's a pleasant temperature at {celsius}°C.")
    } else {
        format!("It's warm at {celsius}°C.")
    }
}

/// Phrases a condition description as a short comment.
///
/// Known conditions get a friendly line; anything else is echoed verbatim.
pub fn condition_message(condition: &str) -> String {
    match condition.to_lowercase().as_str() {
        "sunny" => "It's a beautiful sunny day!".to_string(),
        "partly cloudy" => "It's a lovely day with some clouds!".to_string(),
        "overcast" => "It's a bit gloomy with overcast skies.".to_string(),
        "rain" => "Don't forget your umbrella; it's raining!".to_string(),
        "snow" => "It's a winter wonderland out there with snow!".to_string(),
        "fog" => "Be careful; it's quite foggy today.".to_string(),
        _ => condition.to_string(),
    }
}

/// Phrases a location with day/night context from the local clock.
pub fn location_message(location: &str) -> String {
    location_message_at(location, Local::now().hour())
}

fn location_message_at(location: &str, hour: u32) -> String {
    let is_night = !(6..18).contains(&hour);
    format!(
        "{} {}",
        location,
        if is_night { "at night" } else { "during the day" }
    )
}

// weatherapi.com current.json response, reduced to the fields we keep.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    location: ApiLocation,
    current: ApiCurrent,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temp_c: f64,
    condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    text: String,
}

/// [`Provider`] backed by the weatherapi.com current-conditions endpoint.
///
/// # Examples
///
/// ```rust,no_run
/// use desk_widgets::weather::{new, WeatherApi};
/// use std::sync::Arc;
///
/// let provider = WeatherApi::from_env().expect("WEATHER_API_KEY not set");
/// let weather = new(Arc::new(provider));
/// ```
#[derive(Debug, Clone)]
pub struct WeatherApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherApi {
    /// Creates a provider with the given API key and the default service URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a provider from the [`API_KEY_ENV`] environment variable, or
    /// `None` if it is unset.
    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV).ok().map(Self::new)
    }

    /// Overrides the service base URL. Intended for tests and self-hosted
    /// mirrors.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/current.json", self.base_url)
    }
}

impl Provider for WeatherApi {
    fn fetch(&self, location: String) -> ProviderFuture {
        let client = self.client.clone();
        let url = self.endpoint();
        let api_key = self.api_key.clone();

        Box::pin(async move {
            debug!("requesting current conditions for {location:?}");

            let response = client
                .get(&url)
                .query(&[("key", api_key.as_str()), ("q", location.as_str())])
                .send()
                .await
                .map_err(|err| LookupError::Transport(err.to_string()))?;

            // weatherapi.com answers 400 for unknown locations.
            let status = response.status();
            if status == reqwest::StatusCode::BAD_REQUEST
                || status == reqwest::StatusCode::NOT_FOUND
            {
                return Err(LookupError::NotFound);
            }
            let response = response
                .error_for_status()
                .map_err(|err| LookupError::Transport(err.to_string()))?;

            let body: ApiResponse = response
                .json()
                .await
                .map_err(|err| LookupError::Malformed(err.to_string()))?;

            Ok(WeatherReport {
                temperature_celsius: body.current.temp_c,
                condition: body.current.condition.text,
                location: body.location.name,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubProvider {
        result: Result<WeatherReport, LookupError>,
    }

    impl Provider for StubProvider {
        fn fetch(&self, _location: String) -> ProviderFuture {
            let result = self.result.clone();
            Box::pin(async move { result })
        }
    }

    fn sample_report() -> WeatherReport {
        WeatherReport {
            temperature_celsius: 21.5,
            condition: "Partly cloudy".to_string(),
            location: "Lisbon".to_string(),
        }
    }

    fn widget_with(result: Result<WeatherReport, LookupError>) -> Model {
        new(Arc::new(StubProvider { result }))
    }

    #[test]
    fn test_whitespace_location_is_rejected_locally() {
        for blank in ["", "   ", "\t\n"] {
            let mut w = widget_with(Ok(sample_report()));
            w.set_location(blank);
            let cmd = w.submit();

            assert!(cmd.is_none(), "location {:?} must not dispatch", blank);
            assert!(!w.is_loading());
            assert_eq!(w.error(), Some(INVALID_LOCATION_MESSAGE));
            assert!(w.report().is_none());
        }
    }

    #[test]
    fn test_rejected_submit_clears_stale_report() {
        let mut w = widget_with(Ok(sample_report()));
        w.report = Some(sample_report());

        w.set_location("   ");
        assert!(w.submit().is_none());
        assert!(w.report().is_none());
        assert_eq!(w.error(), Some(INVALID_LOCATION_MESSAGE));
    }

    #[tokio::test]
    async fn test_successful_lookup_shows_report() {
        let mut w = widget_with(Ok(sample_report()));
        w.set_location("  Lisbon  ");

        let cmd = w.submit().expect("valid location should dispatch");
        assert!(w.is_loading());
        assert!(w.error().is_none());

        let msg = cmd.await.expect("lookup command should yield a message");
        w.update(msg);

        assert!(!w.is_loading());
        assert_eq!(w.report(), Some(&sample_report()));
        assert!(w.error().is_none());
    }

    #[tokio::test]
    async fn test_not_found_clears_report_and_sets_error() {
        let mut w = widget_with(Err(LookupError::NotFound));
        w.report = Some(sample_report());
        w.set_location("Atlantis");

        let cmd = w.submit().expect("valid location should dispatch");
        let msg = cmd.await.expect("lookup command should yield a message");
        w.update(msg);

        assert!(!w.is_loading());
        assert!(w.report().is_none(), "stale report must not survive an error");
        assert_eq!(w.error(), Some(LOOKUP_FAILED_MESSAGE));
    }

    #[test]
    fn test_transport_failure_maps_to_same_message() {
        // The single-message collapse: transport errors read identically to
        // not-found at the UI boundary.
        let mut w = widget_with(Ok(sample_report()));
        let msg: Msg = Box::new(ReportMsg {
            id: w.id(),
            result: Err(LookupError::Transport("connection refused".to_string())),
        });
        w.update(msg);
        assert_eq!(w.error(), Some(LOOKUP_FAILED_MESSAGE));
    }

    #[test]
    fn test_results_for_other_instances_are_ignored() {
        let mut w = widget_with(Ok(sample_report()));
        w.loading = true;
        let msg: Msg = Box::new(ReportMsg {
            id: w.id() + 999,
            result: Ok(sample_report()),
        });
        w.update(msg);

        assert!(w.is_loading());
        assert!(w.report().is_none());
    }

    #[test]
    fn test_view_states() {
        let mut w = widget_with(Ok(sample_report()));
        assert_eq!(w.view(), "");

        w.loading = true;
        assert_eq!(w.view(), "Loading...");

        w.loading = false;
        w.report = Some(sample_report());
        let view = w.view();
        assert!(view.contains("21.5°C"));
        assert!(view.contains("Lisbon"));
        assert!(view.contains("clouds"));
    }

    #[test]
    fn test_temperature_message_bands() {
        assert_eq!(temperature_message(-5.0), "It's freezing at -5°C!");
        assert_eq!(temperature_message(4.0), "It's quite cold at 4°C.");
        assert_eq!(temperature_message(15.0), "It's a bit chilly at 15°C.");
        assert_eq!(
            temperature_message(25.0),
            "It's a pleasant temperature at 25°C."
        );
        assert_eq!(temperature_message(33.0), "It's warm at 33°C.");
    }

    #[test]
    fn test_condition_message_known_and_unknown() {
        assert_eq!(condition_message("Sunny"), "It's a beautiful sunny day!");
        assert_eq!(
            condition_message("partly cloudy"),
            "It's a lovely day with some clouds!"
        );
        assert_eq!(
            condition_message("Fog"),
            "Be careful; it's quite foggy today."
        );
        // Unknown conditions pass through untouched.
        assert_eq!(condition_message("Volcanic ash"), "Volcanic ash");
    }

    #[test]
    fn test_location_message_day_night_boundaries() {
        assert_eq!(location_message_at("Oslo", 5), "Oslo at night");
        assert_eq!(location_message_at("Oslo", 6), "Oslo during the day");
        assert_eq!(location_message_at("Oslo", 17), "Oslo during the day");
        assert_eq!(location_message_at("Oslo", 18), "Oslo at night");
        assert_eq!(location_message_at("Oslo", 23), "Oslo at night");
    }

    #[test]
    fn test_api_response_mapping() {
        let json = r#"{
            "location": { "name": "Lisbon", "country": "Portugal" },
            "current": {
                "temp_c": 21.5,
                "condition": { "text": "Partly cloudy", "code": 1003 }
            }
        }"#;
        let body: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.location.name, "Lisbon");
        assert_eq!(body.current.temp_c, 21.5);
        assert_eq!(body.current.condition.text, "Partly cloudy");
    }

    #[test]
    fn test_weather_api_endpoint() {
        let provider = WeatherApi::new("k").with_base_url("http://localhost:9999/v1");
        assert_eq!(provider.endpoint(), "http://localhost:9999/v1/current.json");
    }
}
