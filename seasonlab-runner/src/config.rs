//! Serializable analysis configuration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use seasonlab_core::calendar::{CalendarError, CalendarOverrides, CalendarRuleEngine};
use seasonlab_core::domain::Timeframe;
use seasonlab_core::extract::{EventWindowConfig, PeriodType};

/// Content-addressable identifier of an analysis configuration.
pub type ConfigId = String;

/// Errors from parsing or validating an [`AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("symbol must not be empty")]
    EmptySymbol,
    #[error("period '{0:?}' listed more than once")]
    DuplicatePeriod(PeriodType),
    #[error("event window '{0}' listed more than once")]
    DuplicateWindow(String),
    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything needed to reproduce one seasonality analysis.
///
/// ```toml
/// symbol = "SPY"
/// timeframe = "daily"
/// periods = ["month", "weekday", "fomc_week"]
/// include_volatility = true
///
/// [[event_windows]]
/// event = "cpi"
/// half_width = 3
///
/// [calendar.meeting_dates]
/// boj = ["2027-01-22"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub symbol: String,

    #[serde(default)]
    pub timeframe: Timeframe,

    /// Extractors to run. Defaults to [`PeriodType::default_set`].
    #[serde(default = "PeriodType::default_set")]
    pub periods: Vec<PeriodType>,

    /// Report the population standard deviation of every bucket.
    #[serde(default)]
    pub include_volatility: bool,

    /// Extra T-N..T+N windows on top of `periods`.
    #[serde(default)]
    pub event_windows: Vec<EventWindowConfig>,

    #[serde(default)]
    pub calendar: CalendarOverrides,
}

impl AnalysisConfig {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: Timeframe::default(),
            periods: PeriodType::default_set(),
            include_volatility: false,
            event_windows: Vec::new(),
            calendar: CalendarOverrides::default(),
        }
    }

    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub fn with_periods(mut self, periods: Vec<PeriodType>) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_volatility(mut self, include: bool) -> Self {
        self.include_volatility = include;
        self
    }

    pub fn with_event_window(mut self, window: EventWindowConfig) -> Self {
        self.event_windows.push(window);
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read analysis config {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Failed to parse analysis config {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        let mut seen = HashSet::new();
        for period in &self.periods {
            if !seen.insert(*period) {
                return Err(ConfigError::DuplicatePeriod(*period));
            }
        }
        let mut names = HashSet::new();
        let builtin = self.periods.iter().filter_map(PeriodType::window_config);
        for window in builtin.chain(self.event_windows.iter().cloned()) {
            let name = window.name();
            if !names.insert(name.clone()) {
                return Err(ConfigError::DuplicateWindow(name));
            }
        }
        Ok(())
    }

    /// Build the calendar engine this configuration describes.
    pub fn build_calendar(&self) -> Result<CalendarRuleEngine, ConfigError> {
        Ok(CalendarRuleEngine::new(&self.calendar)?)
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two configs with identical content share an id, so results keyed by
    /// it can be reused across runs.
    pub fn config_id(&self) -> Result<ConfigId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seasonlab_core::extract::WindowEvent;

    const SAMPLE: &str = r#"
symbol = "SPY"
timeframe = "hourly"
periods = ["month", "hour_of_day", "fomc_week", "combined_events"]
include_volatility = true

[[event_windows]]
event = "cpi"
half_width = 3

[[event_windows]]
event = "boe"
prefix = "BOE"

[calendar.meeting_dates]
boj = ["2027-01-22"]

[[calendar.custom_events]]
date = "2027-01-20"
name = "Inauguration"
impact = "medium"
"#;

    #[test]
    fn test_parse_full_document() {
        let config = AnalysisConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.symbol, "SPY");
        assert_eq!(config.timeframe, Timeframe::Hourly);
        assert_eq!(config.periods.len(), 4);
        assert!(config.include_volatility);
        assert_eq!(config.event_windows.len(), 2);
        assert_eq!(config.event_windows[0].event, WindowEvent::Cpi);
        assert_eq!(config.event_windows[0].half_width, 3);
        assert!(config.event_windows[0].skip_weekends);
        assert_eq!(config.event_windows[1].name(), "boe_window");
        assert_eq!(config.calendar.custom_events.len(), 1);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = AnalysisConfig::from_toml(r#"symbol = "QQQ""#).unwrap();
        assert_eq!(config, AnalysisConfig::new("QQQ"));
        assert_eq!(config.periods, PeriodType::default_set());
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let err = AnalysisConfig::from_toml(r#"symbol = "  ""#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySymbol));
    }

    #[test]
    fn test_duplicate_period_rejected() {
        let err = AnalysisConfig::from_toml(
            r#"
symbol = "SPY"
periods = ["month", "weekday", "month"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePeriod(PeriodType::Month)));
    }

    #[test]
    fn test_duplicate_window_rejected() {
        let config = AnalysisConfig::new("SPY")
            .with_event_window(EventWindowConfig::cpi())
            .with_event_window(EventWindowConfig::cpi().with_half_width(2));
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateWindow(_))));
    }

    #[test]
    fn test_window_clashing_with_builtin_period_rejected() {
        let err = AnalysisConfig::from_toml(
            r#"
symbol = "SPY"
periods = ["month", "fomc_window"]

[[event_windows]]
event = "fomc"
half_width = 2
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateWindow(name) if name == "fomc_window"));

        let renamed = AnalysisConfig::new("SPY")
            .with_periods(vec![PeriodType::FomcWindow])
            .with_event_window(EventWindowConfig::fomc().with_prefix("Fed"));
        assert!(renamed.validate().is_ok());
    }

    #[test]
    fn test_unknown_period_is_a_toml_error() {
        let err = AnalysisConfig::from_toml(
            r#"
symbol = "SPY"
periods = ["lunar_phase"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_bad_calendar_date_fails_at_build() {
        let config = AnalysisConfig::from_toml(
            r#"
symbol = "SPY"
[calendar.meeting_dates]
fed = ["2024-13-01"]
"#,
        )
        .unwrap();
        assert!(matches!(config.build_calendar(), Err(ConfigError::Calendar(_))));
    }

    #[test]
    fn test_config_id_deterministic() {
        let config = AnalysisConfig::from_toml(SAMPLE).unwrap();
        let id1 = config.config_id().unwrap();
        let id2 = config.config_id().unwrap();
        assert_eq!(id1, id2, "ConfigId should be deterministic");
        assert_eq!(id1.len(), 64);
    }

    #[test]
    fn test_config_id_changes_with_params() {
        let a = AnalysisConfig::new("SPY");
        let b = AnalysisConfig::new("SPY").with_volatility(true);
        let c = AnalysisConfig::new("QQQ");
        assert_ne!(a.config_id().unwrap(), b.config_id().unwrap());
        assert_ne!(a.config_id().unwrap(), c.config_id().unwrap());
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spy.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(config, AnalysisConfig::from_toml(SAMPLE).unwrap());
    }

    #[test]
    fn test_from_file_missing_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = AnalysisConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read analysis config"));
    }
}
