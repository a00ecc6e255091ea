use crate::{
    ingest::IngestOptions,
    marker::MarkerStyle,
    units::{Time, Timestamp},
};
use regex::Regex;
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}'. {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file. {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid '{field}' value '{value}'. {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid 'dataset.matches' regex. {0}")]
    Regex(#[from] regex::Error),
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub clock: Clock,
    pub dataset: Dataset,
    pub marker: Marker,
    pub camera: Camera,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Clock {
    /// Simulated time per frame, e.g. "3s" or "500ms"
    pub frame_step: Option<String>,
    /// RFC 3339, defaults to the wall clock at startup
    pub start: Option<String>,
    /// Host loop pacing, frames per real second
    pub frame_rate: Option<f64>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dataset {
    pub max_objects: Option<usize>,
    /// Only keep objects whose name matches this regex
    pub matches: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Marker {
    pub object_size_km: Option<f64>,
    pub reference_radius_km: Option<f64>,
    pub color: Option<[u8; 3]>,
    pub opacity: Option<f32>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Camera {
    /// In globe radii above the surface
    pub altitude: Option<f64>,
}

impl Config {
    pub const DEFAULT_FRAME_RATE: f64 = 60.0;
    pub const DEFAULT_CAMERA_ALTITUDE: f64 = 3.5;

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str_checked(&content)
    }

    /// Parse and validate every field that has a runtime conversion
    pub fn from_str_checked(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;
        cfg.frame_step()?;
        cfg.start()?;
        cfg.frame_rate()?;
        cfg.ingest_options()?;
        cfg.marker_style()?;
        Ok(cfg)
    }

    pub fn frame_step(&self) -> Result<Time, ConfigError> {
        match self.clock.frame_step.as_deref() {
            None => Ok(Time::from_millis(
                crate::clock::SimulatedClock::DEFAULT_STEP_MILLIS,
            )),
            Some(s) => parse_frame_step(s),
        }
    }

    pub fn start(&self) -> Result<Option<Timestamp>, ConfigError> {
        self.clock
            .start
            .as_deref()
            .map(|s| {
                Timestamp::parse_rfc3339(s).map_err(|e| ConfigError::InvalidValue {
                    field: "clock.start",
                    value: s.to_owned(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    pub fn frame_rate(&self) -> Result<f64, ConfigError> {
        let rate = self.clock.frame_rate.unwrap_or(Self::DEFAULT_FRAME_RATE);
        if !(rate.is_finite() && rate > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "clock.frame-rate",
                value: rate.to_string(),
                reason: "must be positive".to_owned(),
            });
        }
        Ok(rate)
    }

    pub fn ingest_options(&self) -> Result<IngestOptions, ConfigError> {
        let name_filter = self.dataset.matches.as_deref().map(Regex::new).transpose()?;
        Ok(IngestOptions {
            max_objects: self
                .dataset
                .max_objects
                .unwrap_or(IngestOptions::DEFAULT_MAX_OBJECTS),
            name_filter,
        })
    }

    pub fn marker_style(&self) -> Result<MarkerStyle, ConfigError> {
        let d = MarkerStyle::default();
        let style = MarkerStyle {
            object_size_km: self.marker.object_size_km.unwrap_or(d.object_size_km),
            reference_radius_km: self
                .marker
                .reference_radius_km
                .unwrap_or(d.reference_radius_km),
            color: self.marker.color.unwrap_or(d.color),
            opacity: self.marker.opacity.unwrap_or(d.opacity),
        };
        if !(style.reference_radius_km.is_finite() && style.reference_radius_km > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "marker.reference-radius-km",
                value: style.reference_radius_km.to_string(),
                reason: "must be positive".to_owned(),
            });
        }
        if !(0.0..=1.0).contains(&style.opacity) {
            return Err(ConfigError::InvalidValue {
                field: "marker.opacity",
                value: style.opacity.to_string(),
                reason: "must be within [0, 1]".to_owned(),
            });
        }
        Ok(style)
    }

    pub fn camera_altitude(&self) -> f64 {
        self.camera.altitude.unwrap_or(Self::DEFAULT_CAMERA_ALTITUDE)
    }
}

/// A humantime duration that is strictly positive
pub fn parse_frame_step(s: &str) -> Result<Time, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: "clock.frame-step",
        value: s.to_owned(),
        reason,
    };
    let step = Time::from(humantime::parse_duration(s).map_err(|e| invalid(e.to_string()))?);
    if !step.is_positive() {
        return Err(invalid("must be greater than zero".to_owned()));
    }
    match step.checked_nanos() {
        Some(ns) if ns > 0 => Ok(step),
        _ => Err(invalid("must be at least 1ns and fit the clock".to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use indoc::indoc;

    #[test]
    fn empty_config_has_defaults() {
        let cfg = Config::from_str_checked("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_relative_eq!(cfg.frame_step().unwrap().as_millis(), 3000.0);
        assert_eq!(cfg.start().unwrap(), None);
        assert_relative_eq!(cfg.frame_rate().unwrap(), 60.0);
        assert_eq!(cfg.ingest_options().unwrap().max_objects, 1500);
        assert!(cfg.ingest_options().unwrap().name_filter.is_none());
        assert_eq!(cfg.marker_style().unwrap(), MarkerStyle::default());
        assert_relative_eq!(cfg.camera_altitude(), 3.5);
    }

    #[test]
    fn full_config() {
        let cfg = Config::from_str_checked(indoc! {r#"
            [clock]
            frame-step = "500ms"
            start = "2020-07-13T00:00:00Z"
            frame-rate = 30.0

            [dataset]
            max-objects = 10
            matches = "^STARLINK"

            [marker]
            object-size-km = 120.0
            color = [255, 0, 0]
            opacity = 1.0

            [camera]
            altitude = 2.0
        "#})
        .unwrap();
        assert_relative_eq!(cfg.frame_step().unwrap().as_millis(), 500.0);
        assert_eq!(
            cfg.start().unwrap(),
            Some(Timestamp::parse_rfc3339("2020-07-13T00:00:00Z").unwrap())
        );
        let opts = cfg.ingest_options().unwrap();
        assert_eq!(opts.max_objects, 10);
        assert!(opts.name_filter.unwrap().is_match("STARLINK-1007"));
        let style = cfg.marker_style().unwrap();
        assert_relative_eq!(style.object_size_km, 120.0);
        assert_relative_eq!(style.reference_radius_km, 6371.0);
        assert_eq!(style.color, [255, 0, 0]);
        assert_relative_eq!(cfg.camera_altitude(), 2.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_str_checked("[clock]\nframe-step = \"0s\"\n"),
            Err(ConfigError::InvalidValue {
                field: "clock.frame-step",
                ..
            })
        ));
        assert!(Config::from_str_checked("[clock]\nframe-step = \"soon\"\n").is_err());
        assert!(matches!(
            Config::from_str_checked("[clock]\nframe-step = \"300years\"\n"),
            Err(ConfigError::InvalidValue {
                field: "clock.frame-step",
                ..
            })
        ));
        assert!(Config::from_str_checked("[clock]\nstart = \"yesterday\"\n").is_err());
        assert!(Config::from_str_checked("[clock]\nframe-rate = 0.0\n").is_err());
        assert!(matches!(
            Config::from_str_checked("[dataset]\nmatches = \"(\"\n"),
            Err(ConfigError::Regex(_))
        ));
        assert!(Config::from_str_checked("[marker]\nopacity = 1.5\n").is_err());
        assert!(matches!(
            Config::from_str_checked("[camera]\naltitude = \"high\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn frame_step_is_whole_nanoseconds() {
        assert_eq!(parse_frame_step("7ms").unwrap().as_nanos(), 7_000_000);
        assert_eq!(parse_frame_step("16ms").unwrap().as_nanos(), 16_000_000);
        assert_eq!(parse_frame_step("1ns").unwrap().as_nanos(), 1);
        assert!(parse_frame_step("10years").is_ok());
        assert!(parse_frame_step("300years").is_err());
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Config::load("no/such/config.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
