//! Pagination tuning knobs

use crate::error::{PaginateError, Result};
use serde::{Deserialize, Serialize};

/// Thresholds and fallbacks used by the pagination cascade.
///
/// All lengths are layout units (CSS pixels in the browser). Every field has a
/// default, so a partial JSON object overrides only what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    /// Slack subtracted from the deadline before a block counts as overflowing
    pub overflow_margin: f32,
    /// Gap kept at the bottom of synthesized continuation pages
    pub continuation_margin: f32,
    /// Gap kept at the bottom of the section page and of a merged flow page
    pub section_margin: f32,
    /// Gap used on the primary page when it has no bottom-fixed block
    pub primary_fallback_margin: f32,
    /// Frame height substituted when a measured one is implausible (A4 at 96 dpi)
    pub fallback_frame_height: f32,
    /// Smallest plausible measured frame height
    pub min_frame_height: f32,
    /// Largest plausible measured frame height
    pub max_frame_height: f32,
    /// Header height assumed for a table without any rows
    pub default_header_height: f32,
    /// A table is split only if at least this many header heights fit below its caption
    pub header_space_factor: f32,
    /// Maximum cascade depth before the run is aborted
    pub max_depth: u32,
    /// Number of grapheme clusters of a title used as its split-group key
    pub group_key_len: usize,
    /// Text or anchor fragments identifying the primary section title
    pub section_markers: Vec<String>,
    /// Text of a block that bounds the primary section when the page has no
    /// bottom-fixed block
    pub deadline_markers: Vec<String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            overflow_margin: 5.0,
            continuation_margin: 50.0,
            section_margin: 5.0,
            primary_fallback_margin: 200.0,
            fallback_frame_height: 960.0,
            min_frame_height: 100.0,
            max_frame_height: 1000.0,
            default_header_height: 30.0,
            header_space_factor: 2.0,
            max_depth: 20,
            group_key_len: 20,
            section_markers: vec![
                "clinical significance".to_string(),
                "clinical-highlight".to_string(),
            ],
            deadline_markers: vec!["Other Biomarkers".to_string()],
        }
    }
}

impl PaginationConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let margins = [
            ("overflowMargin", self.overflow_margin),
            ("continuationMargin", self.continuation_margin),
            ("sectionMargin", self.section_margin),
            ("primaryFallbackMargin", self.primary_fallback_margin),
        ];
        for (name, value) in margins {
            if !value.is_finite() || value < 0.0 {
                return Err(PaginateError::Config {
                    message: format!("{name} must be a non-negative number, got {value}"),
                });
            }
        }

        if !(self.min_frame_height > 0.0 && self.min_frame_height <= self.max_frame_height) {
            return Err(PaginateError::Config {
                message: format!(
                    "frame height band [{}, {}] is empty",
                    self.min_frame_height, self.max_frame_height
                ),
            });
        }

        if self.fallback_frame_height <= 0.0 {
            return Err(PaginateError::Config {
                message: "fallbackFrameHeight must be positive".to_string(),
            });
        }

        if self.max_depth == 0 {
            return Err(PaginateError::Config {
                message: "maxDepth must be at least 1".to_string(),
            });
        }

        if self.group_key_len == 0 {
            return Err(PaginateError::Config {
                message: "groupKeyLen must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Replace a measured frame height outside the plausible band with the fallback.
    ///
    /// A frame measured before layout committed reads near zero, and one stretched
    /// by overflowing content reads far beyond a printable page.
    pub fn sanitize_frame_height(&self, measured: f32) -> f32 {
        if measured.is_finite()
            && measured >= self.min_frame_height
            && measured <= self.max_frame_height
        {
            measured
        } else {
            log::warn!(
                "frame height {measured} outside [{}, {}], using {}",
                self.min_frame_height,
                self.max_frame_height,
                self.fallback_frame_height
            );
            self.fallback_frame_height
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PaginationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PaginationConfig::from_json(r#"{"maxDepth": 5, "overflowMargin": 2}"#).unwrap();
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.overflow_margin, 2.0);
        assert_eq!(config.continuation_margin, 50.0);
        assert_eq!(config.section_markers.len(), 2);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(PaginationConfig::from_json(r#"{"maxDepth": 0}"#).is_err());
        assert!(PaginationConfig::from_json(r#"{"sectionMargin": -1}"#).is_err());
        assert!(PaginationConfig::from_json(r#"{"minFrameHeight": 500, "maxFrameHeight": 400}"#).is_err());
        assert!(PaginationConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_sanitize_frame_height() {
        let config = PaginationConfig::default();
        assert_eq!(config.sanitize_frame_height(900.0), 900.0);
        assert_eq!(config.sanitize_frame_height(1000.0), 1000.0);
        assert_eq!(config.sanitize_frame_height(1400.0), 960.0);
        assert_eq!(config.sanitize_frame_height(20.0), 960.0);
        assert_eq!(config.sanitize_frame_height(f32::NAN), 960.0);
    }
}
