use crate::domain::errors::{AppError, AppResult};
use crate::domain::persistence::PersistenceConfig;
use crate::domain::viewport::ViewportConfig;
use serde::{Deserialize, Serialize};

/// Everything a chart session can be tuned with.
///
/// Missing fields take their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub viewport: ViewportConfig,
    pub persistence: PersistenceConfig,
}

impl SessionConfig {
    pub fn from_json(json: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AppError::Configuration(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        let vp = &self.viewport;
        if vp.min_width == 0 {
            return Err(AppError::Configuration("min_width must be positive".into()));
        }
        if !(vp.zoom_in_factor > 0.0 && vp.zoom_in_factor < 1.0) {
            return Err(AppError::Configuration(format!(
                "zoom_in_factor must be in (0, 1), got {}",
                vp.zoom_in_factor
            )));
        }
        if !(vp.zoom_out_factor > 1.0 && vp.zoom_out_factor.is_finite()) {
            return Err(AppError::Configuration(format!(
                "zoom_out_factor must be > 1, got {}",
                vp.zoom_out_factor
            )));
        }
        if vp.pan_step == 0 || vp.batch_size == 0 {
            return Err(AppError::Configuration("pan_step and batch_size must be positive".into()));
        }
        if self.persistence.ticker_key == self.persistence.range_key {
            return Err(AppError::Configuration("ticker and range keys must differ".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(SessionConfig::from_json("{}").unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = SessionConfig::from_json(r#"{"viewport":{"pan_step":5},"persistence":{"debounce_ms":250}}"#).unwrap();
        assert_eq!(config.viewport.pan_step, 5);
        assert_eq!(config.viewport.min_width, 10);
        assert_eq!(config.persistence.debounce_ms, 250);
        assert_eq!(config.persistence.range_key, "app:visibleRange");
    }

    #[test]
    fn rejects_bad_factors() {
        let err = SessionConfig::from_json(r#"{"viewport":{"zoom_in_factor":1.5}}"#).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(SessionConfig::from_json(r#"{"viewport":{"zoom_out_factor":0.9}}"#).is_err());
        assert!(SessionConfig::from_json("not json").is_err());
    }
}
