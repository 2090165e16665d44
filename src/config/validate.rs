// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{InsightError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = InsightError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.service, raw.poll, raw.extract))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_service(cfg)?;
    validate_poll(cfg)?;
    Ok(())
}

fn validate_service(cfg: &RawConfigFile) -> Result<()> {
    if cfg.service.max_concurrent_jobs == 0 {
        return Err(InsightError::Config(
            "[service].max_concurrent_jobs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_poll(cfg: &RawConfigFile) -> Result<()> {
    if cfg.poll.interval_ms == 0 {
        return Err(InsightError::Config(
            "[poll].interval_ms must be > 0 (got 0)".to_string(),
        ));
    }

    if cfg.poll.max_consecutive_errors == 0 {
        return Err(InsightError::Config(
            "[poll].max_consecutive_errors must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}
