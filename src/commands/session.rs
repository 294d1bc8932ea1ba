use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use lodgeo::config::Config;
use lodgeo::lod::LodService;
use lodgeo::metrics::{default_observer, init_metrics, LodObserver, PrometheusObserver};

/// Services for one CLI invocation, with the cache snapshot around them
pub struct Session {
    pub service: LodService,
    snapshot: Option<PathBuf>,
}

impl Session {
    /// Build services from `config` and load the cache snapshot if configured
    pub fn open(config: &Config, metrics: bool) -> Result<Self> {
        let observer: Arc<dyn LodObserver> = if metrics {
            match init_metrics() {
                Ok(()) => Arc::new(PrometheusObserver),
                Err(e) => {
                    tracing::warn!(error = %e, "Metrics unavailable, falling back to logs");
                    default_observer()
                }
            }
        } else {
            default_observer()
        };

        let service = LodService::from_config(config, observer)
            .context("Failed to initialize LOD services")?;

        let snapshot = config.cache.persist_path.clone();
        if let Some(path) = &snapshot {
            service
                .load_snapshot(path)
                .with_context(|| format!("Failed to load cache snapshot: {}", path.display()))?;
        }

        Ok(Self { service, snapshot })
    }

    /// Save the cache snapshot and log cache statistics
    pub fn close(self) -> Result<()> {
        let stats = self.service.cache().stats();
        tracing::info!(
            hits = stats.hits,
            negative_hits = stats.negative_hits,
            misses = stats.misses,
            hit_rate = %format!("{:.2}", stats.hit_rate()),
            "Cache statistics"
        );

        if let Some(path) = &self.snapshot {
            self.service
                .save_snapshot(path)
                .with_context(|| format!("Failed to save cache snapshot: {}", path.display()))?;
        }

        Ok(())
    }

    /// Close the session after a command ran, keeping the command's error first
    ///
    /// A close failure is returned only when the command succeeded; otherwise
    /// it is logged and the command's error is returned.
    pub fn finish(self, result: Result<()>) -> Result<()> {
        match (result, self.close()) {
            (Ok(()), close) => close,
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::error!(error = %format!("{close_err:#}"), "Failed to close session");
                Err(e)
            }
        }
    }
}

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Session whose snapshot path is a directory, so saving always fails
    fn unsavable_session(dir: &tempfile::TempDir) -> Session {
        let config = Config::default();
        Session {
            service: LodService::from_config(&config, default_observer()).unwrap(),
            snapshot: Some(dir.path().to_path_buf()),
        }
    }

    #[test]
    fn test_finish_keeps_command_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = unsavable_session(&dir);

        let err = session
            .finish(Err(anyhow::anyhow!("lookup failed")))
            .unwrap_err();
        assert_eq!(err.to_string(), "lookup failed");
    }

    #[test]
    fn test_finish_reports_close_error_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let session = unsavable_session(&dir);

        let err = session.finish(Ok(())).unwrap_err();
        assert!(err.to_string().contains("Failed to save cache snapshot"));
    }

    #[test]
    fn test_finish_saves_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let session = Session {
            service: LodService::from_config(&Config::default(), default_observer()).unwrap(),
            snapshot: Some(path.clone()),
        };

        session.finish(Ok(())).unwrap();
        assert!(path.exists());
    }
}
