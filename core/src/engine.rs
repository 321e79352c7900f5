use std::fs;
use std::path::Path;
use std::sync::Arc;

use evaluation::{Evaluator, LinearBackend, PatternSet};
pub use search::Engine;
use search::{EngineConfig, HashKeys, MpcModel, SearchError};

/// Pieces every engine in the process can share read-only.
#[derive(Clone)]
pub struct Shared {
    patterns: Arc<PatternSet>,
    keys: Arc<HashKeys>,
    mpc: Arc<MpcModel>,
}

impl Default for Shared {
    fn default() -> Self {
        Self::with_mpc(MpcModel::default())
    }
}

impl Shared {
    pub fn with_mpc(mpc: MpcModel) -> Self {
        Self {
            patterns: Arc::new(PatternSet::new()),
            keys: Arc::new(HashKeys::new()),
            mpc: Arc::new(mpc),
        }
    }

    pub fn create_engine(&self, config: &EngineConfig) -> Result<Engine, SearchError> {
        let backend = Box::new(LinearBackend::heuristic(&self.patterns));
        let evaluator = Evaluator::new(Arc::clone(&self.patterns), backend);

        let mut engine = Engine::with_keys(config, evaluator, Arc::clone(&self.keys))?;
        engine.set_mpc_model(MpcModel::clone(&self.mpc));
        Ok(engine)
    }
}

/// Reads a model written by `calibrate --output`.
pub fn load_mpc_model(path: &Path) -> Result<MpcModel, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let model: MpcModel = text.parse()?;
    log::info!("Loaded MPC model from {}", path.display());
    Ok(model)
}

/// Applies `Name=value` overrides in order.
pub fn apply_options(config: &mut EngineConfig, options: &[String]) -> Result<(), String> {
    for option in options {
        let (name, value) = option
            .split_once('=')
            .ok_or_else(|| format!("Expected Name=value, got '{}'", option))?;

        config.update_from_option(name.trim(), value.trim())?;
        log::debug!("Set option '{}' to '{}'", name.trim(), value.trim());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_options_in_order() {
        let mut config = EngineConfig::default();
        let options = vec!["Max Depth=5".to_string(), "Max Depth = 7".to_string()];

        apply_options(&mut config, &options).unwrap();
        assert_eq!(config.max_depth.value, 7);
    }

    #[test]
    fn test_engines_use_shared_mpc_model() {
        let model: MpcModel = "2 6 1.25 0.5 3.0\n".parse().unwrap();
        let shared = Shared::with_mpc(model.clone());

        let mut config = EngineConfig::default();
        config.hash_bits.value = 10;
        let engine = shared.create_engine(&config).unwrap();

        assert_eq!(engine.mpc_model(), &model);
        assert_ne!(engine.mpc_model(), &MpcModel::default());
    }

    #[test]
    fn test_load_mpc_model_reads_calibrated_file() {
        let model: MpcModel = "5 9 0.9 -1.0 2.5\n".parse().unwrap();
        let path = std::env::temp_dir().join(format!("outflank-mpc-{}.txt", std::process::id()));
        fs::write(&path, model.to_string()).unwrap();

        let loaded = load_mpc_model(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), model);
    }

    #[test]
    fn test_apply_options_rejects_malformed() {
        let mut config = EngineConfig::default();

        assert!(apply_options(&mut config, &["Max Depth".to_string()]).is_err());
        assert!(apply_options(&mut config, &["Bogus=1".to_string()]).is_err());
    }
}
