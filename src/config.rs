use crate::types::Config;
use anyhow::{ensure, Context, Result};
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
        let config = Self::from_yaml_str(&contents).with_context(|| format!("Invalid config {}", path))?;
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.classifier.validate()?;
        ensure!(
            !self.logging.level.trim().is_empty(),
            "logging.level must not be empty"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StateKind;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.classifier.error_flag_size, 3);
        assert_eq!(config.thresholds.walk_stay, 0.3);
        assert_eq!(config.io.output_dir, "output");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_override() {
        let yaml = r#"
classifier:
  error_flag_size: 5
  initial_state: "At Station"
thresholds:
  walk_stay: 0.4
io:
  input_dir: "frames"
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.classifier.error_flag_size, 5);
        assert_eq!(config.classifier.initial_state, Some(StateKind::AtStation));
        assert_eq!(config.classifier.commit_probability, 0.8);
        assert_eq!(config.thresholds.walk_stay, 0.4);
        assert_eq!(config.thresholds.close_to_station, 3.0);
        assert_eq!(config.io.input_dir, "frames");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_yaml_str("thresholds:\n  walk_stay: -1.0\n").is_err());
        assert!(Config::from_yaml_str("classifier:\n  commit_probability: 2.0\n").is_err());
        assert!(Config::from_yaml_str("logging:\n  level: \"\"\n").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::load("/nonexistent/pedestrian_fam.yaml").is_err());
    }
}
