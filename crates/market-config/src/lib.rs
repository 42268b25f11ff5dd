//! Configuration loading for the operator service.

pub mod types;

use regex::Regex;
use std::env;
use std::path::Path;
use thiserror::Error;

pub use types::{
	ContractSettings, MarketConfig, NetworkSettings, SchedulerSettings, SubmitterSettings,
};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution.
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "MARKET_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<MarketConfig, ConfigError> {
		let mut config = if let Some(file_path) = &self.file_path {
			self.load_from_file(file_path).await?
		} else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		self.apply_env_overrides(&mut config)?;
		self.validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<MarketConfig, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await?;

		let substituted_content = self.substitute_env_vars(&content)?;

		let config: MarketConfig = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		Ok(config)
	}

	/// Replaces `${VAR_NAME}` patterns with environment values.
	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		let re = Regex::new(r"\$\{([^}]+)\}").expect("static pattern");

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut MarketConfig) -> Result<(), ConfigError> {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			config.log_level = log_level;
		}

		if let Ok(rpc_url) = env::var(format!("{}RPC_URL", self.env_prefix)) {
			config.network.rpc_url = rpc_url;
		}

		if let Ok(contract_id) = env::var(format!("{}CONTRACT_ID", self.env_prefix)) {
			config.contract.id = contract_id;
		}

		Ok(())
	}

	fn validate_config(&self, config: &MarketConfig) -> Result<(), ConfigError> {
		if config.network.passphrase.is_empty() {
			return Err(ConfigError::ValidationError(
				"Network passphrase must not be empty".to_string(),
			));
		}

		if !config.network.rpc_url.starts_with("http://")
			&& !config.network.rpc_url.starts_with("https://")
		{
			return Err(ConfigError::ValidationError(
				"RPC URL must start with http:// or https://".to_string(),
			));
		}

		if config.contract.id.is_empty() {
			return Err(ConfigError::ValidationError(
				"Contract id must not be empty".to_string(),
			));
		}

		let secret = config
			.contract
			.operator_secret
			.strip_prefix("0x")
			.unwrap_or(&config.contract.operator_secret);
		if secret.len() != 64 || hex::decode(secret).is_err() {
			return Err(ConfigError::ValidationError(
				"Operator secret must be 64 hex characters (32 bytes)".to_string(),
			));
		}

		if config.submitter.max_attempts < 1 {
			return Err(ConfigError::ValidationError(
				"Submitter max_attempts must be at least 1".to_string(),
			));
		}

		if config.submitter.poll_interval_ms == 0 {
			return Err(ConfigError::ValidationError(
				"Submitter poll_interval_ms must be greater than zero".to_string(),
			));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	const SECRET: &str = "0707070707070707070707070707070707070707070707070707070707070707";

	fn write_config(content: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(content.as_bytes()).unwrap();
		file
	}

	fn base_config() -> String {
		format!(
			r#"
[network]
passphrase = "Test Network ; August 2026"
rpc_url = "https://rpc.testnet.example.org"

[contract]
id = "CMARKET123"
operator_secret = "{}"
"#,
			SECRET
		)
	}

	#[tokio::test]
	async fn loads_config_with_defaults() {
		let file = write_config(&base_config());

		let config = ConfigLoader::new()
			.with_file(file.path())
			.load()
			.await
			.unwrap();

		assert_eq!(config.log_level, "info");
		assert_eq!(config.network.passphrase, "Test Network ; August 2026");
		assert_eq!(config.submitter.max_attempts, 10);
		assert_eq!(config.submitter.poll_interval_ms, 1_000);
		assert_eq!(config.scheduler.tick_buffer_secs, 5);
	}

	#[tokio::test]
	async fn substitutes_environment_variables() {
		std::env::set_var("TEST_SUBST_OPERATOR_SECRET", SECRET);
		let content = base_config().replace(SECRET, "${TEST_SUBST_OPERATOR_SECRET}");
		let file = write_config(&content);

		let config = ConfigLoader::new()
			.with_file(file.path())
			.load()
			.await
			.unwrap();

		assert_eq!(config.contract.operator_secret, SECRET);
	}

	#[tokio::test]
	async fn missing_environment_variable_is_an_error() {
		let content = base_config().replace(SECRET, "${TEST_SUBST_MISSING_VAR}");
		let file = write_config(&content);

		let result = ConfigLoader::new().with_file(file.path()).load().await;

		assert!(matches!(result, Err(ConfigError::EnvVarNotFound(name)) if name == "TEST_SUBST_MISSING_VAR"));
	}

	#[tokio::test]
	async fn env_overrides_take_precedence() {
		std::env::set_var("TESTPFX_RPC_URL", "https://rpc.override.example.org");
		let file = write_config(&base_config());

		let config = ConfigLoader::new()
			.with_file(file.path())
			.with_env_prefix("TESTPFX_")
			.load()
			.await
			.unwrap();

		assert_eq!(config.network.rpc_url, "https://rpc.override.example.org");
	}

	#[tokio::test]
	async fn rejects_invalid_rpc_url() {
		let content = base_config().replace("https://rpc.testnet.example.org", "ftp://nope");
		let file = write_config(&content);

		let result = ConfigLoader::new().with_file(file.path()).load().await;
		assert!(matches!(result, Err(ConfigError::ValidationError(_))));
	}

	#[tokio::test]
	async fn rejects_short_operator_secret() {
		let content = base_config().replace(SECRET, "0707");
		let file = write_config(&content);

		let result = ConfigLoader::new().with_file(file.path()).load().await;
		assert!(matches!(result, Err(ConfigError::ValidationError(_))));
	}

	#[tokio::test]
	async fn rejects_zero_poll_interval() {
		let content = format!("{}\n[submitter]\nmax_attempts = 10\npoll_interval_ms = 0\n", base_config());
		let file = write_config(&content);

		let result = ConfigLoader::new().with_file(file.path()).load().await;
		assert!(matches!(result, Err(ConfigError::ValidationError(_))));
	}
}
