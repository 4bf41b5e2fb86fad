// src/config.rs

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use tracing::{info, warn};

use crate::blockchain::models::{EvmPlanConfig, PlanConfig};
use crate::blockchain::registry::{AddressBook, TokenRegistry};
use crate::blockchain::services::jupiter::DEFAULT_JUPITER_API_URL;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_EVM_RPC_URL: &str = "https://forno.celo.org";
pub const DEFAULT_EVM_ROUTER: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";
pub const DEFAULT_EVM_ADDRESS: &str = "0xFEED00000000000000000000000000000000FEED";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const CONFIG_DIR: &str = ".intent-planner";

/// Hosted model vendors the classifier can talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Gemini,
    Claude,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Gemini => "gemini",
            LlmProvider::Claude => "claude",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-4o-mini",
            LlmProvider::Gemini => "gemini-2.0-flash",
            LlmProvider::Claude => "claude-opus-4-20250514",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://api.openai.com/v1",
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            LlmProvider::Claude => "https://api.anthropic.com/v1",
        }
    }

    /// Environment variables holding this provider's key, in lookup order.
    pub fn key_vars(&self) -> &'static [&'static str] {
        match self {
            LlmProvider::OpenAi => &["OPENAI_API_KEY"],
            LlmProvider::Gemini => &["GEMINI_API_KEY"],
            LlmProvider::Claude => &["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"],
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "claude" | "anthropic" => Ok(LlmProvider::Claude),
            other => bail!("unknown LLM_PROVIDER '{}' (expected openai, gemini or claude)", other),
        }
    }
}

/// Resolved classifier settings.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
}

// A struct to hold all configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,

    /// `None` when no provider key is present; classify calls then fail.
    pub llm: Option<LlmConfig>,

    /// EVM swap defaults a plan request may override field by field.
    pub plan_defaults: PlanConfig,

    pub jupiter_api_url: String,
    pub registry_path: Option<PathBuf>,
    pub address_book_path: Option<PathBuf>,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            llm: None,
            plan_defaults: PlanConfig {
                evm: EvmPlanConfig {
                    router: Some(DEFAULT_EVM_ROUTER.to_string()),
                    rpc_url: Some(DEFAULT_EVM_RPC_URL.to_string()),
                    path: None,
                    to: Some(DEFAULT_EVM_ADDRESS.to_string()),
                },
            },
            jupiter_api_url: DEFAULT_JUPITER_API_URL.to_string(),
            registry_path: None,
            address_book_path: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let port = var("PORT")
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
            .parse()
            .context("PORT must be a valid number")?;

        let http_timeout_secs = var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_HTTP_TIMEOUT_SECS.to_string())
            .parse()
            .context("HTTP_TIMEOUT_SECS must be a valid number")?;

        let path = match var("EVM_SWAP_PATH") {
            Some(raw) => Some(
                serde_json::from_str::<Vec<String>>(&raw)
                    .context("EVM_SWAP_PATH must be a JSON array of addresses")?,
            ),
            None => None,
        };

        let plan_defaults = PlanConfig {
            evm: EvmPlanConfig {
                router: var("EVM_ROUTER").or(defaults.plan_defaults.evm.router),
                rpc_url: var("EVM_RPC_URL").or(defaults.plan_defaults.evm.rpc_url),
                path,
                to: var("DEFAULT_EVM_ADDRESS").or(defaults.plan_defaults.evm.to),
            },
        };

        plan_defaults
            .evm
            .check_addresses()
            .context("EVM_ROUTER, DEFAULT_EVM_ADDRESS and EVM_SWAP_PATH must hold EVM addresses")?;

        Ok(Config {
            port,
            llm: resolve_llm(&var)?,
            plan_defaults,
            jupiter_api_url: var("JUPITER_API_URL").unwrap_or(defaults.jupiter_api_url),
            registry_path: var("REGISTRY_PATH").map(PathBuf::from),
            address_book_path: var("ADDRESS_BOOK_PATH").map(PathBuf::from),
            http_timeout_secs,
        })
    }

    /// Explicit path, else `~/.intent-planner/registry.json` if it exists,
    /// else the built-in demo registry.
    pub fn load_registry(&self) -> Result<TokenRegistry> {
        match locate(self.registry_path.as_ref(), "registry.json") {
            Some(path) => {
                info!("Loading token registry from {}", path.display());
                TokenRegistry::from_file(&path)
            }
            None => {
                info!("Using built-in demo token registry");
                Ok(TokenRegistry::demo())
            }
        }
    }

    pub fn load_address_book(&self) -> Result<AddressBook> {
        match locate(self.address_book_path.as_ref(), "address_book.json") {
            Some(path) => {
                info!("Loading address book from {}", path.display());
                AddressBook::from_file(&path)
            }
            None => {
                info!("Using built-in demo address book");
                Ok(AddressBook::demo())
            }
        }
    }
}

fn locate(explicit: Option<&PathBuf>, file_name: &str) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.clone());
    }
    dirs::home_dir()
        .map(|mut path| {
            path.push(CONFIG_DIR);
            path.push(file_name);
            path
        })
        .filter(|path| path.exists())
}

/// Explicit `LLM_PROVIDER` wins; otherwise the first provider with a key,
/// in the order openai, gemini, claude.
fn resolve_llm<F>(var: &F) -> Result<Option<LlmConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    let key_for = |provider: LlmProvider| provider.key_vars().iter().find_map(|k| var(k));

    let selected = match var("LLM_PROVIDER") {
        Some(raw) => {
            let provider: LlmProvider = raw.parse()?;
            match key_for(provider) {
                Some(key) => Some((provider, key)),
                None => bail!(
                    "LLM_PROVIDER is {} but none of {:?} is set",
                    provider,
                    provider.key_vars()
                ),
            }
        }
        None => [LlmProvider::OpenAi, LlmProvider::Gemini, LlmProvider::Claude]
            .into_iter()
            .find_map(|p| key_for(p).map(|key| (p, key))),
    };

    let Some((provider, key)) = selected else {
        warn!("No LLM API key configured; intent classification will fail until one is set");
        return Ok(None);
    };

    Ok(Some(LlmConfig {
        provider,
        api_key: SecretString::new(key),
        model: var("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
        base_url: var("LLM_BASE_URL")
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string(),
    }))
}
