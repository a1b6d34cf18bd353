use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Error};

use crate::cli::{Args, Provider};
use crate::synthesizer::{DEFAULT_GROQ_MODEL, DEFAULT_OLLAMA_MODEL};

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const MODEL_VAR: &str = "INSIGHTGEN_MODEL";

#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<String>,
    pub allow_writes: bool,
}

impl Settings {
    /// Resolves settings from arguments and the environment. Call after the
    /// `.env` file has been loaded.
    pub fn resolve(args: &Args) -> Self {
        Self::resolve_with(args, |name| env::var(name).ok())
    }

    /// Model precedence: `--model`, then `INSIGHTGEN_MODEL`, then the
    /// provider's default.
    pub fn resolve_with(args: &Args, var: impl Fn(&str) -> Option<String>) -> Self {
        let model = args
            .model
            .clone()
            .or_else(|| var(MODEL_VAR).filter(|m| !m.trim().is_empty()))
            .unwrap_or_else(|| match args.provider {
                Provider::Groq => DEFAULT_GROQ_MODEL.to_string(),
                Provider::Ollama => DEFAULT_OLLAMA_MODEL.to_string(),
            });

        let api_key = var(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Settings {
            db_path: args.db.clone(),
            provider: args.provider,
            model,
            api_key,
            allow_writes: args.allow_writes,
        }
    }

    /// Makes sure the hosted provider has a credential, asking on the
    /// terminal when the environment has none.
    pub fn require_api_key<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), Error> {
        if self.provider != Provider::Groq || self.api_key.is_some() {
            return Ok(());
        }

        write!(output, "Enter Groq API Key: ")?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        let key = line.trim();

        if key.is_empty() {
            bail!("Please enter an API Key to proceed.");
        }

        self.api_key = Some(key.to_string());
        Ok(())
    }

    pub fn require_api_key_from_terminal(&mut self) -> Result<(), Error> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.require_api_key(&mut stdin.lock(), &mut stdout)
    }
}
