use anyhow::{Context, Error};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::chain::{Chain, ChainOutput};
use crate::chart::select_chart;
use crate::cli::Provider;
use crate::config::Settings;
use crate::query::execute;
use crate::sanitize::sanitize;
use crate::schema::describe_schema;
use crate::store::SalesStore;
use crate::synthesizer::{synthesize_sql, GroqSynthesizer, OllamaSynthesizer, Synthesizer};

pub struct TextToSqlChain {
    store: SalesStore,
    synthesizer: Box<dyn Synthesizer + Send + Sync>,
}

#[async_trait]
impl Chain for TextToSqlChain {
    async fn run(&self, input: String) -> Result<ChainOutput, Error> {
        let schema = describe_schema(&self.store)
            .await
            .context("Failed to get database info")?;

        let generated = synthesize_sql(self.synthesizer.as_ref(), input.trim(), &schema).await?;
        debug!(raw = %generated, "Completion received");

        let sql = sanitize(&generated);
        info!(sql = %sql, "Sql generated");

        let table = execute(&self.store, &sql).await?;
        let chart = select_chart(&table);
        info!(rows = table.rows.len(), chart = ?chart, "Question answered");

        Ok(ChainOutput { sql, table, chart })
    }
}

impl TextToSqlChain {
    pub fn new(store: SalesStore, synthesizer: Box<dyn Synthesizer + Send + Sync>) -> Self {
        TextToSqlChain { store, synthesizer }
    }

    /// Opens (creating and seeding if needed) the store and picks the
    /// completion backend named by `settings`.
    pub async fn initialize(settings: &Settings) -> Result<Self, Error> {
        let store = SalesStore::ensure_ready(&settings.db_path)
            .await?
            .allow_writes(settings.allow_writes);

        let synthesizer: Box<dyn Synthesizer + Send + Sync> = match settings.provider {
            Provider::Groq => {
                let api_key = settings
                    .api_key
                    .clone()
                    .context("Please enter an API Key to proceed.")?;
                Box::new(GroqSynthesizer::new(api_key, settings.model.clone()))
            }
            Provider::Ollama => Box::new(OllamaSynthesizer::new(settings.model.clone())),
        };

        info!(
            db = %settings.db_path.display(),
            provider = ?settings.provider,
            model = %settings.model,
            "Chain initialized"
        );

        Ok(TextToSqlChain::new(store, synthesizer))
    }

    pub fn store(&self) -> &SalesStore {
        &self.store
    }
}
