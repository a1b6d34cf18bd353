use anyhow::Error;
use async_trait::async_trait;

use crate::chart::ChartSelection;
use crate::query::QueryResult;

/// Everything one question produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutput {
    pub sql: String,
    pub table: QueryResult,
    pub chart: ChartSelection,
}

#[async_trait]
pub trait Chain {
    async fn run(&self, input: String) -> Result<ChainOutput, Error>;
}
