use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// Hosted models on Groq (needs GROQ_API_KEY)
    Groq,
    /// A local Ollama server
    Ollama,
}

/// Ask questions about the sales database in plain language.
#[derive(Debug, Parser)]
#[command(name = "insightgen", version, about)]
pub struct Args {
    /// SQLite database file, created and seeded when missing
    #[arg(long, default_value = "sales_data.db")]
    pub db: PathBuf,

    /// Completion service used to write SQL
    #[arg(long, value_enum, default_value_t = Provider::Groq)]
    pub provider: Provider,

    /// Model name, defaults to the provider's default
    #[arg(long)]
    pub model: Option<String>,

    /// Let generated SQL modify the database
    #[arg(long)]
    pub allow_writes: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Answer this question and exit instead of prompting
    pub question: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["insightgen"]);

        assert_eq!(args.db, PathBuf::from("sales_data.db"));
        assert_eq!(args.provider, Provider::Groq);
        assert!(args.model.is_none());
        assert!(!args.allow_writes);
        assert!(args.question.is_none());
    }

    #[test]
    fn parses_question_and_flags() {
        let args = Args::parse_from([
            "insightgen",
            "--provider",
            "ollama",
            "--db",
            "/tmp/x.db",
            "--allow-writes",
            "-v",
            "Show total sales by category",
        ]);

        assert_eq!(args.provider, Provider::Ollama);
        assert_eq!(args.db, PathBuf::from("/tmp/x.db"));
        assert!(args.allow_writes);
        assert!(args.verbose);
        assert_eq!(args.question.as_deref(), Some("Show total sales by category"));
    }
}
