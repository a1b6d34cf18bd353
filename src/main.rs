use std::io::{stdin, stdout, Write};
use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;
use tracing::{error, Level};

use insightgen::chain::{Chain, ChainOutput};
use insightgen::cli::Args;
use insightgen::config::Settings;
use insightgen::render::{render_dashboard, render_table};
use insightgen::text_to_sql_chain::TextToSqlChain;

fn print_output(output: &ChainOutput) {
    println!("Generated SQL Query:");
    println!("{}\n", output.sql);

    println!("### Data Result");
    println!("{}", render_table(&output.table));

    print!("{}", render_dashboard(&output.chart, &output.table));
}

async fn answer(processor: &TextToSqlChain, question: String) {
    match processor.run(question).await {
        Ok(output) => print_output(&output),
        Err(e) => {
            error!(error = %e, "Question failed");
            eprintln!("An error occurred: {:#}", e);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let mut settings = Settings::resolve(&args);
    if let Err(e) = settings.require_api_key_from_terminal() {
        eprintln!("{}", e);
        return Ok(ExitCode::FAILURE);
    }

    let processor = TextToSqlChain::initialize(&settings).await?;

    if let Some(question) = args.question {
        answer(&processor, question).await;
        return Ok(ExitCode::SUCCESS);
    }

    println!("Ask a question about your data.");
    println!("Sample database includes: Products, Categories, Amounts, and Dates.");
    println!("Try: 'Show total sales by category' or 'Sales trend over time'\n");

    loop {
        print!("Query: ");
        stdout().flush()?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }

        let question = input.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        answer(&processor, question.to_string()).await;
        println!();
    }

    Ok(ExitCode::SUCCESS)
}
