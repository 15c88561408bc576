use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, error};

use paperstream::{
    ClientConfig, ClientError, GenerateFailure, Generator, GeneratorClient, ResearchPaper,
    StreamEvent, export, observability, paper::label_for, render,
};

const STREAM_FAILED: &str = "An error occurred while streaming the response";
const PDF_FAILED: &str = "Failed to generate PDF";
const TEXT_FAILED: &str = "Failed to generate text file";

/// Generate a research paper outline from a prompt and export it.
#[derive(Parser)]
#[command(name = "paperstream", version)]
struct Cli {
    /// Research topic, e.g. "Top Countries by GDP".
    prompt: String,
    /// Base URL of the generation service.
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: String,
    /// Directory where exported files are written.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Skip the PDF export.
    #[arg(long)]
    no_pdf: bool,
    /// Skip the plain-text export.
    #[arg(long)]
    no_text: bool,
    /// Request timeout in seconds.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    observability::init_logging();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config =
        ClientConfig::new(&cli.base_url).timeout(Duration::from_secs(cli.timeout_secs));
    let client = GeneratorClient::new(config).map_err(|e| e.to_string())?;
    let generator = Generator::new(Arc::new(client));

    let mut stream = generator
        .generate(&cli.prompt)
        .start_stream()
        .await
        .map_err(|e| e.to_string())?;

    // Transient streaming buffer: deltas are printed as they arrive and
    // superseded by the rendered paper once the final record lands.
    let mut printed_any = false;
    while let Some(event) = stream.next_event().await {
        match event {
            StreamEvent::Started { request_id } => {
                debug!(%request_id, "submission started");
            }
            StreamEvent::Delta { text, .. } => {
                print!("{text}");
                let _ = std::io::stdout().flush();
                printed_any = true;
            }
            StreamEvent::Completed { .. } | StreamEvent::Error { .. } => break,
        }
    }
    if printed_any {
        println!();
        println!();
    }

    let paper = stream.finish().await.map_err(|err| match err {
        ClientError::GenerateFailed(GenerateFailure::Service { message }) => message,
        err => {
            error!(%err, "streaming failed");
            STREAM_FAILED.to_string()
        }
    })?;

    print!("{}", render_paper(&paper));

    std::fs::create_dir_all(&cli.out_dir)
        .map_err(|e| format!("cannot create output directory: {e}"))?;
    if !cli.no_text {
        match export::export_text(&paper, &cli.out_dir) {
            Ok(path) => println!("Wrote {}", path.display()),
            Err(err) => {
                error!(%err, "text export failed");
                eprintln!("{TEXT_FAILED}");
            }
        }
    }
    if !cli.no_pdf {
        match export::export_pdf(&paper, &cli.out_dir) {
            Ok(path) => println!("Wrote {}", path.display()),
            Err(err) => {
                error!(%err, "pdf export failed");
                eprintln!("{PDF_FAILED}");
            }
        }
    }
    Ok(())
}

fn render_paper(paper: &ResearchPaper) -> String {
    let mut out = String::new();
    let known = [
        ("Title", &paper.title),
        ("Abstract", &paper.abstract_text),
        ("Introduction", &paper.introduction),
        ("Data", &paper.data),
        ("Analysis", &paper.analysis),
    ];
    for (label, content) in known {
        out.push_str(&format!("## {label}\n"));
        render::write_display(&render::render_section(content), &mut out, 0);
        out.push('\n');
    }
    for (key, content) in &paper.extra {
        out.push_str(&format!("## {}\n", label_for(key)));
        render::write_display(&render::render_section(content), &mut out, 0);
        out.push('\n');
    }
    if !paper.references.is_empty() {
        out.push_str("## References\n");
        let refs = paperstream::SectionContent::List(paper.references.clone());
        render::write_display(&render::render_section(&refs), &mut out, 0);
        out.push('\n');
    }
    out
}
