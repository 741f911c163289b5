// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (RUST_LOG=debug shows every page as it is indexed)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

mod cli;

use anyhow::{anyhow, Result};
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use site_guardian::site::{build_index, DiskFs};
use site_guardian::{validate_folder, InvalidImage, InvalidLink, ValidateOptions, ValidationResult};
use std::path::Path;
use std::sync::{mpsc, Arc};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain: "failed to read x: Permission denied"
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = nothing broken
//   Ok(1) = broken links or images found
//   Err = the site could not be checked
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { dir, json, concurrency } => handle_check(&dir, json, concurrency).await,
        Commands::Index { dir, concurrency } => handle_index(&dir, concurrency).await,
    }
}

// Everything printed by `check --json`
#[derive(Debug, Serialize)]
struct Report {
    #[serde(flatten)]
    result: ValidationResult,
    invalid_links: Vec<InvalidLink>,
    invalid_images: Vec<InvalidImage>,
}

// Handles the 'check' subcommand
async fn handle_check(dir: &Path, json: bool, concurrency: usize) -> Result<i32> {
    if !json {
        println!("🔍 Checking site in {}", dir.display());
    }

    // Callbacks run while the check is in progress; we only collect what
    // they report and print it once everything is done
    let (link_tx, link_rx) = mpsc::channel();
    let (image_tx, image_rx) = mpsc::channel();

    let options = ValidateOptions::new(dir)
        .with_concurrency(concurrency)
        .on_invalid_link(move |link| {
            link_tx
                .send(link.clone())
                .map_err(|_| anyhow!("report channel closed"))
        })
        .on_invalid_image(move |image| {
            image_tx
                .send(image.clone())
                .map_err(|_| anyhow!("report channel closed"))
        });

    let result = validate_folder(options).await?;

    // Callbacks fire in whatever order pages finish, so sort for stable output
    let mut invalid_links: Vec<_> = link_rx.try_iter().collect();
    let mut invalid_images: Vec<_> = image_rx.try_iter().collect();
    invalid_links.sort();
    invalid_images.sort();

    let report = Report {
        result,
        invalid_links,
        invalid_images,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }

    Ok(if report.result.ok { 0 } else { 1 })
}

// Handles the 'index' subcommand
async fn handle_index(dir: &Path, concurrency: usize) -> Result<i32> {
    let index = build_index(Arc::new(DiskFs), dir, concurrency).await?;
    println!("{}", serde_json::to_string_pretty(&index)?);
    Ok(0)
}

// Prints results as a human-readable table in the terminal
fn print_table(report: &Report) {
    if !report.invalid_links.is_empty() || !report.invalid_images.is_empty() {
        println!();
        println!("{:<40} {:<10} {:<50}", "FILE", "KIND", "REFERENCE");
        println!("{}", "=".repeat(100));

        for link in &report.invalid_links {
            println!("{:<40} {:<10} {:<50}", link.file, "link", link.link);
        }
        for image in &report.invalid_images {
            println!("{:<40} {:<10} {:<50}", image.file, "image", image.image);
        }
    }

    let result = &report.result;

    println!();
    println!("📊 Summary:");
    println!(
        "   🔗 Links:  {} checked, {} broken",
        result.checked_links, result.broken_links
    );
    println!(
        "   🖼️  Images: {} checked, {} broken",
        result.checked_images, result.broken_images
    );
    println!("   ⏱️  Took {:.1}ms", result.took_millis);

    if result.ok {
        println!("✅ No broken references");
    } else {
        println!("❌ {} broken reference(s)", result.total_broken);
    }
}
