use charcoal::{
    Charcoal, CharcoalError, Cli, OutputFormatter, OutputMode, UserFriendlyError,
};
use clap::Parser;
use std::path::Path;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let charcoal = match Charcoal::from_cli(&cli) {
        Ok(charcoal) => charcoal,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    let source = match cli.source.as_deref() {
        Some(source) => source,
        None => {
            // clap enforces this; guard anyway
            print_startup_error(&CharcoalError::Config {
                message: "No source path provided".to_string(),
            });
            return 2;
        }
    };

    if cli.dry_run {
        return handle_dry_run(source, &cli, &charcoal);
    }

    match charcoal.run(source, cli.persist_mode()) {
        Ok(report) => {
            charcoal.output_formatter().print_run_report(&report);

            // A completed run exits 0 even with zero blocks found or
            // per-block write failures; those are reported above.
            0
        }
        Err(e) => {
            charcoal.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &CharcoalError) -> i32 {
    match error {
        CharcoalError::Cancelled => 130, // Interrupted (SIGINT)
        CharcoalError::Pattern { .. } => 2,
        CharcoalError::Config { .. } => 2,
        CharcoalError::SourceNotFound { .. } => 3,
        CharcoalError::InvalidPath { .. } => 4,
        CharcoalError::Permission { .. } => 7,
        CharcoalError::DestinationNotDirectory { .. } => 8,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "charcoal.toml".to_string());

    match Charcoal::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  charcoal <source> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(source: &Path, cli: &Cli, charcoal: &Charcoal) -> i32 {
    let formatter = charcoal.output_formatter();

    formatter.warning("DRY RUN MODE - No files will be written");
    formatter.print_separator();

    if !source.exists() {
        let error = CharcoalError::SourceNotFound {
            path: source.display().to_string(),
        };
        formatter.print_user_friendly_error(&error);
        return exit_code_for(&error);
    }

    let config = charcoal.config();

    println!("Source: {}", source.display());
    println!(
        "Source kind: {}",
        if source.is_dir() { "directory (batch)" } else { "file" }
    );
    println!("Destination: {}", config.output.destination.display());
    println!("Mode: {}", cli.persist_mode());
    println!("Language tag: {}", config.extractor.language_tag);
    println!("Output extension: {}", config.output.file_extension);

    if source.is_dir() {
        println!("Scan extensions: {}", config.scan.extensions.join(", "));
        println!(
            "Excluded directories: {}",
            config.scan.exclude_dirs.join(", ")
        );
        println!("Max file size: {} bytes", config.scan.max_file_size);
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform actual extraction");

    0
}

fn print_startup_error(error: &CharcoalError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
