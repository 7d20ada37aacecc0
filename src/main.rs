use calparse::{
    logging, CalendarError, CalendarParser, Cli, OutputFormatter, OutputMode, UserFriendlyError,
};
use clap::Parser;
use std::path::PathBuf;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);
    tracing::debug!(build = %calparse::build_info(), "starting");

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let parser = match CalendarParser::from_cli(&cli) {
        Ok(parser) => parser,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&parser);
    }

    match parser.parse_calendars() {
        Ok(report) => {
            let formatter = parser.output_formatter();
            if parser.config().output.generate_report && formatter.mode() != OutputMode::Json {
                formatter.print_parse_report(&report);
            }
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "calendar parsing failed");
            parser.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &CalendarError) -> i32 {
    match error {
        CalendarError::Config { .. } | CalendarError::InvalidPattern { .. } => 2,
        CalendarError::InvalidPath { .. } => 3,
        CalendarError::Read { .. } => 4,
        CalendarError::Write { .. } | CalendarError::Csv(_) => 5,
        CalendarError::Io(_) => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("calparse.toml"));

    match CalendarParser::generate_sample_config(&config_path) {
        Ok(()) => {
            println!(
                "Generated sample configuration file: {}",
                config_path.display()
            );
            println!("\nTo use this configuration:");
            println!("  calparse --config {}", config_path.display());
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            exit_code_for(&e)
        }
    }
}

fn handle_dry_run(parser: &CalendarParser) -> i32 {
    let formatter = parser.output_formatter();
    let config = parser.config();

    formatter.info("DRY RUN MODE - No output will be written");
    formatter.print_separator();

    formatter.info("Configuration that would be used:");
    println!("  Input directory: {}", config.discovery.input_dir.display());
    println!("  File pattern: {}", config.discovery.pattern);
    if !config.discovery.exclude_patterns.is_empty() {
        println!(
            "  Exclude patterns: {}",
            config.discovery.exclude_patterns.join(", ")
        );
    }
    println!("  Sorted: {}", config.discovery.sort_files);
    println!("  Output file: {}", config.output.path.display());
    println!("  Delimiter: {:?}", config.output.delimiter);

    formatter.print_separator();

    let calendars = match parser.discover_calendars() {
        Ok(calendars) => calendars,
        Err(e) => {
            parser.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    println!("Files that would be parsed ({}):", calendars.len());
    for calendar in &calendars {
        println!("  {}", calendar.display_path());
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to write the output file");

    0
}

fn print_startup_error(error: &CalendarError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use calparse::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let cli = Cli::try_parse_from([
            "calparse",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(handle_generate_config(&cli), 0);
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[discovery]"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("calendars");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("calendar_day_1_year_2024.html"), "").unwrap();

        let mut config = Config::default();
        config.discovery.input_dir = input;
        config.output.path = temp_dir.path().join("out.csv");
        let parser = CalendarParser::new(config, OutputMode::Plain, 0, true).unwrap();

        assert_eq!(handle_dry_run(&parser), 0);
        assert!(!temp_dir.path().join("out.csv").exists());
    }

    #[test]
    fn test_dry_run_rejects_file_as_input() {
        let temp_dir = TempDir::new().unwrap();
        let not_a_dir = temp_dir.path().join("calendars");
        fs::write(&not_a_dir, "").unwrap();

        let mut config = Config::default();
        config.discovery.input_dir = not_a_dir;
        let parser = CalendarParser::new(config, OutputMode::Plain, 0, true).unwrap();

        assert_eq!(handle_dry_run(&parser), 3);
    }

    #[test]
    fn test_exit_codes() {
        let io = || std::io::Error::new(std::io::ErrorKind::Other, "boom");

        assert_eq!(
            exit_code_for(&CalendarError::Config {
                message: "bad".to_string()
            }),
            2
        );
        assert_eq!(
            exit_code_for(&CalendarError::InvalidPattern {
                pattern: "[".to_string(),
                message: "unclosed".to_string()
            }),
            2
        );
        assert_eq!(
            exit_code_for(&CalendarError::InvalidPath {
                path: "x".to_string()
            }),
            3
        );
        assert_eq!(
            exit_code_for(&CalendarError::Read {
                path: PathBuf::from("a.html"),
                source: io()
            }),
            4
        );
        assert_eq!(
            exit_code_for(&CalendarError::Write {
                path: PathBuf::from("out.csv"),
                source: io()
            }),
            5
        );
        assert_eq!(exit_code_for(&CalendarError::Io(io())), 1);
    }
}
