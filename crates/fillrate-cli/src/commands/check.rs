//! Check command - count rows satisfying each combination.

use std::path::PathBuf;

use colored::{ColoredString, Colorize};
use fillrate::config::{default_session_file_name, parse_delimiter, with_json_extension};
use fillrate::{
    CompletenessReport, Configuration, ConfigurationBuilder, Fillrate, ProgressConfig, SessionFile,
};

use crate::cli::OutputFormat;

/// Arguments of `fillrate check`.
pub struct CheckOptions {
    pub file: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub fields: Option<String>,
    pub invalid_values: Option<String>,
    pub combinations: Option<String>,
    pub delimiter: Option<String>,
    pub format: OutputFormat,
    pub save_config: Option<Option<PathBuf>>,
    pub quiet: bool,
}

pub fn run(options: CheckOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_configuration(&options)?;

    if let Some(path) = &options.save_config {
        let path = with_json_extension(
            path.clone()
                .unwrap_or_else(|| PathBuf::from(default_session_file_name())),
        );
        SessionFile::from_configuration(&config).save(&path)?;
        eprintln!(
            "{} {}",
            "Saved configuration to".green().bold(),
            path.display().to_string().white()
        );
    }

    let text = options.format == OutputFormat::Text;
    let quiet = options.quiet || options.format.is_machine_readable();

    if text {
        println!(
            "{} {}",
            "Checking".cyan().bold(),
            config.source().path().display().to_string().white()
        );
    }

    let progress = if quiet {
        ProgressConfig::disabled()
    } else {
        ProgressConfig::default()
    };
    let report = Fillrate::new(config).with_progress(progress).run()?;

    match options.format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Csv => println!("{}", report.to_csv_line()),
        OutputFormat::KeyValue => println!("{}", report.to_key_value()),
    }

    Ok(())
}

/// Start from the session file when given, otherwise from the data file, then
/// apply command-line selections on top. `-d` replaces a session's delimiter.
fn build_configuration(options: &CheckOptions) -> Result<Configuration, Box<dyn std::error::Error>> {
    let mut builder = match (&options.config, &options.file) {
        (Some(session), _) => {
            let mut session = SessionFile::load(session)?;
            if options.delimiter.is_some() {
                session.delimiter = options.delimiter.clone();
            }
            session.into_builder()?
        }
        (None, Some(file)) => {
            if !file.exists() {
                return Err(format!("File not found: {}", file.display()).into());
            }
            let delimiter = options.delimiter.as_deref().map(parse_delimiter).transpose()?;
            ConfigurationBuilder::open(file, delimiter)?
        }
        (None, None) => return Err("either FILE or --config is required".into()),
    };

    if let Some(fields) = &options.fields {
        builder = builder.select_fields(fields)?;
    }
    if let Some(invalid_values) = &options.invalid_values {
        builder = builder.invalid_values_from_str(invalid_values)?;
    }
    if let Some(expression) = &options.combinations {
        builder = builder.combinations_from_expression(expression)?;
    }

    Ok(builder.build()?)
}

fn print_text(report: &CompletenessReport) {
    println!();
    if !report.has_data() {
        println!("{}", "No data rows found to process.".yellow());
        return;
    }

    println!("{}", "Completeness:".yellow().bold());
    for result in &report.results {
        println!(
            "  [{}] : {} / {} ({})",
            result.combination.white().bold(),
            result.valid_rows,
            result.total_rows,
            colored_percentage(result.percentage())
        );
    }
}

fn colored_percentage(percentage: f64) -> ColoredString {
    let text = format!("{:.2}%", percentage);
    if percentage >= 80.0 {
        text.green()
    } else if percentage >= 50.0 {
        text.yellow()
    } else {
        text.red()
    }
}
