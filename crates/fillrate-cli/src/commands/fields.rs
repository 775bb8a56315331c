//! Fields command - list the numbered fields of a data file.

use std::path::PathBuf;

use colored::Colorize;
use fillrate::DataSource;
use fillrate::config::parse_delimiter;

pub fn run(file: PathBuf, delimiter: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let delimiter = delimiter.as_deref().map(parse_delimiter).transpose()?;
    let source = DataSource::new(&file, delimiter)?;
    let headers = source.headers()?;

    println!(
        "{} {}",
        "Discovered fields in".cyan().bold(),
        file.display().to_string().white()
    );
    for line in field_lines(&headers) {
        println!("  {}", line);
    }

    Ok(())
}

fn field_lines(headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .enumerate()
        .map(|(offset, name)| format!("[{}] {}", offset + 1, name))
        .collect()
}
