//! CLI utility helpers

use cloneplan::{Error, ProjectConfig, Result, Target};
use std::fs;
use std::path::{Path, PathBuf};

/// Value following `--flag` or its short form
fn flag_value<'a>(args: &'a [String], long: &str, short: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == long || arg == short)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Parse --lang argument to determine target language
pub fn parse_target_arg(args: &[String]) -> Result<Option<Target>> {
    match flag_value(args, "--lang", "-l") {
        Some(lang) => Target::parse(lang)
            .map(Some)
            .ok_or_else(|| format!("Unknown language: {}", lang).into()),
        None => Ok(None),
    }
}

/// Parse --output argument to determine output directory
pub fn parse_output_arg(args: &[String]) -> Option<PathBuf> {
    flag_value(args, "--output", "-o").map(PathBuf::from)
}

/// Load --config, or the nearest `.cloneplan.yaml`, or defaults
pub fn load_config(args: &[String]) -> Result<ProjectConfig> {
    if let Some(path) = flag_value(args, "--config", "-c") {
        return ProjectConfig::load(Path::new(path));
    }
    let current_dir = std::env::current_dir().map_err(Error::Io)?;
    Ok(ProjectConfig::discover(&current_dir)?.unwrap_or_default())
}

/// Read the descriptor document named by the first argument
pub fn read_input(args: &[String], usage: &str) -> Result<String> {
    match args.first() {
        Some(path) if !path.starts_with('-') => fs::read_to_string(path).map_err(Error::Io),
        _ => Err(usage.into()),
    }
}

/// Write a file into the output directory, or print to stdout
pub fn write_output(dir: &Option<PathBuf>, file_name: &str, content: &str) -> Result<()> {
    match dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(Error::Io)?;
            let path = dir.join(file_name);
            fs::write(&path, content).map_err(Error::Io)?;
            eprintln!("Written to: {}", path.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
