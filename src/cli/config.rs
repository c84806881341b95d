//! Config and schema CLI commands

use super::util::load_config;
use cloneplan::*;

pub fn cmd_config(args: &[String]) -> Result<()> {
    let config = load_config(args)?;
    let yaml = serde_norway::to_string(&config)?;
    println!("{}", yaml.trim_end());
    Ok(())
}

pub fn cmd_schema(args: &[String]) -> Result<()> {
    let schema_name = args.first().map(|s| s.as_str()).unwrap_or("list");

    match schema_name {
        "list" => {
            println!("Available schemas: descriptor, plan, config");
            Ok(())
        }
        "descriptor" => print_schema::<TypeDescriptor>(),
        "plan" => print_schema::<ClonePlan>(),
        "config" => print_schema::<ProjectConfig>(),
        _ => Err(format!("Unknown schema: {}", schema_name).into()),
    }
}

fn print_schema<T: schemars::JsonSchema>() -> Result<()> {
    let schema = schemars::schema_for!(T);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
