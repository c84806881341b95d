//! Descriptor commands: compile, render, check

use super::util::{load_config, parse_output_arg, parse_target_arg, read_input, write_output};
use cloneplan::*;

pub fn cmd_compile(args: &[String]) -> Result<()> {
    let input = read_input(args, "Usage: cloneplan compile <types.yaml> [--json]")?;
    let json_output = args.contains(&"--json".to_string());

    let config = load_config(args)?;
    let pipeline = Pipeline::from_config(&config);
    let plans = pipeline.compile_all(&pipeline.load(&input)?)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    for plan in &plans {
        println!(
            "{} ({} / {})",
            plan.fqn, plan.operations.fast, plan.operations.safe
        );
        for assignment in plan.assignments(CloneOp::Fast) {
            match assignment {
                Assignment::Cloned(member) => println!("  {}: {}", member.name, member.accessor),
                Assignment::Retained(name) => println!("  {}: copy (ignored)", name),
            }
        }
    }
    Ok(())
}

pub fn cmd_render(args: &[String]) -> Result<()> {
    let input = read_input(
        args,
        "Usage: cloneplan render <types.yaml> [--lang csharp|typescript] [--output DIR]",
    )?;
    let output = parse_output_arg(args);

    let config = load_config(args)?;
    let targets = match parse_target_arg(args)? {
        Some(target) => vec![target],
        None => config.render.targets.clone(),
    };

    let pipeline = Pipeline::from_config(&config);
    let plans = pipeline.compile_all(&pipeline.load(&input)?)?;

    for target in targets {
        for unit in pipeline.render_all(&plans, target)? {
            write_output(&output, &unit.file_name, &unit.content)?;
        }
    }
    Ok(())
}

pub fn cmd_check(args: &[String]) -> Result<()> {
    let input = read_input(args, "Usage: cloneplan check <types.yaml> [--json]")?;
    let json_output = args.contains(&"--json".to_string());

    let descriptors = parse_descriptors(&input)?;
    let issues: Vec<(String, Vec<String>)> = descriptors
        .iter()
        .map(|desc| (desc.name.clone(), desc.validate()))
        .filter(|(_, errors)| !errors.is_empty())
        .collect();

    if json_output {
        let report: Vec<_> = issues
            .iter()
            .map(|(name, errors)| serde_json::json!({ "type": name, "errors": errors }))
            .collect();
        let output = serde_json::json!({
            "valid": issues.is_empty(),
            "types": descriptors.len(),
            "issues": report,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if issues.is_empty() {
        println!("✓ {} type(s) valid", descriptors.len());
    } else {
        for (name, errors) in &issues {
            for error in errors {
                println!("✗ {}: {}", name, error);
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(format!("{} invalid type(s)", issues.len()).into())
    }
}
