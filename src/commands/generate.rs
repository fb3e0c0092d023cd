use console::style;
use miette::Result;
use stamper::{GenerateOptions, PlannedAction};

use super::parse_data;

pub fn run(
    manifest: String,
    output: String,
    data: Vec<String>,
    overwrite: bool,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let options = GenerateOptions {
        data: parse_data(data),
        overwrite,
        ..GenerateOptions::new(manifest, output)
    };

    if !dry_run {
        let report = stamper::generate(&options)?;

        println!(
            "\n{} Generated into {}",
            style("✓").green().bold(),
            style(options.output.display()).cyan()
        );
        for path in &report.written {
            println!("  {} {}", style("write").green(), path.display());
        }
        for path in &report.skipped {
            println!("  {} {}", style("skip ").yellow(), path.display());
        }
        println!(
            "  {} files written, {} skipped",
            report.written.len(),
            report.skipped.len()
        );
        return Ok(());
    }

    let plan = stamper::plan_generation(&options)?;

    println!(
        "\n{} Dry run: files that would be generated in {}:",
        style("==>").cyan().bold(),
        style(plan.output_dir.display()).cyan()
    );

    for output in &plan.outputs {
        let action = match output.action {
            PlannedAction::Create => style("create   ").green(),
            PlannedAction::Overwrite => style("overwrite").yellow(),
            PlannedAction::Skip => style("skip     ").dim(),
        };
        println!(
            "  {} {} {}",
            action,
            output.rendered.output_name,
            style(format!("({})", output.rendered.builder)).dim()
        );

        if verbose && output.action != PlannedAction::Skip {
            println!("  {}", style("──────").dim());
            for line in output.rendered.content.lines() {
                println!("  {}", line);
            }
            println!("  {}", style("──────").dim());
            println!();
        }
    }

    println!(
        "\n{} Dry run: no files written.",
        style("ℹ").blue().bold()
    );

    Ok(())
}
