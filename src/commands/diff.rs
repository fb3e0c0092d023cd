use console::style;
use miette::Result;
use stamper::diff::FileChange;
use stamper::GenerateOptions;

use super::parse_data;

pub fn run(manifest: String, output: String, data: Vec<String>) -> Result<()> {
    let options = GenerateOptions {
        data: parse_data(data),
        ..GenerateOptions::new(manifest, output)
    };

    let diffs = stamper::diff_generation(&options)?;

    let mut changed = 0;
    for diff in &diffs {
        match &diff.change {
            FileChange::Unchanged => {}
            FileChange::Added => {
                changed += 1;
                println!("{} {}", style("+").green(), diff.path.display());
            }
            FileChange::Modified(text) => {
                changed += 1;
                println!("{} {}", style("~").cyan(), diff.path.display());
                for line in text.lines() {
                    let line = if line.starts_with('+') && !line.starts_with("+++") {
                        style(line).green()
                    } else if line.starts_with('-') && !line.starts_with("---") {
                        style(line).red()
                    } else {
                        style(line).dim()
                    };
                    println!("  {line}");
                }
            }
        }
    }

    if changed == 0 {
        println!(
            "{} Output is up to date with the templates",
            style("✓").green().bold()
        );
    } else {
        println!("\n{changed} of {} files would change", diffs.len());
    }

    Ok(())
}
