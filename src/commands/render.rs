use miette::Result;
use stamper::GenerateOptions;

use super::parse_data;

pub fn run(manifest: String, builder: String, data: Vec<String>) -> Result<()> {
    let options = GenerateOptions {
        data: parse_data(data),
        ..GenerateOptions::new(manifest, ".")
    };
    let content = stamper::render_builder(&options, &builder)?;
    print!("{content}");
    Ok(())
}
