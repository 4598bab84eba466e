use anyhow::{bail, Result};
use rom_inspector::{decode_file, require_variant};

fn main() -> Result<()> {
    env_logger::init();
    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        bail!("Usage: bin/show_title <path-to-rom>...");
    }
    for path in &paths {
        match get_title(path) {
            Ok(Some(title)) => println!("{}: {}", path, title),
            Ok(None) => println!("{}: (no title field)", path),
            Err(e) => println!("{}: {}", path, e),
        }
    }
    Ok(())
}

fn get_title(path: &str) -> rom_inspector::Result<Option<String>> {
    let variant = require_variant(path)?;
    let record = decode_file(path, variant)?;
    Ok(record.title().map(str::to_string))
}
