use anyhow::Result;

use owlstream::addon::Manifest;
use owlstream::Config;

pub fn cmd_manifest(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&Manifest::new(config))?);
    Ok(())
}
