//! `folio prompt`: print the system prompt. Needs no API key.

use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let persona = super::load_persona(&config);

    eprint!("{}", persona.diagnostic_summary());
    eprintln!();
    println!("{}", persona.system_prompt);

    Ok(())
}
