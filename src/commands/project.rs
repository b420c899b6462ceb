//! Analysis options file save/load (JSON)

use std::fs;
use std::path::Path;

use crate::audio_clean::AnalysisOptions;
use crate::error::Result;

/// Save options to disk as pretty JSON
pub fn save_options(path: &Path, options: &AnalysisOptions) -> Result<()> {
    let json = serde_json::to_string_pretty(options)?;
    fs::write(path, json)?;

    log::info!("Saved analysis options to {:?}", path);
    Ok(())
}

/// Load options from disk; missing fields take their defaults
pub fn load_options(path: &Path) -> Result<AnalysisOptions> {
    let json = fs::read_to_string(path)?;
    let options: AnalysisOptions = serde_json::from_str(&json)?;

    log::info!("Loaded analysis options from {:?}", path);
    Ok(options)
}
