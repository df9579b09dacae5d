use anyhow::Result;
use std::path::PathBuf;

use crate::config::HandoverConfig;

pub struct ConfigCommand {
    pub settings: HandoverConfig,
    pub write: Option<PathBuf>,
    pub json: bool,
}

impl ConfigCommand {
    pub fn new(settings: HandoverConfig, write: Option<PathBuf>) -> Self {
        Self {
            settings,
            write,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn execute(&self) -> Result<()> {
        if let Some(path) = &self.write {
            self.settings.save_to_file(path)?;
            println!("✅ Configuration written to {}", path.display());
        } else if self.json {
            println!("{}", serde_json::to_string_pretty(&self.settings)?);
        } else {
            print!("{}", toml::to_string_pretty(&self.settings)?);
        }
        Ok(())
    }
}
