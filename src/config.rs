use directories::{BaseDirs, ProjectDirs};
use inquire::Text;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::model::CompanySettings;

const DEFAULT_COMPANY_TEMPLATE: &str = include_str!("../company.toml");
const DEFAULT_DATA_ROOT: &str = "~/Documents/Invoices";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    pub data_root: String,
}

impl AppSettings {
    pub fn root(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(&self.data_root))
    }

    pub fn store_dir(&self) -> PathBuf {
        self.root().join("store")
    }
}

pub fn config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "invoice-bulk", "app") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

pub fn load_settings(path: &Path) -> Result<Option<AppSettings>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&content)?))
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(settings)?)?;
    Ok(())
}

/// Company details from `<root>/company.toml`, written from the built-in
/// template on first use.
pub fn load_company_settings(root: &Path) -> Result<CompanySettings> {
    let path = root.join("company.toml");
    if path.exists() {
        let content = fs::read_to_string(&path)?;
        return Ok(toml::from_str(&content)?);
    }
    info!(path = %path.display(), "Initializing default company settings");
    fs::create_dir_all(root)?;
    fs::write(&path, DEFAULT_COMPANY_TEMPLATE)?;
    Ok(toml::from_str(DEFAULT_COMPANY_TEMPLATE)?)
}

pub fn setup_config_wizard(path: &Path) -> Result<AppSettings> {
    println!("\n⚙️  --- Configuration Setup ---");
    let current = load_settings(path).ok().flatten();
    let default_val = current
        .map(|s| s.data_root)
        .unwrap_or_else(|| DEFAULT_DATA_ROOT.to_string());

    println!("📂 Opening folder picker...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Select Invoice Data Directory")
        .pick_folder();

    let data_root = match picked_path {
        Some(path) => path.to_string_lossy().to_string(),
        None => {
            println!("❌ No folder selected. Falling back to manual input.");
            Text::new("Enter Invoice Data Directory:")
                .with_default(&default_val)
                .prompt()?
        }
    };

    let settings = AppSettings { data_root };
    save_settings(path, &settings)?;
    debug!(path = %path.display(), "Settings saved");
    println!("✅ Settings saved.");
    Ok(settings)
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/settings.toml");
        assert_eq!(load_settings(&path).unwrap(), None);

        let settings = AppSettings { data_root: "/srv/invoices".into() };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), Some(settings.clone()));
        assert_eq!(settings.store_dir(), PathBuf::from("/srv/invoices/store"));
    }

    #[test]
    fn test_company_settings_created_from_template() {
        let tmp = TempDir::new().unwrap();
        let company = load_company_settings(tmp.path()).unwrap();
        assert!(tmp.path().join("company.toml").exists());
        assert_eq!(company.currency_symbol, "R");
        assert_eq!(company.bank_accounts.len(), 1);
        assert_eq!(company.abbreviation, None);

        fs::write(
            tmp.path().join("company.toml"),
            "name = \"Acme Widget Co\"\nabbreviation = \"AW\"\n",
        )
        .unwrap();
        let company = load_company_settings(tmp.path()).unwrap();
        assert_eq!(company.name, "Acme Widget Co");
        assert_eq!(company.abbreviation.as_deref(), Some("AW"));
        assert!(company.bank_accounts.is_empty());
        assert_eq!(company.address, "");
    }

    #[test]
    fn test_expand_home_dir_leaves_absolute_paths() {
        assert_eq!(expand_home_dir("/data/invoices"), "/data/invoices");
        assert!(!expand_home_dir("~/invoices").starts_with('~') || BaseDirs::new().is_none());
    }
}
