use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Credentials file structure
///
/// Format:
/// ```toml
/// [postgres.profile_name]
/// password = "your_postgres_password_here"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Credentials {
    #[serde(default)]
    pub postgres: HashMap<String, CredentialProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialProfile {
    pub password: String,
}

/// Get the default credentials file path: ~/.config/personal_portal/credentials.toml
pub fn get_credentials_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("personal_portal")
            .join("credentials.toml"),
    )
}

/// Load credentials from the default location
/// Returns None if the file doesn't exist
pub fn load_credentials() -> Result<Option<Credentials>, Box<dyn std::error::Error + Send + Sync>> {
    let creds_path = match get_credentials_path() {
        Some(path) if path.exists() => path,
        _ => return Ok(None),
    };

    let content = std::fs::read_to_string(&creds_path)?;
    let credentials: Credentials = toml::from_str(&content)?;

    Ok(Some(credentials))
}

/// Get the remote database password for a profile
pub fn get_postgres_password(credentials: &Option<Credentials>, profile: &str) -> Result<String, String> {
    match credentials {
        Some(creds) => creds
            .postgres
            .get(profile)
            .map(|p| p.password.clone())
            .ok_or_else(|| {
                format!(
                    "Credential profile '[postgres.{}]' not found in credentials file",
                    profile
                )
            }),
        None => Err("Credentials file not found. Expected at: ~/.config/personal_portal/credentials.toml".to_string()),
    }
}
