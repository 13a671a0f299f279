use anyhow::{bail, Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5050";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok();
        let bind_addr =
            std::env::var("GRADES_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let max_connections = parse_max_connections(std::env::var("DB_MAX_CONNECTIONS").ok())?;

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
        })
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to a Postgres instance")
    }
}

fn parse_max_connections(raw: Option<String>) -> Result<u32> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_MAX_CONNECTIONS);
    };
    let value: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("DB_MAX_CONNECTIONS is not a number: {raw}"))?;
    if value == 0 {
        bail!("DB_MAX_CONNECTIONS must be at least 1");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_connections_defaults_to_five() {
        assert_eq!(parse_max_connections(None).unwrap(), 5);
        assert_eq!(parse_max_connections(Some(" 12 ".into())).unwrap(), 12);
    }

    #[test]
    fn max_connections_rejects_zero_and_text() {
        assert!(parse_max_connections(Some("0".into())).is_err());
        assert!(parse_max_connections(Some("many".into())).is_err());
    }

    #[test]
    fn missing_database_url_is_reported() {
        let cfg = AppConfig {
            database_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_connections: 5,
        };
        let err = cfg.database_url().unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}
