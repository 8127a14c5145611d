use auji_core::AppError;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection settings for the job database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Read configuration from environment variables.
    ///
    /// - `DATABASE_URL` (required)
    /// - `DATABASE_MAX_CONNECTIONS` (optional, defaults to 5)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                AppError::ConfigError("DATABASE_URL not set. Jobs cannot be stored without it.".into())
            })?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => {
                    return Err(AppError::ConfigError(
                        "DATABASE_MAX_CONNECTIONS must be at least 1".into(),
                    ));
                }
                Ok(n) => n,
                Err(_) => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid DATABASE_MAX_CONNECTIONS '{raw}': must be a positive integer"
                    )));
                }
            },
        };

        Ok(Self {
            url,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: Option<&str>, max: Option<&str>) -> Result<DatabaseConfig, AppError> {
        DatabaseConfig::from_lookup(|key| match key {
            "DATABASE_URL" => url.map(str::to_string),
            "DATABASE_MAX_CONNECTIONS" => max.map(str::to_string),
            _ => None,
        })
    }

    #[test]
    fn test_url_required() {
        assert!(matches!(config(None, None), Err(AppError::ConfigError(_))));
        assert!(matches!(config(Some("  "), None), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_max_connections() {
        let url = Some("postgres://localhost/auji");
        assert_eq!(config(url, None).unwrap().max_connections, 5);
        assert_eq!(config(url, Some("12")).unwrap().max_connections, 12);
        assert!(config(url, Some("0")).is_err());
        assert!(config(url, Some("many")).is_err());
    }
}
