use super::models::Config;
use crate::race::paths::{PathError, PathSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No delivery paths configured (at least one is required)")]
    NoPathsConfigured,

    #[error("Delivery path name must not be empty (position {index})")]
    EmptyPathName { index: usize },

    #[error("Delivery path '{name}' is declared more than once")]
    DuplicatePathName { name: String },

    #[error("Delivery path '{name}' template has no {{url}} or {{url_encoded}} placeholder")]
    MissingPlaceholder { name: String },

    #[error("Race deadline must be positive")]
    ZeroDeadline,

    #[error("User agent must not be empty")]
    EmptyUserAgent,

    #[error("connect_timeout ({connect}) exceeds request_timeout ({request})")]
    ConnectTimeoutExceedsRequest { connect: String, request: String },
}

impl From<PathError> for ValidationError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::NoPaths => ValidationError::NoPathsConfigured,
            PathError::MissingPlaceholder(name) => ValidationError::MissingPlaceholder { name },
            PathError::DuplicateName(name) => ValidationError::DuplicatePathName { name },
        }
    }
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_paths(config)?;
    validate_race(config)?;
    Ok(())
}

/// Names must be non-blank; the remaining path rules are the ones `PathSet`
/// enforces at construction
fn validate_paths(config: &Config) -> Result<(), ValidationError> {
    if let Some(index) = config.paths.iter().position(|p| p.name.trim().is_empty()) {
        return Err(ValidationError::EmptyPathName { index });
    }

    PathSet::from_config(&config.paths)?;
    Ok(())
}

fn validate_race(config: &Config) -> Result<(), ValidationError> {
    let race = &config.race;

    if race.deadline.is_zero() {
        return Err(ValidationError::ZeroDeadline);
    }

    if race.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }

    if race.connect_timeout > race.request_timeout {
        return Err(ValidationError::ConnectTimeoutExceedsRequest {
            connect: race.connect_timeout.to_string(),
            request: race.request_timeout.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::*;
    use crate::humanize::HumanDuration;

    #[test]
    fn test_valid_default_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_no_paths() {
        let mut config = Config::default();
        config.paths.clear();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::NoPathsConfigured)));
    }

    #[test]
    fn test_duplicate_path_name() {
        let mut config = Config::default();
        config.paths.push(PathConfig::new("direct", "{url}"));

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::DuplicatePathName { ref name }) if name == "direct"
        ));
    }

    #[test]
    fn test_missing_placeholder() {
        let mut config = Config::default();
        config.paths = vec![PathConfig::new("static", "https://example.com/feed.xml")];

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::MissingPlaceholder { .. })));
    }

    #[test]
    fn test_path_rules_match_path_set() {
        let cases = [
            vec![],
            vec![PathConfig::new("a", "{url}"), PathConfig::new("a", "https://r/{url_encoded}")],
            vec![PathConfig::new("fixed", "https://example.com/feed.xml")],
        ];

        for paths in cases {
            let config = Config { paths, ..Config::default() };
            let from_set = PathSet::from_config(&config.paths).unwrap_err();
            let from_validation = validate(&config).unwrap_err();
            assert_eq!(
                from_validation.to_string(),
                ValidationError::from(from_set).to_string()
            );
        }
    }

    #[test]
    fn test_blank_path_name() {
        let mut config = Config::default();
        config.paths.insert(1, PathConfig::new("  ", "{url}"));

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::EmptyPathName { index: 1 })));
    }

    #[test]
    fn test_zero_deadline() {
        let mut config = Config::default();
        config.race.deadline = HumanDuration::from_millis(0);

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroDeadline)));
    }

    #[test]
    fn test_connect_timeout_above_request_timeout() {
        let mut config = Config::default();
        config.race.connect_timeout = HumanDuration::from_secs(90);

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::ConnectTimeoutExceedsRequest { .. })
        ));
    }
}
