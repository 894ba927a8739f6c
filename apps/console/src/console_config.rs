use std::env;
use std::str::FromStr;

use coopdesk_application::MemberFilter;
use coopdesk_core::AppError;
use coopdesk_domain::{MemberStatus, MembershipType, PermissionCategory};
use tracing_subscriber::EnvFilter;

/// Initial data a console session starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedMode {
    Reference,
    Empty,
}

/// JSON rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub seed_mode: SeedMode,
    pub output_format: OutputFormat,
    /// Narrows the permission groups to one category when set.
    pub permission_category: Option<PermissionCategory>,
    pub member_filter: MemberFilter,
}

impl ConsoleConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let seed_mode = match lookup("COOPDESK_SEED")
            .unwrap_or_else(|| "reference".to_owned())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "reference" => SeedMode::Reference,
            "empty" => SeedMode::Empty,
            other => {
                return Err(AppError::Validation(format!(
                    "COOPDESK_SEED must be either 'reference' or 'empty', got '{other}'"
                )));
            }
        };

        let output_format = match lookup("COOPDESK_OUTPUT")
            .unwrap_or_else(|| "pretty".to_owned())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "pretty" => OutputFormat::Pretty,
            "compact" => OutputFormat::Compact,
            other => {
                return Err(AppError::Validation(format!(
                    "COOPDESK_OUTPUT must be either 'pretty' or 'compact', got '{other}'"
                )));
            }
        };

        let member_filter = MemberFilter {
            status: parse_optional::<MemberStatus>(&lookup, "COOPDESK_MEMBER_STATUS")?,
            membership_type: parse_optional::<MembershipType>(&lookup, "COOPDESK_MEMBERSHIP_TYPE")?,
            search: lookup("COOPDESK_MEMBER_SEARCH")
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
        };

        Ok(Self {
            seed_mode,
            output_format,
            permission_category: parse_optional(&lookup, "COOPDESK_PERMISSION_CATEGORY")?,
            member_filter,
        })
    }
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = AppError>,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    let value = value.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Ok(None);
    }

    T::from_str(value.as_str())
        .map(Some)
        .map_err(|error| AppError::Validation(format!("{name}: {}", error.message())))
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
