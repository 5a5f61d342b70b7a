use std::env;
use std::str::FromStr;
use tracing::warn;

/// How dates are spoken back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    /// "Thursday, February 15, 2024"
    #[default]
    Long,
    /// "Thursday, February 15"
    Brief,
}

impl FromStr for DateStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(DateStyle::Long),
            "brief" | "short" => Ok(DateStyle::Brief),
            other => Err(format!("unknown date style: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_key: Option<String>,
    pub doctors_table: String,
    pub appointments_table: String,
    pub store_page_size: usize,
    pub store_order_column: String,
    pub webhook_secret: Option<String>,
    pub date_style: DateStyle,
    pub booking_slot_lock: bool,
    pub generative_phrasing: bool,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub port: u16,
}

pub const DEFAULT_PAGE_SIZE: usize = 100;
/// Supabase's default `max-rows`. A larger page would come back truncated
/// and read as the last page.
pub const MAX_PAGE_SIZE: usize = 1000;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_key: None,
            doctors_table: "doctors".to_string(),
            appointments_table: "appointments".to_string(),
            store_page_size: DEFAULT_PAGE_SIZE,
            store_order_column: "id".to_string(),
            webhook_secret: None,
            date_style: DateStyle::Long,
            booking_slot_lock: false,
            generative_phrasing: false,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            port: 3000,
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn flag_var(name: &str) -> bool {
    optional_var(name)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_key: optional_var("SUPABASE_SERVICE_ROLE_KEY"),
            doctors_table: optional_var("DOCTORS_TABLE").unwrap_or(defaults.doctors_table),
            appointments_table: optional_var("APPOINTMENTS_TABLE")
                .unwrap_or(defaults.appointments_table),
            store_page_size: optional_var("STORE_PAGE_SIZE")
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|size| *size > 0)
                .unwrap_or_else(|| {
                    if env::var("STORE_PAGE_SIZE").is_ok() {
                        warn!("STORE_PAGE_SIZE invalid, using default {}", DEFAULT_PAGE_SIZE);
                    }
                    DEFAULT_PAGE_SIZE
                })
                .min(MAX_PAGE_SIZE),
            store_order_column: optional_var("STORE_ORDER_COLUMN")
                .unwrap_or(defaults.store_order_column),
            webhook_secret: optional_var("WEBHOOK_SECRET").or_else(|| {
                warn!("WEBHOOK_SECRET not set, webhooks will accept unauthenticated requests");
                None
            }),
            date_style: optional_var("DATE_STYLE")
                .map(|value| {
                    value.parse().unwrap_or_else(|e: String| {
                        warn!("{}, using long date style", e);
                        DateStyle::Long
                    })
                })
                .unwrap_or_default(),
            booking_slot_lock: flag_var("BOOKING_SLOT_LOCK"),
            generative_phrasing: flag_var("GENERATIVE_PHRASING"),
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_base_url: optional_var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: optional_var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            port: optional_var("PORT")
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        if optional_var("STORE_PAGE_SIZE")
            .and_then(|value| value.parse::<usize>().ok())
            .is_some_and(|size| size > MAX_PAGE_SIZE)
        {
            warn!("STORE_PAGE_SIZE above {}, capped to the server row limit", MAX_PAGE_SIZE);
        }

        if config.generative_phrasing && config.openai_api_key.is_none() {
            warn!("GENERATIVE_PHRASING enabled but OPENAI_API_KEY not set, using templates only");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_generative_phrasing_enabled(&self) -> bool {
        self.generative_phrasing && self.openai_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_style_parses_known_values() {
        assert_eq!("long".parse::<DateStyle>(), Ok(DateStyle::Long));
        assert_eq!(" Brief ".parse::<DateStyle>(), Ok(DateStyle::Brief));
        assert!("medium".parse::<DateStyle>().is_err());
    }

    #[test]
    fn generative_phrasing_requires_key() {
        let mut config = AppConfig {
            generative_phrasing: true,
            ..AppConfig::default()
        };
        assert!(!config.is_generative_phrasing_enabled());

        config.openai_api_key = Some("sk-test".to_string());
        assert!(config.is_generative_phrasing_enabled());
    }
}
