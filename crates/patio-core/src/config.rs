//! Application configuration.
//!
//! Two pieces: the model/session settings for the external generative
//! service, and the restaurant profile the system instruction is built from.
//! The profile ships with compiled-in defaults and can be overridden from a
//! TOML file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PatioError, Result};

const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
/// Per-call deadline enforced by the relay, not the service.
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(15_000);

/// Settings for the external generative-language session.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub deadline: Duration,
}

impl ModelConfig {
    /// Creates a config with the provided API key and default model settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Loads the API key from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| PatioError::config(format!("{API_KEY_ENV} is not set")))?;
        if api_key.trim().is_empty() {
            return Err(PatioError::config(format!("{API_KEY_ENV} is empty")));
        }
        Ok(Self::new(api_key))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Facts about the restaurant that the system instruction encodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantProfile {
    pub name: String,
    pub address: String,
    pub maps_url: String,
    pub menu_url: String,
    /// WhatsApp number in local format, shown to the user.
    pub whatsapp_number: String,
    /// wa.me contact link used by call-type options.
    pub whatsapp_url: String,
    pub opening_hours: String,
}

impl Default for RestaurantProfile {
    fn default() -> Self {
        Self {
            name: "PATIO FUNES".to_string(),
            address: "Dean Funes 2045, Buenos Aires, Argentina".to_string(),
            maps_url: "https://maps.app.goo.gl/DeWhrYeCu1pSsHss7".to_string(),
            menu_url: "https://menu.maxirest.com/37835".to_string(),
            whatsapp_number: "1131804595".to_string(),
            whatsapp_url: "https://wa.me/5491131804595".to_string(),
            opening_hours: "Martes a Domingo de 12:00 a 15:30 y 20:00 a 00:00".to_string(),
        }
    }
}

impl RestaurantProfile {
    /// Loads a profile from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads a profile from `path` if the file exists, otherwise the
    /// compiled-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
