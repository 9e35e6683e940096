use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// When on, creating a booking requires the room to be available and
    /// flips it to booked in the same operation. Off leaves the flag to
    /// the explicit book-room path; booking creation never touches it.
    #[serde(default)]
    pub strict_availability: bool,
    #[serde(default = "default_credential_cost")]
    pub credential_cost: u32,
}

fn default_credential_cost() -> u32 {
    10
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            strict_availability: false,
            credential_cost: default_credential_cost(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of LINDEN)
            // Eg.. `LINDEN__BUSINESS_RULES__STRICT_AVAILABILITY=1`
            .add_source(config::Environment::with_prefix("LINDEN").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
