//! Consumer configuration, read from the environment.

/// Default NATS server URL.
const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// Default subject the game server publishes on.
const DEFAULT_SUBJECT: &str = "dropline.games.ended";

/// Where to read events from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// NATS server URL.
    pub nats_url: String,
    /// Subject carrying `GAME_ENDED` events.
    pub subject: String,
}

impl AnalyticsConfig {
    /// Load from `NATS_URL` and `ANALYTICS_SUBJECT`, with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            nats_url: non_empty("NATS_URL").unwrap_or_else(|| DEFAULT_NATS_URL.to_owned()),
            subject: non_empty("ANALYTICS_SUBJECT").unwrap_or_else(|| DEFAULT_SUBJECT.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset_or_blank() {
        let config = AnalyticsConfig::from_lookup(|name| {
            (name == "ANALYTICS_SUBJECT").then(|| String::from("  "))
        });
        assert_eq!(config.nats_url, DEFAULT_NATS_URL);
        assert_eq!(config.subject, DEFAULT_SUBJECT);
    }

    #[test]
    fn variables_override_defaults() {
        let config = AnalyticsConfig::from_lookup(|name| match name {
            "NATS_URL" => Some(String::from("nats://bus:4222")),
            "ANALYTICS_SUBJECT" => Some(String::from("games.test")),
            _ => None,
        });
        assert_eq!(config.nats_url, "nats://bus:4222");
        assert_eq!(config.subject, "games.test");
    }
}
