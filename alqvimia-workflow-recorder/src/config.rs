use serde::{Deserialize, Serialize};

/// Configuration for recording sessions
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfig {
    /// Default action timeout, in seconds
    pub system_timeout_secs: u64,

    pub default_retry_count: u32,

    pub default_retry_delay_ms: u64,

    /// Delay applied after every captured content action (milliseconds)
    pub default_post_delay_ms: u64,

    pub default_pre_delay_ms: u64,

    /// Delay after click-family actions, which usually trigger navigation (milliseconds)
    pub navigation_post_delay_ms: u64,

    /// Whether captured text entry clears the field before typing
    pub text_entry_clear_before: bool,

    /// Maximum length of the element text kept on a captured action
    pub max_text_preview_len: usize,

    /// Capacity of the session command queue and update channel
    pub event_buffer: usize,

    /// Whether the window-binding step resizes the target window
    pub resize_window: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            system_timeout_secs: 15,
            default_retry_count: 3,
            default_retry_delay_ms: 1000,
            default_post_delay_ms: 500,
            default_pre_delay_ms: 0,
            navigation_post_delay_ms: 500,
            text_entry_clear_before: true,
            max_text_preview_len: 100,
            event_buffer: 100,
            resize_window: false,
        }
    }
}

/// Partial configuration as read from a JSON file. Unset fields keep their
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderConfigOptions {
    pub system_timeout_secs: Option<u64>,
    pub default_retry_count: Option<u32>,
    pub default_retry_delay_ms: Option<u64>,
    pub default_post_delay_ms: Option<u64>,
    pub default_pre_delay_ms: Option<u64>,
    pub navigation_post_delay_ms: Option<u64>,
    pub text_entry_clear_before: Option<bool>,
    pub max_text_preview_len: Option<usize>,
    pub event_buffer: Option<usize>,
    pub resize_window: Option<bool>,
}

impl RecorderConfigOptions {
    pub fn to_recorder_config(&self) -> RecorderConfig {
        let defaults = RecorderConfig::default();

        RecorderConfig {
            system_timeout_secs: self
                .system_timeout_secs
                .unwrap_or(defaults.system_timeout_secs),
            default_retry_count: self
                .default_retry_count
                .unwrap_or(defaults.default_retry_count),
            default_retry_delay_ms: self
                .default_retry_delay_ms
                .unwrap_or(defaults.default_retry_delay_ms),
            default_post_delay_ms: self
                .default_post_delay_ms
                .unwrap_or(defaults.default_post_delay_ms),
            default_pre_delay_ms: self
                .default_pre_delay_ms
                .unwrap_or(defaults.default_pre_delay_ms),
            navigation_post_delay_ms: self
                .navigation_post_delay_ms
                .unwrap_or(defaults.navigation_post_delay_ms),
            text_entry_clear_before: self
                .text_entry_clear_before
                .unwrap_or(defaults.text_entry_clear_before),
            max_text_preview_len: self
                .max_text_preview_len
                .unwrap_or(defaults.max_text_preview_len),
            // a zero-capacity channel would panic
            event_buffer: self.event_buffer.unwrap_or(defaults.event_buffer).max(1),
            resize_window: self.resize_window.unwrap_or(defaults.resize_window),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_fall_back_to_defaults() {
        let options: RecorderConfigOptions =
            serde_json::from_str(r#"{"systemTimeoutSecs": 30, "eventBuffer": 0}"#).unwrap();
        let config = options.to_recorder_config();
        assert_eq!(config.system_timeout_secs, 30);
        assert_eq!(config.event_buffer, 1);
        assert_eq!(config.default_retry_count, 3);
        assert!(config.text_entry_clear_before);
    }

    #[test]
    fn test_empty_options_are_default() {
        assert_eq!(
            RecorderConfigOptions::default().to_recorder_config(),
            RecorderConfig::default()
        );
    }
}
