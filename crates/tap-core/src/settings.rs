//! Global decoder tuning loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`
//!
//! Structural limits (result slots, word length, lookahead cache) are
//! compile-time constants in their owning modules, not settings.

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub costs: CostSettings,
    pub search: SearchSettings,
    pub keyboard: KeyboardSettings,
    pub autocorrect: AutocorrectSettings,
}

/// Unit costs charged by the weighting table, one per correction kind.
#[derive(Debug, Clone, Deserialize)]
pub struct CostSettings {
    pub proximity: f32,
    pub additional_proximity: f32,
    pub substitution: f32,
    pub omission: f32,
    pub insertion: f32,
    pub insertion_same_char: f32,
    pub transposition: f32,
    pub space_substitution: f32,
    pub new_word: f32,
    pub completion: f32,
    /// Scales probability-derived language costs against spatial costs.
    pub language_weight: f32,
    pub double_letter_demotion: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// Nodes above this normalized compound distance stop spawning corrections.
    pub error_correction_threshold: f32,
    pub max_edit_corrections: u16,
    /// Minimum unigram probability for a terminal to seed a next-word search.
    pub next_word_min_probability: u8,
    pub max_cache_size: usize,
    pub allow_partial_commit: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyboardSettings {
    /// First proximity ring, in key widths from the key center.
    pub proximity_radius: f32,
    /// Second (additional) ring; must be wider than the first.
    pub additional_radius: f32,
    /// Dwell gap between two same-key points that marks a deliberate double letter.
    pub strong_double_letter_dwell_ms: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutocorrectSettings {
    /// Promote every valid word's score above the autocorrect threshold.
    pub promote_valid_words: bool,
    /// Emit the dominant candidate at output slot 0 when one exists.
    pub emit_most_probable: bool,
    /// Normalized-distance lead the best terminal needs over the runner-up.
    pub most_probable_margin: f32,
    /// Language weight applied when spatial distance dominates the top terminal.
    pub min_language_weight: f32,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_negative {
        ($section:ident . $field:ident) => {
            if s.$section.$field < 0.0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
        };
    }

    check_non_negative!(costs.proximity);
    check_non_negative!(costs.additional_proximity);
    check_non_negative!(costs.substitution);
    check_non_negative!(costs.omission);
    check_non_negative!(costs.insertion);
    check_non_negative!(costs.insertion_same_char);
    check_non_negative!(costs.transposition);
    check_non_negative!(costs.space_substitution);
    check_non_negative!(costs.new_word);
    check_non_negative!(costs.completion);
    check_non_negative!(costs.language_weight);
    check_non_negative!(costs.double_letter_demotion);

    check_non_negative!(search.error_correction_threshold);
    check_non_negative!(autocorrect.most_probable_margin);
    check_non_negative!(autocorrect.min_language_weight);

    if s.search.max_cache_size == 0 {
        return Err(SettingsError::InvalidValue {
            field: "search.max_cache_size".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if s.keyboard.proximity_radius <= 0.0 {
        return Err(SettingsError::InvalidValue {
            field: "keyboard.proximity_radius".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if s.keyboard.additional_radius <= s.keyboard.proximity_radius {
        return Err(SettingsError::InvalidValue {
            field: "keyboard.additional_radius".to_string(),
            reason: "must be wider than proximity_radius".to_string(),
        });
    }
    if s.keyboard.strong_double_letter_dwell_ms < 0 {
        return Err(SettingsError::InvalidValue {
            field: "keyboard.strong_double_letter_dwell_ms".to_string(),
            reason: "must be non-negative".to_string(),
        });
    }

    Ok(())
}
