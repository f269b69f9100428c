//! Centralized defaults for the sales assistant
//!
//! Values shared between the settings defaults and the crates that fall
//! back to them when no settings are available (tests, tools).

/// Text limits
pub mod limits {
    /// Maximum characters kept in a text signature
    pub const SIGNATURE_MAX_CHARS: usize = 160;

    /// Soft cap for a reply once a promotion CTA is appended
    pub const PROMO_MAX_CHARS: usize = 260;

    /// Smallest accepted promo cap; anything lower leaves no room for a CTA
    pub const PROMO_MIN_CHARS: usize = 40;
}

/// Reply templating
pub mod templates {
    /// Placeholder replaced by the customer's name
    pub const NAME_PLACEHOLDER: &str = "{name}";

    /// Label used when the customer name is empty
    pub const DEFAULT_CUSTOMER_NAME: &str = "amigo";
}

/// Snapshot names handled by the persistence provider
pub mod snapshots {
    pub const VARIANTS: &str = "variants";
    pub const STATS: &str = "stats";
}

/// Service endpoints (defaults for local development)
pub mod endpoints {
    /// OpenAI-compatible chat completions endpoint
    pub const LLM_DEFAULT: &str = "https://api.openai.com/v1";

    /// Default chat model
    pub const LLM_MODEL_DEFAULT: &str = "gpt-4o-mini";
}
