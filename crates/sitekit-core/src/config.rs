use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (holds the persisted key-value store)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Which site's selector presets and constants to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteProfile {
    /// Bank information site: generated mobile toggle, counters, cookie notice
    #[default]
    Bank,
    /// Retail product site: static mobile toggle, product catalog, forms
    Retail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Selector preset
    #[serde(default)]
    pub profile: SiteProfile,
    /// URL the page is served from; link hrefs are resolved against it
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            profile: SiteProfile::default(),
            base_url: default_base_url(),
        }
    }
}

/// How the responsive menu's toggle control comes to exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "selector")]
pub enum MenuMode {
    /// A toggle button is created below the breakpoint and removed above it
    Generated,
    /// The page ships its own toggle control
    Static(String),
}

/// Selectors and per-site constants derived from a [`SiteProfile`]
#[derive(Debug, Clone, Serialize)]
pub struct SiteSelectors {
    pub nav_links: String,
    pub nav_menu: String,
    pub nav_container: String,
    pub header: Option<String>,
    pub sections: String,
    pub anchors: String,
    pub reveal_targets: String,
    pub reveal_class: String,
    pub metric_displays: String,
    pub indicators: Vec<String>,
    pub cookie_notice: String,
    pub search_input: String,
    pub search_button: String,
    pub video_card: String,
    pub play_buttons: String,
    pub watch_buttons: String,
    pub service_cards: String,
    pub content_section: String,
    pub see_more: String,
    pub filter_buttons: String,
    pub product_cards: String,
    pub add_to_cart: String,
    pub contact_form: String,
    pub newsletter_form: String,
    pub menu_mode: MenuMode,
    /// Margin above each section where scroll-spy activation begins
    pub section_margin_px: f64,
}

impl SiteSelectors {
    pub fn for_profile(profile: SiteProfile) -> Self {
        let shared = Self {
            nav_links: ".nav-menu a".to_string(),
            nav_menu: ".nav-menu".to_string(),
            nav_container: ".nav-container".to_string(),
            header: None,
            sections: "section[id]".to_string(),
            anchors: "a[href^=\"#\"]".to_string(),
            reveal_targets: ".content-section, .video-card, .service-card".to_string(),
            reveal_class: "fade-in-up".to_string(),
            metric_displays: ".indicator .value".to_string(),
            indicators: (1..=4)
                .map(|n| format!(".indicator:nth-child({}) .value", n))
                .collect(),
            cookie_notice: "#cookieNotice".to_string(),
            search_input: ".search-box input".to_string(),
            search_button: ".search-box button".to_string(),
            video_card: ".video-card".to_string(),
            play_buttons: ".play-button".to_string(),
            watch_buttons: ".watch-btn".to_string(),
            service_cards: ".service-card".to_string(),
            content_section: ".content-section".to_string(),
            see_more: ".see-more".to_string(),
            filter_buttons: ".filter-button".to_string(),
            product_cards: ".product-card".to_string(),
            add_to_cart: ".add-to-cart".to_string(),
            contact_form: ".contact-form".to_string(),
            newsletter_form: ".newsletter-form".to_string(),
            menu_mode: MenuMode::Generated,
            section_margin_px: 0.0,
        };

        match profile {
            SiteProfile::Bank => shared,
            SiteProfile::Retail => Self {
                nav_links: ".nav-link".to_string(),
                header: Some(".header".to_string()),
                reveal_targets: ".product-card, .about-image, .testimonial-card, .contact-form"
                    .to_string(),
                reveal_class: "fade-in".to_string(),
                menu_mode: MenuMode::Static(".mobile-toggle".to_string()),
                section_margin_px: 100.0,
                ..shared
            },
        }
    }
}

/// Easing curve used by eased animations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EasingType {
    Linear,
    /// 1 - (1-t)^3
    #[default]
    Cubic,
    /// 1 - (1-t)^4
    Quartic,
    /// 1 - (1-t)^5
    Quintic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Counter animation duration in milliseconds
    #[serde(default = "default_counter_duration")]
    pub counter_duration_ms: u64,
    /// Frame rate used by the async runtime's frame clock
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Fraction of an element that must be visible before it is revealed
    #[serde(default = "default_reveal_threshold")]
    pub reveal_threshold: f64,
    /// Pixels trimmed from the bottom of the viewport for reveal checks
    #[serde(default = "default_reveal_bottom_margin")]
    pub reveal_bottom_margin_px: f64,
    /// Glyph that marks a metric display as a currency amount
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            counter_duration_ms: default_counter_duration(),
            animation_fps: default_animation_fps(),
            reveal_threshold: default_reveal_threshold(),
            reveal_bottom_margin_px: default_reveal_bottom_margin(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Overrides the profile's scroll-spy margin
    #[serde(default)]
    pub section_margin_px: Option<f64>,
    /// Enable smooth scrolling
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Smooth scroll duration in milliseconds
    #[serde(default = "default_smooth_duration")]
    pub smooth_duration_ms: u64,
    /// Easing curve for smooth scrolling
    #[serde(default)]
    pub easing: EasingType,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            section_margin_px: None,
            smooth_enabled: default_true(),
            smooth_duration_ms: default_smooth_duration(),
            easing: EasingType::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Widths at or below this use the collapsed mobile layout
    #[serde(default = "default_breakpoint")]
    pub breakpoint_px: f64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: default_breakpoint(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Key of the persisted acknowledgement flag
    #[serde(default = "default_cookie_key")]
    pub storage_key: String,
    /// Fade-out duration before the notice is hidden
    #[serde(default = "default_fade_out")]
    pub fade_out_ms: u64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            storage_key: default_cookie_key(),
            fade_out_ms: default_fade_out(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Indicator refresh cycle in seconds (0 = disabled)
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
    /// How long the highlight flash stays on
    #[serde(default = "default_flash")]
    pub flash_ms: u64,
    /// Highlight background colour
    #[serde(default = "default_flash_color")]
    pub flash_color: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_interval(),
            flash_ms: default_flash(),
            flash_color: default_flash_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Quiet period before the scroll-position handler runs (0 = immediate)
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    /// Scroll offset past which the header gets the `scrolled` class
    #[serde(default = "default_header_threshold")]
    pub header_scrolled_threshold_px: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            header_scrolled_threshold_px: default_header_threshold(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sitekit")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_counter_duration() -> u64 {
    2000
}

fn default_animation_fps() -> u32 {
    60
}

fn default_reveal_threshold() -> f64 {
    0.1
}

fn default_reveal_bottom_margin() -> f64 {
    50.0
}

fn default_currency_symbol() -> String {
    "₦".to_string()
}

fn default_smooth_duration() -> u64 {
    400
}

fn default_breakpoint() -> f64 {
    768.0
}

fn default_cookie_key() -> String {
    "cbnCookiesAccepted".to_string()
}

fn default_fade_out() -> u64 {
    500
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_flash() -> u64 {
    300
}

fn default_flash_color() -> String {
    "rgba(255, 215, 0, 0.3)".to_string()
}

fn default_debounce() -> u64 {
    100
}

fn default_header_threshold() -> f64 {
    50.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/sitekit/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("sitekit")
            .join("config.toml")
    }

    /// Get the persisted key-value store path
    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("local_storage.json")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Selector presets for the configured profile, with overrides applied
    pub fn selectors(&self) -> SiteSelectors {
        let mut selectors = SiteSelectors::for_profile(self.site.profile);
        if let Some(margin) = self.navigation.section_margin_px {
            selectors.section_margin_px = margin;
        }
        selectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.site.profile, SiteProfile::Bank);
        assert_eq!(config.animation.counter_duration_ms, 2000);
        assert_eq!(config.menu.breakpoint_px, 768.0);
        assert_eq!(config.cookie.storage_key, "cbnCookiesAccepted");
        assert_eq!(config.cookie.fade_out_ms, 500);
        assert_eq!(config.refresh.interval_secs, 30);
        assert_eq!(config.scroll.debounce_ms, 100);
    }

    #[test]
    fn test_profile_margins() {
        assert_eq!(SiteSelectors::for_profile(SiteProfile::Bank).section_margin_px, 0.0);
        assert_eq!(SiteSelectors::for_profile(SiteProfile::Retail).section_margin_px, 100.0);
    }

    #[test]
    fn test_margin_override() {
        let config = AppConfig::from_toml(
            r#"
            [site]
            profile = "retail"

            [navigation]
            section_margin_px = 40.0
            easing = "quintic"
            "#,
        )
        .unwrap();
        assert_eq!(config.selectors().section_margin_px, 40.0);
        assert_eq!(config.selectors().nav_links, ".nav-link");
        assert_eq!(config.navigation.easing, EasingType::Quintic);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[site\nprofile = ").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        let path = std::path::Path::new("/var/lib/sitekit");
        assert_eq!(expand_tilde(path), PathBuf::from("/var/lib/sitekit"));
    }
}
