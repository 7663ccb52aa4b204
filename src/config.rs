use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::grid::GridOptions;
use crate::temporal::FiscalCalendar;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Writes the commented default config.toml. Refuses to overwrite unless `force`.
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version
    pub version: String,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub fiscal: FiscalConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub row_numbers: bool,
    pub default_column_width: u16,
    pub min_column_width: u16,
    pub max_column_width: u16,
    /// Placeholder cells are drawn while scroll keys arrive faster than this. 0 disables.
    pub scroll_placeholder_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FiscalConfig {
    /// Month (1-12) the fiscal year starts in
    pub year_start_month: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Persist sort, filters and column order between runs
    pub enabled: bool,
    /// Overrides the per-user data directory
    pub state_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub level: String,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: String,
    pub colors: ColorConfig,
}

/// Declares the theme color fields once; entries, validation and merge follow from it.
macro_rules! color_config {
    ($($field:ident = $default:expr),* $(,)?) => {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(default)]
        pub struct ColorConfig {
            $(pub $field: String,)*
        }

        impl Default for ColorConfig {
            fn default() -> Self {
                Self {
                    $($field: $default.to_string(),)*
                }
            }
        }

        impl ColorConfig {
            /// (name, value) for every color
            pub fn entries(&self) -> Vec<(&'static str, &str)> {
                vec![$((stringify!($field), self.$field.as_str()),)*]
            }

            pub fn merge(&mut self, other: Self) {
                let default = ColorConfig::default();
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )*
            }
        }
    };
}

color_config! {
    primary = "cyan",
    secondary = "yellow",
    success = "green",
    error = "red",
    warning = "yellow",
    dimmed = "dark_gray",
    background = "black",
    surface = "black",
    controls_bg = "indexed(236)",
    text_primary = "white",
    text_secondary = "dark_gray",
    text_inverse = "black",
    table_header = "white",
    table_border = "cyan",
    table_selected = "reversed",
    sort_indicator = "yellow",
    filter_indicator = "green",
    scroll_placeholder = "indexed(238)",
    menu_disabled = "dark_gray",
    cursor_focused = "default",
    modal_border = "cyan",
    modal_border_active = "yellow",
    modal_border_error = "red",
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            fiscal: FiscalConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            row_numbers: false,
            default_column_width: 14,
            min_column_width: 4,
            max_column_width: 60,
            scroll_placeholder_ms: 80,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for FiscalConfig {
    fn default() -> Self {
        Self {
            year_start_month: 1,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            state_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "auto".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        Self::load_from(&ConfigManager::new(app_name)?)
    }

    /// Defaults overlaid with `config.toml` from the manager's directory, if present.
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(Self::read_user_config(manager)?);
        config.validate()?;
        Ok(config)
    }

    fn read_user_config(manager: &ConfigManager) -> Result<AppConfig> {
        let config_path = manager.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.fiscal.merge(other.fiscal);
        self.storage.merge(other.storage);
        self.logging.merge(other.logging);
        self.theme.merge(other.theme);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        let display = &self.display;
        if display.min_column_width == 0 {
            return Err(eyre!("min_column_width must be greater than 0"));
        }
        if display.min_column_width > display.max_column_width {
            return Err(eyre!(
                "min_column_width ({}) must not exceed max_column_width ({})",
                display.min_column_width,
                display.max_column_width
            ));
        }
        if !(display.min_column_width..=display.max_column_width)
            .contains(&display.default_column_width)
        {
            return Err(eyre!(
                "default_column_width must be between {} and {}",
                display.min_column_width,
                display.max_column_width
            ));
        }

        if !(1..=12).contains(&self.fiscal.year_start_month) {
            return Err(eyre!(
                "Invalid fiscal year_start_month: {}. Must be 1-12",
                self.fiscal.year_start_month
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(eyre!(
                "Invalid log level: {}. Must be one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }

        match self.theme.color_mode.as_str() {
            "light" | "dark" | "auto" => {}
            _ => {
                return Err(eyre!(
                    "Invalid color_mode: {}. Must be 'light', 'dark', or 'auto'",
                    self.theme.color_mode
                ))
            }
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }

    pub fn fiscal_calendar(&self) -> FiscalCalendar {
        FiscalCalendar::new(self.fiscal.year_start_month)
    }

    pub fn grid_options(&self, reset_view: bool) -> GridOptions {
        GridOptions {
            fiscal: self.fiscal_calendar(),
            min_column_width: self.display.min_column_width,
            max_column_width: self.display.max_column_width,
            reset_view,
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.row_numbers != default.row_numbers {
            self.row_numbers = other.row_numbers;
        }
        if other.default_column_width != default.default_column_width {
            self.default_column_width = other.default_column_width;
        }
        if other.min_column_width != default.min_column_width {
            self.min_column_width = other.min_column_width;
        }
        if other.max_column_width != default.max_column_width {
            self.max_column_width = other.max_column_width;
        }
        if other.scroll_placeholder_ms != default.scroll_placeholder_ms {
            self.scroll_placeholder_ms = other.scroll_placeholder_ms;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl FiscalConfig {
    pub fn merge(&mut self, other: Self) {
        if other.year_start_month != FiscalConfig::default().year_start_month {
            self.year_start_month = other.year_start_month;
        }
    }
}

impl StorageConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled != StorageConfig::default().enabled {
            self.enabled = other.enabled;
        }
        if other.state_dir.is_some() {
            self.state_dir = other.state_dir;
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = LoggingConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.level != default.level {
            self.level = other.level;
        }
        if other.file.is_some() {
            self.file = other.file;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.color_mode != default.color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parser with fixed capabilities, independent of the terminal running the tests.
    pub fn with_capabilities(true_color: bool, indexed: bool) -> Self {
        Self {
            supports_true_color: true_color,
            supports_256: indexed,
            no_color: false,
        }
    }

    /// Parses `#rrggbb`, `indexed(N)` or a color name.
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();

        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.convert_rgb_to_terminal_color(r, g, b));
        }

        if let Some(inner) = lower
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let num = inner.trim().parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        let name = lower.replace(' ', "_").replace("grey", "gray");
        match name.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),

            "bright_black" => Ok(Color::Indexed(8)),
            "bright_red" => Ok(Color::Indexed(9)),
            "bright_green" => Ok(Color::Indexed(10)),
            "bright_yellow" => Ok(Color::Indexed(11)),
            "bright_blue" => Ok(Color::Indexed(12)),
            "bright_magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" => Ok(Color::Indexed(14)),
            "bright_white" => Ok(Color::Indexed(15)),

            "gray" | "dark_gray" => Ok(Color::Indexed(8)),
            "light_gray" => Ok(Color::Indexed(7)),

            // Rendered as a modifier or the terminal default, not a color
            "reset" | "default" | "reversed" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), indexed(N), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    let component = |range: std::ops::Range<usize>, name: &str| {
        s.get(range)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .ok_or_else(|| eyre!("Invalid {} component in hex color: {}", name, s))
    };
    Ok((
        component(1..3, "red")?,
        component(3..5, "green")?,
        component(5..7, "blue")?,
    ))
}

/// Nearest xterm 256-color palette index
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        // grayscale ramp 232-255
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        return match gray {
            0..=7 => 16,
            248.. => 231,
            _ => 232 + ((gray - 8) * 24 / 240) as u8,
        };
    }

    // 6x6x6 cube 16-231
    let scale = |c: u8| (c as u16 * 5 / 255) as u8;
    16 + 36 * scale(r) + 6 * scale(g) + scale(b)
}

/// Nearest of the 8 basic ANSI colors
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone, Default)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        Self::from_config_with(config, &ColorParser::new())
    }

    pub fn from_config_with(config: &ThemeConfig, parser: &ColorParser) -> Result<Self> {
        let colors = config
            .colors
            .entries()
            .into_iter()
            .map(|(name, value)| Ok((name.to_string(), parser.parse(value)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { colors })
    }

    /// Color by name, Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let parsed: AppConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.version, "0.1");
        assert_eq!(parsed.display.scroll_placeholder_ms, 80);
        assert_eq!(parsed.fiscal.year_start_month, 1);
        assert!(parsed.storage.enabled);
    }

    #[test]
    fn test_parse_colors() {
        let parser = ColorParser::with_capabilities(true, true);
        assert_eq!(parser.parse("Red").unwrap(), Color::Red);
        assert_eq!(parser.parse("dark grey").unwrap(), Color::Indexed(8));
        assert_eq!(parser.parse("indexed(236)").unwrap(), Color::Indexed(236));
        assert_eq!(parser.parse("#ff8000").unwrap(), Color::Rgb(255, 128, 0));
        assert!(parser.parse("indexed(300)").is_err());
        assert!(parser.parse("#zz0000").is_err());
        assert!(parser.parse("chartreuse").is_err());
    }

    #[test]
    fn test_hex_downgrades_without_true_color() {
        let indexed = ColorParser::with_capabilities(false, true);
        assert_eq!(indexed.parse("#000000").unwrap(), Color::Indexed(16));
        let basic = ColorParser::with_capabilities(false, false);
        assert_eq!(basic.parse("#ff0000").unwrap(), Color::Red);
    }

    #[test]
    fn test_theme_has_every_color() {
        let theme = Theme::from_config_with(
            &ThemeConfig::default(),
            &ColorParser::with_capabilities(true, true),
        )
        .unwrap();
        assert_eq!(theme.colors.len(), ColorConfig::default().entries().len());
        assert_eq!(theme.get("sort_indicator"), Color::Yellow);
        assert_eq!(theme.get("no_such_color"), Color::Reset);
    }
}
