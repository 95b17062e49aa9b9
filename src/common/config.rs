use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::bail;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::SettingsProvider;

pub fn config_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("mosaic")
        .join("config.toml")
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Tile new windows automatically.
    #[serde(default = "yes")]
    pub auto_tile: bool,
    #[serde(default)]
    pub layout: LayoutSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            auto_tile: true,
            layout: LayoutSettings::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Gap configuration for window spacing
    #[serde(default)]
    pub gaps: GapSettings,
    /// Drop the outer gap when a workspace holds a single window.
    #[serde(default)]
    pub smart_gaps: bool,
    #[serde(default)]
    pub stack: StackSettings,
    /// Windows matching any of these rules float unless force-tiled.
    #[serde(default)]
    pub float_rules: Vec<FloatRule>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    /// Space between sibling windows, split evenly across the shared edge.
    #[serde(default)]
    pub inner: i32,
    /// Space between windows and the edges of the work area.
    #[serde(default)]
    pub outer: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum TabPlacement {
    #[default]
    Top,
    Bottom,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct StackSettings {
    /// Height of the tab strip reserved above or below stacked windows.
    #[serde(default = "default_tab_height")]
    pub tab_height: i32,
    #[serde(default)]
    pub tab_placement: TabPlacement,
}

impl Default for StackSettings {
    fn default() -> Self {
        StackSettings {
            tab_height: default_tab_height(),
            tab_placement: TabPlacement::default(),
        }
    }
}

/// A regular expression compiled once, when the configuration is parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(Regex);

impl Pattern {
    pub fn as_str(&self) -> &str { self.0.as_str() }

    pub fn is_match(&self, haystack: &str) -> bool { self.0.is_match(haystack) }
}

impl FromStr for Pattern {
    type Err = regex::Error;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> { Regex::new(pattern).map(Pattern) }
}

impl TryFrom<String> for Pattern {
    type Error = regex::Error;

    fn try_from(pattern: String) -> Result<Self, Self::Error> { pattern.parse() }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> String { pattern.as_str().to_owned() }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool { self.as_str() == other.as_str() }
}

/// Matches windows by class and title regular expressions.
///
/// Every pattern that is present must match.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct FloatRule {
    pub class: Option<Pattern>,
    pub title: Option<Pattern>,
}

impl FloatRule {
    pub fn matches(&self, class: &str, title: &str) -> bool {
        if self.class.is_none() && self.title.is_none() {
            return false;
        }
        let check = |pattern: &Option<Pattern>, value: &str| pattern.as_ref().is_none_or(|p| p.is_match(value));
        check(&self.class, class) && check(&self.title, title)
    }

    pub fn validate(&self) -> Vec<String> {
        if self.class.is_none() && self.title.is_none() {
            return vec!["float rule must specify a class or a title".to_string()];
        }
        Vec::new()
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> { self.layout.validate() }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.gaps.validate());

        issues.extend(self.stack.validate());

        for (idx, rule) in self.float_rules.iter().enumerate() {
            for issue in rule.validate() {
                issues.push(format!("float_rules[{idx}] {issue}"));
            }
        }

        issues
    }
}

impl GapSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.inner < 0 {
            issues.push(format!("gaps.inner must be non-negative, got {}", self.inner));
        }

        if self.outer < 0 {
            issues.push(format!("gaps.outer must be non-negative, got {}", self.outer));
        }

        issues
    }
}

impl StackSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.tab_height <= 0 {
            issues.push(format!("stack.tab_height must be positive, got {}", self.tab_height));
        }

        issues
    }
}

impl SettingsProvider for LayoutSettings {
    fn gap_inner(&self) -> i32 { self.gaps.inner }

    fn gap_outer(&self) -> i32 { self.gaps.outer }

    fn smart_gaps(&self) -> bool { self.smart_gaps }

    fn tab_height(&self) -> i32 { self.stack.tab_height }

    fn tab_placement(&self) -> TabPlacement { self.stack.tab_placement }

    fn window_shall_float(&self, class: &str, title: &str) -> bool {
        self.float_rules.iter().any(|rule| rule.matches(class, title))
    }
}

fn yes() -> bool { true }

fn default_tab_height() -> i32 { 24 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../mosaic.default.toml"))
            .unwrap_or_else(|_| Config { settings: Settings::default() })
    }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        match toml::from_str::<Config>(buf) {
            Ok(config) => Ok(config),
            Err(e) => bail!("{e}"),
        }
    }
}
