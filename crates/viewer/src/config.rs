//! Viewer settings, loadable from TOML.
use std::path::{Path, PathBuf};

use html::{Selector, SelectorError};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid base url `{url}`: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base url `{0}` must be http or https")]
    UnsupportedScheme(String),
    #[error("invalid markup name: {0}")]
    Markup(#[from] SelectorError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Server the report came from; fragment sources and the upload endpoint resolve against it.
    pub base_url: String,
    pub upload_path: String,
    /// Fragments that do not start with this are not deep links.
    pub deep_link_prefix: String,
    pub request_timeout_ms: u64,
    /// How long the shell waits for outstanding requests after each command.
    pub pump_wait_ms: u64,
    pub markup: MarkupConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            upload_path: "/upload".to_string(),
            deep_link_prefix: "segment-".to_string(),
            request_timeout_ms: 60_000,
            pump_wait_ms: 5_000,
            markup: MarkupConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        self.markup.compile()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ConfigError::UnsupportedScheme(self.base_url.clone())),
        }
    }
}

/// Class and attribute names the report markup uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupConfig {
    pub header_class: String,
    pub indicator_class: String,
    pub content_class: String,
    pub open_class: String,
    pub closed_glyph: String,
    pub open_glyph: String,
    pub group_class: String,
    pub expand_all_class: String,
    pub collapse_all_class: String,
    pub source_attribute: String,
    pub segment_link_class: String,
    pub segment_class: String,
    pub segment_list_class: String,
    pub offset_attribute: String,
    pub segments_section_id: String,
    pub drag_over_class: String,
    pub loading_class: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            header_class: "toggle-header".to_string(),
            indicator_class: "toggle-indicator".to_string(),
            content_class: "toggle-content".to_string(),
            open_class: "open".to_string(),
            closed_glyph: "+".to_string(),
            open_glyph: "\u{2212}".to_string(),
            group_class: "toggle-group".to_string(),
            expand_all_class: "expand-all".to_string(),
            collapse_all_class: "collapse-all".to_string(),
            source_attribute: "data-src".to_string(),
            segment_link_class: "segment-link".to_string(),
            segment_class: "segment".to_string(),
            segment_list_class: "segment-list".to_string(),
            offset_attribute: "data-offset".to_string(),
            segments_section_id: "segments".to_string(),
            drag_over_class: "drag-over".to_string(),
            loading_class: "loading".to_string(),
        }
    }
}

/// Selectors and names resolved from a [`MarkupConfig`].
#[derive(Debug, Clone)]
pub struct Markup {
    pub header: Selector,
    pub indicator: Selector,
    pub content: Selector,
    pub group: Selector,
    pub expand_all: Selector,
    pub collapse_all: Selector,
    pub segment_link: Selector,
    pub segment: Selector,
    pub segment_list: Selector,
    pub in_page_anchor: Selector,
    pub open_class: String,
    pub closed_glyph: String,
    pub open_glyph: String,
    pub source_attribute: String,
    pub offset_attribute: String,
    pub segments_section_id: String,
    pub drag_over_class: String,
    pub loading_class: String,
}

impl MarkupConfig {
    pub fn compile(&self) -> Result<Markup, SelectorError> {
        let class = |name: &str| Selector::parse(&format!(".{name}"));
        let id = |name: &str| Selector::parse(&format!("#{name}"));
        let attr = |name: &str| Selector::parse(&format!("[{name}]"));

        // Everything below is spliced into selectors, so each name must parse on its own.
        class(&self.open_class)?;
        class(&self.drag_over_class)?;
        class(&self.loading_class)?;
        attr(&self.source_attribute)?;
        attr(&self.offset_attribute)?;
        id(&self.segments_section_id)?;

        Ok(Markup {
            header: class(&self.header_class)?,
            indicator: class(&self.indicator_class)?,
            content: class(&self.content_class)?,
            group: class(&self.group_class)?,
            expand_all: class(&self.expand_all_class)?,
            collapse_all: class(&self.collapse_all_class)?,
            segment_link: class(&self.segment_link_class)?.with_attribute(&self.offset_attribute),
            segment: class(&self.segment_class)?
                .with_attribute(&self.offset_attribute)
                .with_attribute("id"),
            segment_list: class(&self.segment_list_class)?,
            in_page_anchor: Selector::parse(r##"a[href^="#"]"##)?,
            open_class: self.open_class.clone(),
            closed_glyph: self.closed_glyph.clone(),
            open_glyph: self.open_glyph.clone(),
            source_attribute: self.source_attribute.to_ascii_lowercase(),
            offset_attribute: self.offset_attribute.to_ascii_lowercase(),
            segments_section_id: self.segments_section_id.clone(),
            drag_over_class: self.drag_over_class.clone(),
            loading_class: self.loading_class.clone(),
        })
    }
}
