use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use crate::{
    converge::model::{ConvergeConfig, SectionContent},
    foundation::{
        core::Rgba8,
        error::{ConvergeError, ConvergeResult},
    },
};

/// JSON-facing description of the whole page.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub title: String,
    /// Font file used for all text, relative to the asset root. Text is skipped without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Tunables shared by every converge section.
    #[serde(default)]
    pub converge: ConvergeConfig,
    pub sections: Vec<SectionSpec>,
}

/// One full-viewport slide, in scroll order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionSpec {
    Static(StaticSection),
    Hero(HeroSection),
    Converge(ConvergeSection),
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StaticSection {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `#rrggbb` or `#rrggbbaa`.
    #[serde(default = "default_static_background")]
    pub background: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HeroSection {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Full-bleed background image.
    pub image: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConvergeSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub content: SectionContent,
}

fn default_static_background() -> String {
    "#e2e8f0".to_string()
}

impl SectionSpec {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Static(s) => Some(&s.id),
            Self::Hero(h) => Some(&h.id),
            Self::Converge(c) => c.id.as_deref(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Static(_) => "static",
            Self::Hero(_) => "hero",
            Self::Converge(_) => "converge",
        }
    }

    /// Whether the section pins during scroll.
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Converge(_))
    }
}

impl StaticSection {
    /// Parsed background color; invalid strings fall back to slate.
    pub fn background_color(&self) -> Rgba8 {
        Rgba8::from_hex(&self.background).unwrap_or(Rgba8::rgb(0xe2, 0xe8, 0xf0))
    }
}

impl PageSpec {
    pub fn from_reader<R: std::io::Read>(r: R) -> ConvergeResult<Self> {
        let spec: PageSpec = serde_json::from_reader(r)
            .map_err(|e| ConvergeError::serde(format!("parse page JSON: {e}")))?;
        Ok(spec)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConvergeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ConvergeError::validation(format!("open page JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn from_json_str(s: &str) -> ConvergeResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    pub fn validate(&self) -> ConvergeResult<()> {
        self.converge.validate()?;
        if self.sections.is_empty() {
            return Err(ConvergeError::validation(
                "page must contain at least one section",
            ));
        }

        let mut seen = HashSet::new();
        for (i, section) in self.sections.iter().enumerate() {
            if let Some(id) = section.id() {
                if id.trim().is_empty() {
                    return Err(ConvergeError::validation(format!(
                        "section {i} has an empty id"
                    )));
                }
                if !seen.insert(id) {
                    return Err(ConvergeError::validation(format!(
                        "duplicate section id '{id}'"
                    )));
                }
            }
            match section {
                SectionSpec::Static(s) => {
                    if Rgba8::from_hex(&s.background).is_none() {
                        return Err(ConvergeError::validation(format!(
                            "section '{}' background '{}' is not #rrggbb or #rrggbbaa",
                            s.id, s.background
                        )));
                    }
                }
                SectionSpec::Hero(h) => {
                    if h.image.trim().is_empty() {
                        return Err(ConvergeError::validation(format!(
                            "hero section '{}' has no image",
                            h.id
                        )));
                    }
                }
                SectionSpec::Converge(c) => {
                    if let Some(j) = c.content.images.iter().position(|d| d.source.trim().is_empty())
                    {
                        return Err(ConvergeError::validation(format!(
                            "converge section {i} image {j} has an empty source"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Every image source referenced by the page, in section order.
    pub fn image_sources(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.iter().flat_map(|s| {
            let sources: Vec<&str> = match s {
                SectionSpec::Static(_) => Vec::new(),
                SectionSpec::Hero(h) => vec![h.image.as_str()],
                SectionSpec::Converge(c) => {
                    c.content.images.iter().map(|d| d.source.as_str()).collect()
                }
            };
            sources
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/model.rs"]
mod tests;
