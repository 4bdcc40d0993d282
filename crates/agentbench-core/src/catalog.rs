//! Agent catalog: which generation agents exist in which category.
//!
//! The catalog is process-wide static configuration. It is built once,
//! either from the built-in table or from a TOML file, installed with
//! [`AgentCatalog::install_global`] before first use, and lives until the
//! process exits. Nothing mutates it afterwards.
//!
//! Agent ids are only unique within a category, so per-agent lookups go
//! through a flat index keyed by `(category, agent id)`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::error::{BenchError, Result};

static CATALOG: OnceLock<Arc<AgentCatalog>> = OnceLock::new();

/// One generation agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Unique within its category.
    pub id: String,
    pub name: String,
    /// Logo or other display asset.
    #[serde(default)]
    pub asset_ref: Option<String>,
}

/// A category and its ordered agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    /// Classifier tags that map onto this category (e.g. `blog_writing`).
    #[serde(default)]
    pub aliases: Vec<String>,
    pub agents: Vec<AgentDescriptor>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "category", default)]
    categories: Vec<CategoryEntry>,
}

/// Key of the flat agent index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentKey {
    pub category: String,
    pub agent_id: String,
}

impl AgentKey {
    pub fn new(category: &str, agent_id: &str) -> Self {
        Self {
            category: category.to_string(),
            agent_id: agent_id.to_string(),
        }
    }
}

/// Read-only registry mapping category → ordered agent list.
#[derive(Debug, Clone)]
pub struct AgentCatalog {
    categories: Vec<CategoryEntry>,
    by_category: HashMap<String, usize>,
    by_tag: HashMap<String, usize>,
    by_agent: HashMap<AgentKey, (usize, usize)>,
}

impl AgentCatalog {
    /// Build a catalog, validating names and ids.
    pub fn new(categories: Vec<CategoryEntry>) -> Result<Self> {
        if categories.is_empty() {
            return Err(BenchError::Config("catalog has no categories".to_string()));
        }
        let mut tags: HashMap<&str, &str> = HashMap::new();
        for entry in &categories {
            if entry.name.trim().is_empty() {
                return Err(BenchError::Config("category name must not be empty".to_string()));
            }
            for tag in std::iter::once(&entry.name).chain(entry.aliases.iter()) {
                if let Some(owner) = tags.insert(tag.as_str(), entry.name.as_str()) {
                    return Err(BenchError::Config(format!(
                        "tag {tag} is claimed by both {owner} and {}",
                        entry.name
                    )));
                }
            }
            let mut ids: Vec<&str> = Vec::with_capacity(entry.agents.len());
            for agent in &entry.agents {
                if agent.id.trim().is_empty() {
                    return Err(BenchError::Config(format!(
                        "agent {} in {} has no id",
                        agent.name, entry.name
                    )));
                }
                if ids.contains(&agent.id.as_str()) {
                    return Err(BenchError::Config(format!(
                        "duplicate agent id {} in {}",
                        agent.id, entry.name
                    )));
                }
                ids.push(&agent.id);
            }
        }
        Ok(Self::index(categories))
    }

    fn index(categories: Vec<CategoryEntry>) -> Self {
        let mut by_category = HashMap::new();
        let mut by_tag = HashMap::new();
        let mut by_agent = HashMap::new();
        for (ci, entry) in categories.iter().enumerate() {
            by_category.insert(entry.name.clone(), ci);
            by_tag.insert(entry.name.clone(), ci);
            for alias in &entry.aliases {
                by_tag.insert(alias.clone(), ci);
            }
            for (ai, agent) in entry.agents.iter().enumerate() {
                by_agent.insert(AgentKey::new(&entry.name, &agent.id), (ci, ai));
            }
        }
        Self {
            categories,
            by_category,
            by_tag,
            by_agent,
        }
    }

    /// The default catalog: four categories, four agents each.
    pub fn builtin() -> Self {
        fn category(name: &str, aliases: &[&str], asset: &str, names: [&str; 4]) -> CategoryEntry {
            CategoryEntry {
                name: name.to_string(),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
                agents: names
                    .iter()
                    .enumerate()
                    .map(|(i, n)| AgentDescriptor {
                        id: (i + 1).to_string(),
                        name: n.to_string(),
                        asset_ref: Some(asset.to_string()),
                    })
                    .collect(),
            }
        }

        Self::index(vec![
            category(
                "blog",
                &["blog_writing", "blogging"],
                "/logos/blog_generator.png",
                ["Blog Expert", "Content Pro", "Article Writer", "Storyteller AI"],
            ),
            category(
                "linkedin",
                &["linkedin_post"],
                "/logos/linkedIn.png",
                [
                    "LinkedIn Pro",
                    "Business Writer",
                    "Social Media Expert",
                    "Professional Networker",
                ],
            ),
            category(
                "youtube",
                &["youtube_video_summary"],
                "/logos/youtube.png",
                ["Video Analyzer", "Summary Expert", "Content Curator", "Video Insight AI"],
            ),
            category(
                "travel",
                &["travel_itinerary"],
                "/logos/travel_planner-removebg-preview.png",
                ["Journey Expert", "Travel Planner", "Route Optimizer", "Travel Assistant"],
            ),
        ])
    }

    /// Parse a catalog from TOML (`[[category]]` tables with `[[category.agents]]`).
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(raw)
            .map_err(|e| BenchError::Config(format!("invalid catalog: {e}")))?;
        Self::new(file.categories)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&raw)?;
        info!(path = %path.display(), categories = catalog.categories.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Install the process-wide catalog. Fails if one is already in place.
    pub fn install_global(catalog: AgentCatalog) -> Result<Arc<AgentCatalog>> {
        let catalog = Arc::new(catalog);
        CATALOG
            .set(Arc::clone(&catalog))
            .map_err(|_| BenchError::Config("global catalog already initialised".to_string()))?;
        debug!("global catalog installed");
        Ok(catalog)
    }

    /// The process-wide catalog; the built-in one unless another was installed first.
    pub fn global() -> Arc<AgentCatalog> {
        Arc::clone(CATALOG.get_or_init(|| Arc::new(AgentCatalog::builtin())))
    }

    /// Ordered agents registered under `category`.
    pub fn agents_for(&self, category: &str) -> Result<&[AgentDescriptor]> {
        self.by_category
            .get(category)
            .map(|&ci| self.categories[ci].agents.as_slice())
            .ok_or_else(|| BenchError::UnknownCategory(category.to_string()))
    }

    /// Category names in registration order.
    pub fn all_categories(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn categories(&self) -> &[CategoryEntry] {
        &self.categories
    }

    /// Resolve one agent; distinguishes an unknown category from an unknown id.
    pub fn agent(&self, category: &str, agent_id: &str) -> Result<&AgentDescriptor> {
        if !self.by_category.contains_key(category) {
            return Err(BenchError::UnknownCategory(category.to_string()));
        }
        self.by_agent
            .get(&AgentKey::new(category, agent_id))
            .map(|&(ci, ai)| &self.categories[ci].agents[ai])
            .ok_or_else(|| BenchError::UnknownAgent {
                category: category.to_string(),
                agent_id: agent_id.to_string(),
            })
    }

    pub fn contains(&self, category: &str, agent_id: &str) -> bool {
        self.by_agent.contains_key(&AgentKey::new(category, agent_id))
    }

    /// Map a classifier tag (category name or alias) to a category.
    pub fn category_for_tag(&self, tag: &str) -> Option<&str> {
        self.by_tag
            .get(tag.trim())
            .map(|&ci| self.categories[ci].name.as_str())
    }
}
