//! Per-session agent selection.
//!
//! A two-state machine: [`Selection::Empty`] or [`Selection::Active`] with
//! one category and a non-empty, ordered set of agent ids from it. While a
//! selection is active, toggles from any other category are rejected.
//!
//! A selector is owned by exactly one session and is consumed by
//! [`AgentSelector::into_task`] when the user submits.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::AgentCatalog;
use crate::domain::{BenchError, ClassificationResult, GenerationTask, Result};

/// Current selection state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    /// `agent_ids` is never empty and keeps selection order.
    Active {
        category: String,
        agent_ids: Vec<String>,
    },
}

impl Selection {
    pub fn active_category(&self) -> Option<&str> {
        match self {
            Selection::Empty => None,
            Selection::Active { category, .. } => Some(category),
        }
    }

    pub fn selected_agent_ids(&self) -> &[String] {
        match self {
            Selection::Empty => &[],
            Selection::Active { agent_ids, .. } => agent_ids,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// Another category is active; state unchanged.
    Rejected,
}

pub struct AgentSelector {
    catalog: Arc<AgentCatalog>,
    selection: Selection,
    suggested_category: Option<String>,
}

impl AgentSelector {
    pub fn new(catalog: Arc<AgentCatalog>) -> Self {
        Self {
            catalog,
            selection: Selection::Empty,
            suggested_category: None,
        }
    }

    /// Start a session with the category the classifier pointed at, if it
    /// maps onto the catalog. The suggestion is advisory; it does not
    /// activate anything.
    pub fn with_classification(catalog: Arc<AgentCatalog>, classification: &ClassificationResult) -> Self {
        let suggested_category = if classification.is_relevant {
            catalog
                .category_for_tag(&classification.content_type)
                .or_else(|| catalog.category_for_tag(&classification.recommended_agent))
                .map(str::to_string)
        } else {
            None
        };
        Self {
            catalog,
            selection: Selection::Empty,
            suggested_category,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn suggested_category(&self) -> Option<&str> {
        self.suggested_category.as_deref()
    }

    pub fn is_selected(&self, agent_id: &str) -> bool {
        self.selection.selected_agent_ids().iter().any(|id| id == agent_id)
    }

    /// Whether toggles in `category` are currently blocked.
    pub fn is_locked_out(&self, category: &str) -> bool {
        matches!(self.selection.active_category(), Some(active) if active != category)
    }

    /// Toggle `agent_id` within `category`.
    ///
    /// Unknown categories or agents are errors. A toggle from a different
    /// category while a selection is active is a normal outcome
    /// ([`ToggleOutcome::Rejected`]), not an error.
    pub fn toggle(&mut self, agent_id: &str, category: &str) -> Result<ToggleOutcome> {
        self.catalog.agent(category, agent_id)?;

        let outcome = match &mut self.selection {
            Selection::Empty => {
                self.selection = Selection::Active {
                    category: category.to_string(),
                    agent_ids: vec![agent_id.to_string()],
                };
                ToggleOutcome::Selected
            }
            Selection::Active { category: active, .. } if active.as_str() != category => {
                ToggleOutcome::Rejected
            }
            Selection::Active { agent_ids, .. } => {
                if let Some(pos) = agent_ids.iter().position(|id| id == agent_id) {
                    agent_ids.remove(pos);
                    if agent_ids.is_empty() {
                        self.selection = Selection::Empty;
                    }
                    ToggleOutcome::Deselected
                } else {
                    agent_ids.push(agent_id.to_string());
                    ToggleOutcome::Selected
                }
            }
        };
        debug!(agent_id, category, ?outcome, "selection toggled");
        Ok(outcome)
    }

    pub fn clear(&mut self) {
        self.selection = Selection::Empty;
    }

    /// Turn the selection into a generation task, consuming the selector.
    pub fn into_task(self, prompt_text: &str) -> Result<GenerationTask> {
        match self.selection {
            Selection::Empty => Err(BenchError::invalid("select at least one agent first")),
            Selection::Active { category, agent_ids } => {
                GenerationTask::new(&category, agent_ids, prompt_text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> AgentSelector {
        AgentSelector::new(Arc::new(AgentCatalog::builtin()))
    }

    #[test]
    fn test_exclusivity_walkthrough() {
        let mut s = selector();

        assert_eq!(s.toggle("1", "blog").unwrap(), ToggleOutcome::Selected);
        assert_eq!(
            s.selection(),
            &Selection::Active {
                category: "blog".to_string(),
                agent_ids: vec!["1".to_string()]
            }
        );

        assert_eq!(s.toggle("1", "linkedin").unwrap(), ToggleOutcome::Rejected);
        assert_eq!(s.selection().active_category(), Some("blog"));
        assert_eq!(s.selection().selected_agent_ids(), &["1".to_string()]);

        assert_eq!(s.toggle("1", "blog").unwrap(), ToggleOutcome::Deselected);
        assert_eq!(s.selection(), &Selection::Empty);
    }

    #[test]
    fn test_category_unlocks_after_clearing() {
        let mut s = selector();
        s.toggle("2", "blog").unwrap();
        assert!(s.is_locked_out("travel"));
        s.toggle("2", "blog").unwrap();
        assert!(!s.is_locked_out("travel"));
        assert_eq!(s.toggle("3", "travel").unwrap(), ToggleOutcome::Selected);
        assert_eq!(s.selection().active_category(), Some("travel"));
    }

    #[test]
    fn test_selection_keeps_toggle_order() {
        let mut s = selector();
        s.toggle("3", "youtube").unwrap();
        s.toggle("1", "youtube").unwrap();
        s.toggle("4", "youtube").unwrap();
        s.toggle("1", "youtube").unwrap();
        assert_eq!(s.selection().selected_agent_ids(), &["3".to_string(), "4".to_string()]);
        assert!(s.is_selected("4"));
        assert!(!s.is_selected("1"));
    }

    #[test]
    fn test_unknown_category_and_agent_are_errors() {
        let mut s = selector();
        assert!(matches!(
            s.toggle("1", "poetry"),
            Err(BenchError::UnknownCategory(_))
        ));
        assert!(matches!(
            s.toggle("42", "blog"),
            Err(BenchError::UnknownAgent { .. })
        ));
        assert!(s.selection().is_empty());
    }

    #[test]
    fn test_into_task_requires_selection() {
        assert!(selector().into_task("topic").is_err());

        let mut s = selector();
        s.toggle("2", "linkedin").unwrap();
        s.toggle("4", "linkedin").unwrap();
        let task = s.into_task("Announce our launch").unwrap();
        assert_eq!(task.category(), "linkedin");
        assert_eq!(task.agent_ids(), &["2", "4"]);
    }

    #[test]
    fn test_suggestion_from_classification() {
        let catalog = Arc::new(AgentCatalog::builtin());
        let classification = ClassificationResult {
            content_type: "travel_itinerary".to_string(),
            recommended_agent: "travel_itinerary".to_string(),
            available_agents: vec!["travel_itinerary".to_string()],
            confidence_score: 0.8,
            is_relevant: true,
        };
        let s = AgentSelector::with_classification(Arc::clone(&catalog), &classification);
        assert_eq!(s.suggested_category(), Some("travel"));
        assert!(s.selection().is_empty());

        let s = AgentSelector::with_classification(catalog, &ClassificationResult::unrelated());
        assert_eq!(s.suggested_category(), None);
    }
}
