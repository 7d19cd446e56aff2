//! Template catalog filtering and sorting.
//!
//! The backend accepts `search`, `category`, `complexity` and `sort` query
//! parameters, but its filtering is not trusted: the same predicates are
//! applied again to whatever list comes back.

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;
use tracing::warn;

use crate::domain::WorkflowTemplate;

/// Category value that means "no category filter".
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateSort {
    #[default]
    Name,
    Category,
    Complexity,
    Newest,
}

impl TemplateSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateSort::Name => "name",
            TemplateSort::Category => "category",
            TemplateSort::Complexity => "complexity",
            TemplateSort::Newest => "newest",
        }
    }

    pub fn all() -> [TemplateSort; 4] {
        [
            TemplateSort::Name,
            TemplateSort::Category,
            TemplateSort::Complexity,
            TemplateSort::Newest,
        ]
    }
}

impl FromStr for TemplateSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(TemplateSort::Name),
            "category" => Ok(TemplateSort::Category),
            "complexity" | "difficulty" => Ok(TemplateSort::Complexity),
            "newest" | "recent" => Ok(TemplateSort::Newest),
            other => Err(format!("unknown sort '{}'", other)),
        }
    }
}

/// Client-side template predicates. Every `None` / `false` predicate matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub complexity: Option<String>,
    pub favorites_only: bool,
}

impl TemplateFilter {
    pub fn matches(&self, template: &WorkflowTemplate, favorites: &BTreeSet<i64>) -> bool {
        self.matches_search(template)
            && self.matches_category(template)
            && self.matches_complexity(template)
            && (!self.favorites_only || favorites.contains(&template.id))
    }

    fn matches_search(&self, template: &WorkflowTemplate) -> bool {
        let Some(query) = non_empty(&self.search) else {
            return true;
        };
        let haystack = format!(
            "{} {} {}",
            template.name,
            template.description,
            template.tags.join(" ")
        )
        .to_lowercase();
        query
            .to_lowercase()
            .split_whitespace()
            .all(|term| haystack.contains(term))
    }

    fn matches_category(&self, template: &WorkflowTemplate) -> bool {
        match non_empty(&self.category) {
            None => true,
            Some(c) if c.eq_ignore_ascii_case(ALL_CATEGORIES) => true,
            Some(c) => template.category.eq_ignore_ascii_case(c),
        }
    }

    fn matches_complexity(&self, template: &WorkflowTemplate) -> bool {
        let Some(wanted) = non_empty(&self.complexity) else {
            return true;
        };
        [&template.difficulty, &template.complexity]
            .into_iter()
            .flatten()
            .any(|level| level.eq_ignore_ascii_case(wanted))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Query parameters forwarded to `GET /api/workflow/templates`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub complexity: Option<String>,
    pub sort: Option<TemplateSort>,
}

impl TemplateQuery {
    pub fn from_filter(filter: &TemplateFilter, sort: TemplateSort) -> Self {
        Self {
            search: filter.search.clone(),
            category: filter
                .category
                .clone()
                .filter(|c| !c.eq_ignore_ascii_case(ALL_CATEGORIES)),
            complexity: filter.complexity.clone(),
            sort: Some(sort),
        }
    }

    /// `?search=..&category=..` with empty parameters dropped; `""` when nothing is set.
    pub fn to_query_string(&self) -> String {
        let params: Vec<String> = [
            ("search", non_empty(&self.search)),
            ("category", non_empty(&self.category)),
            ("complexity", non_empty(&self.complexity)),
            ("sort", self.sort.map(|s| s.as_str())),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, urlencoding::encode(v))))
        .collect();

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

/// Parse a template list payload. Anything but an array yields no templates;
/// entries that do not parse are skipped.
pub fn parse_template_list(payload: Value) -> Vec<WorkflowTemplate> {
    let Value::Array(items) = payload else {
        warn!("Template list payload is not an array, showing empty catalog");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<WorkflowTemplate>(item) {
            Ok(template) => Some(template),
            Err(e) => {
                warn!("Skipping malformed template: {}", e);
                None
            }
        })
        .collect()
}

pub fn filter_templates<'a>(
    templates: &'a [WorkflowTemplate],
    filter: &TemplateFilter,
    favorites: &BTreeSet<i64>,
) -> Vec<&'a WorkflowTemplate> {
    templates
        .iter()
        .filter(|t| filter.matches(t, favorites))
        .collect()
}

pub fn sort_templates(templates: &mut [&WorkflowTemplate], sort: TemplateSort) {
    templates.sort_by(|a, b| match sort {
        TemplateSort::Name => by_name(a, b),
        TemplateSort::Category => a
            .category
            .to_lowercase()
            .cmp(&b.category.to_lowercase())
            .then_with(|| by_name(a, b)),
        TemplateSort::Complexity => level_rank(a.level())
            .cmp(&level_rank(b.level()))
            .then_with(|| by_name(a, b)),
        TemplateSort::Newest => b
            .created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id)),
    });
}

/// Filter then sort, the way the catalog renders.
pub fn visible_templates<'a>(
    templates: &'a [WorkflowTemplate],
    filter: &TemplateFilter,
    sort: TemplateSort,
    favorites: &BTreeSet<i64>,
) -> Vec<&'a WorkflowTemplate> {
    let mut visible = filter_templates(templates, filter, favorites);
    sort_templates(&mut visible, sort);
    visible
}

fn by_name(a: &WorkflowTemplate, b: &WorkflowTemplate) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

fn level_rank(level: Option<&str>) -> u8 {
    match level.map(str::to_ascii_lowercase).as_deref() {
        Some("beginner" | "easy" | "simple") => 0,
        Some("intermediate" | "medium" | "moderate") => 1,
        Some("advanced" | "hard" | "complex" | "expert") => 2,
        _ => 3,
    }
}

/// Distinct categories, sorted, for the category filter.
pub fn categories(templates: &[WorkflowTemplate]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out: Vec<String> = templates
        .iter()
        .map(|t| t.category.trim())
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.to_lowercase()))
        .map(str::to_string)
        .collect();
    out.sort_by_key(|c| c.to_lowercase());
    out
}

/// Distinct difficulty/complexity levels, easiest first.
pub fn levels(templates: &[WorkflowTemplate]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out: Vec<String> = templates
        .iter()
        .filter_map(|t| t.level())
        .filter(|l| seen.insert(l.to_lowercase()))
        .map(str::to_string)
        .collect();
    out.sort_by(|a, b| level_rank(Some(a)).cmp(&level_rank(Some(b))).then_with(|| a.cmp(b)));
    out
}
