use larder_types::{contains_ignore_case, Category, Ingredient, Recipe};
use serde::{Deserialize, Serialize};

/// A search string applied to names (and recipe summaries).
///
/// Matching is case-insensitive substring containment. An empty or
/// whitespace-only filter matches every record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter(String);

impl SearchFilter {
    pub fn new(needle: impl Into<String>) -> Self {
        Self(needle.into())
    }

    /// The filter that matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns `true` if this filter lets every record through.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches_text(&self, text: &str) -> bool {
        contains_ignore_case(text, &self.0)
    }

    pub fn matches_category(&self, category: &Category) -> bool {
        self.matches_text(&category.name)
    }

    pub fn matches_ingredient(&self, ingredient: &Ingredient) -> bool {
        self.matches_text(&ingredient.name)
    }

    /// A recipe matches on its name or its summary.
    pub fn matches_recipe(&self, recipe: &Recipe) -> bool {
        self.matches_text(&recipe.name) || self.matches_text(&recipe.summary)
    }
}

impl From<&str> for SearchFilter {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Option<&str>> for SearchFilter {
    fn from(s: Option<&str>) -> Self {
        s.map(Self::new).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_types::{CategoryId, RecipeId};

    fn recipe(name: &str, summary: &str) -> Recipe {
        Recipe {
            id: RecipeId::new(),
            name: name.into(),
            summary: summary.into(),
            serving: 1,
            time: 5,
            instructions: String::new(),
            image_data: None,
            category: None,
            ingredients: vec![],
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = SearchFilter::all();
        assert!(f.is_empty());
        assert!(f.matches_recipe(&recipe("Anything", "")));
        assert!(SearchFilter::new("  ").is_empty());
    }

    #[test]
    fn recipe_matches_summary() {
        let f = SearchFilter::new("CRUST");
        assert!(f.matches_recipe(&recipe("Pizza", "Thin crust, wood fired")));
        assert!(!f.matches_recipe(&recipe("Soup", "Warm")));
    }

    #[test]
    fn category_matches_name_only() {
        let c = Category {
            id: CategoryId::new(),
            name: "Italian".into(),
        };
        assert!(SearchFilter::new("tal").matches_category(&c));
        assert!(!SearchFilter::new("french").matches_category(&c));
    }

    #[test]
    fn from_option() {
        assert!(SearchFilter::from(None).is_empty());
        assert_eq!(SearchFilter::from(Some("x")).as_str(), "x");
    }
}
