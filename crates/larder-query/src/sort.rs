use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use larder_types::Recipe;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Recipe orderings.
///
/// Every ordering is applied as a stable sort on top of a name-ascending
/// pass, so records that tie on the key stay in name order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSort {
    #[default]
    Name,
    ServingAsc,
    ServingDesc,
    TimeAsc,
    TimeDesc,
}

impl RecipeSort {
    pub const ALL: [RecipeSort; 5] = [
        Self::Name,
        Self::ServingAsc,
        Self::ServingDesc,
        Self::TimeAsc,
        Self::TimeDesc,
    ];

    /// Wire name of the ordering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::ServingAsc => "serving_asc",
            Self::ServingDesc => "serving_desc",
            Self::TimeAsc => "time_asc",
            Self::TimeDesc => "time_desc",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::ServingAsc => "Serving (low to high)",
            Self::ServingDesc => "Serving (high to low)",
            Self::TimeAsc => "Time (short to long)",
            Self::TimeDesc => "Time (long to short)",
        }
    }

    /// Compare two recipes on this ordering's key alone.
    pub fn compare(&self, a: &Recipe, b: &Recipe) -> Ordering {
        match self {
            Self::Name => by_name(a, b),
            Self::ServingAsc => a.serving.cmp(&b.serving),
            Self::ServingDesc => b.serving.cmp(&a.serving),
            Self::TimeAsc => a.time.cmp(&b.time),
            Self::TimeDesc => b.time.cmp(&a.time),
        }
    }

    /// Sort in place: name ascending first, then a stable pass on the key.
    pub fn apply(&self, recipes: &mut [Recipe]) {
        recipes.sort_by(by_name);
        if *self != Self::Name {
            recipes.sort_by(|a, b| self.compare(a, b));
        }
    }
}

/// Name ascending, with the id as a final tie-break so the order is total.
fn by_name(a: &Recipe, b: &Recipe) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

impl fmt::Display for RecipeSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeSort {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == key)
            .ok_or_else(|| QueryError::UnknownSort(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_types::RecipeId;
    use proptest::prelude::*;

    fn recipe(name: &str, serving: u32, time: u32) -> Recipe {
        Recipe {
            id: RecipeId::new(),
            name: name.into(),
            summary: String::new(),
            serving,
            time,
            instructions: String::new(),
            image_data: None,
            category: None,
            ingredients: vec![],
        }
    }

    fn names(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn serving_ties_keep_name_order() {
        let mut recipes = vec![
            recipe("Banana Bread", 4, 60),
            recipe("Carrot Soup", 2, 30),
            recipe("Apple Pie", 4, 45),
        ];
        RecipeSort::ServingAsc.apply(&mut recipes);
        assert_eq!(names(&recipes), ["Carrot Soup", "Apple Pie", "Banana Bread"]);

        RecipeSort::ServingDesc.apply(&mut recipes);
        assert_eq!(names(&recipes), ["Apple Pie", "Banana Bread", "Carrot Soup"]);
    }

    #[test]
    fn time_orderings() {
        let mut recipes = vec![
            recipe("Stew", 4, 120),
            recipe("Toast", 1, 3),
            recipe("Omelette", 1, 10),
        ];
        RecipeSort::TimeAsc.apply(&mut recipes);
        assert_eq!(names(&recipes), ["Toast", "Omelette", "Stew"]);
        RecipeSort::TimeDesc.apply(&mut recipes);
        assert_eq!(names(&recipes), ["Stew", "Omelette", "Toast"]);
    }

    #[test]
    fn name_is_the_default() {
        assert_eq!(RecipeSort::default(), RecipeSort::Name);
        let mut recipes = vec![recipe("b", 1, 1), recipe("a", 9, 9)];
        RecipeSort::default().apply(&mut recipes);
        assert_eq!(names(&recipes), ["a", "b"]);
    }

    #[test]
    fn parse_wire_names() {
        for sort in RecipeSort::ALL {
            assert_eq!(sort.as_str().parse::<RecipeSort>().unwrap(), sort);
        }
        assert_eq!("Serving-Desc".parse::<RecipeSort>().unwrap(), RecipeSort::ServingDesc);
        assert_eq!(
            "calories".parse::<RecipeSort>().unwrap_err(),
            QueryError::UnknownSort("calories".into())
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&RecipeSort::TimeAsc).unwrap();
        assert_eq!(json, "\"time_asc\"");
    }

    proptest! {
        #[test]
        fn sort_is_stable_over_name_order(
            entries in proptest::collection::vec((1u32..5, 1u32..5), 0..20),
            key in 0usize..5,
        ) {
            let mut recipes: Vec<Recipe> = entries
                .iter()
                .enumerate()
                .map(|(i, (s, t))| recipe(&format!("r{i:02}"), *s, *t))
                .collect();
            let sort = RecipeSort::ALL[key];
            sort.apply(&mut recipes);

            for pair in recipes.windows(2) {
                let ord = sort.compare(&pair[0], &pair[1]);
                prop_assert_ne!(ord, Ordering::Greater);
                if ord == Ordering::Equal {
                    prop_assert!(pair[0].name < pair[1].name);
                }
            }
        }
    }
}
