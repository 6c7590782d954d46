use serde::{Deserialize, Serialize};

/// Tags picked by the user, in click order, duplicates included
///
/// Clicking a tag twice records two occurrences. The grouped view used for
/// chips is derived on every read and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    tags: Vec<String>,
}

/// One chip of the grouped view: a distinct tag and how often it was picked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagGroup {
    pub tag: String,
    pub count: usize,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one occurrence of `tag`
    pub fn add(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    /// Removes the most recently added occurrence of `tag`
    ///
    /// Returns `false` when the tag was not selected.
    pub fn remove_last_occurrence(&mut self, tag: &str) -> bool {
        match self.tags.iter().rposition(|t| t == tag) {
            Some(index) => {
                self.tags.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes the occurrence at `index` in click order
    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        if index < self.tags.len() {
            Some(self.tags.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Distinct tags with their occurrence counts, in first-seen order
    pub fn grouped_view(&self) -> Vec<TagGroup> {
        let mut groups: Vec<TagGroup> = Vec::new();
        for tag in &self.tags {
            match groups.iter_mut().find(|g| &g.tag == tag) {
                Some(group) => group.count += 1,
                None => groups.push(TagGroup {
                    tag: tag.clone(),
                    count: 1,
                }),
            }
        }
        groups
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn count(&self, tag: &str) -> usize {
        self.tags.iter().filter(|t| *t == tag).count()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(tag: &str, count: usize) -> TagGroup {
        TagGroup {
            tag: tag.to_string(),
            count,
        }
    }

    #[test]
    fn test_remove_last_occurrence_keeps_order() {
        let mut selection = SelectionSet::new();
        selection.add("floral");
        selection.add("fresh");
        selection.add("floral");

        assert!(selection.remove_last_occurrence("floral"));
        assert_eq!(selection.tags(), ["floral", "fresh"]);
        assert_eq!(
            selection.grouped_view(),
            vec![group("floral", 1), group("fresh", 1)]
        );
    }

    #[test]
    fn test_remove_last_occurrence_targets_latest_click() {
        let mut selection: SelectionSet = ["woody", "sweet", "woody", "citrus"].into_iter().collect();
        selection.remove_last_occurrence("woody");
        assert_eq!(selection.tags(), ["woody", "sweet", "citrus"]);
    }

    #[test]
    fn test_remove_missing_tag_is_noop() {
        let mut selection: SelectionSet = ["fresh"].into_iter().collect();
        assert!(!selection.remove_last_occurrence("smoky"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_grouped_view_counts_in_first_seen_order() {
        let selection: SelectionSet = ["sweet", "fresh", "sweet", "warm", "sweet"]
            .into_iter()
            .collect();
        assert_eq!(
            selection.grouped_view(),
            vec![group("sweet", 3), group("fresh", 1), group("warm", 1)]
        );
        assert_eq!(selection.count("sweet"), 3);
        assert!(selection.contains("warm"));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut selection: SelectionSet = ["a", "b", "a"].into_iter().collect();
        selection.clear();
        assert!(selection.is_empty());
        assert!(selection.grouped_view().is_empty());
    }

    #[test]
    fn test_remove_at() {
        let mut selection: SelectionSet = ["a", "b", "c"].into_iter().collect();
        assert_eq!(selection.remove_at(1), Some("b".to_string()));
        assert_eq!(selection.remove_at(5), None);
        assert_eq!(selection.tags(), ["a", "c"]);
    }

    #[test]
    fn test_grouped_view_is_recomputed_after_changes() {
        let mut selection = SelectionSet::new();
        selection.add("fresh");
        assert_eq!(selection.grouped_view(), vec![group("fresh", 1)]);
        selection.add("fresh");
        assert_eq!(selection.grouped_view(), vec![group("fresh", 2)]);
        selection.remove_last_occurrence("fresh");
        assert_eq!(selection.grouped_view(), vec![group("fresh", 1)]);
    }
}
