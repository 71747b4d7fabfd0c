use super::rule::Rule;

/// Ordered rules for the two passes of a walk
///
/// Forward rules run when a node is entered, before its children. Backward
/// rules run when it is left, after every descendant. Within a pass, rules
/// run in list order and every rule is evaluated; one firing does not stop
/// the next.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub forward: Vec<Rule>,
    pub backward: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_forward(mut self, rule: Rule) -> Self {
        self.forward.push(rule);
        self
    }

    pub fn with_backward(mut self, rule: Rule) -> Self {
        self.backward.push(rule);
        self
    }

    /// Whether neither pass has rules
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
    }

    pub fn len(&self) -> usize {
        self.forward.len() + self.backward.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SpawnMarker;

    #[test]
    fn test_builders_keep_order() {
        let set = RuleSet::new()
            .with_forward(Rule::when("is_root", SpawnMarker).unwrap())
            .with_forward(Rule::when("is_leaf", SpawnMarker).unwrap())
            .with_backward(Rule::when("depth > 1", SpawnMarker).unwrap());

        let labels: Vec<_> = set.forward.iter().filter_map(Rule::label).collect();
        assert_eq!(labels, vec!["is_root", "is_leaf"]);
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
        assert!(RuleSet::new().is_empty());
    }
}
