//! Path-query helpers shared by the expression interpreter and native rules.
//!
//! Every helper receives a *lineage*: the nodes from the walk root down to the
//! subject, subject last. A sub-predicate is always called with the lineage of
//! the node it is asked about (a prefix of the outer lineage), so nested
//! queries see that node as their subject and nothing has to be rebound.

use crate::model::Node;

/// True iff `pred` holds for any node of the lineage (root through subject)
///
/// # Errors
///
/// Propagates the first error returned by `pred`.
pub fn has_past<'a, E>(
    lineage: &[&'a Node],
    mut pred: impl FnMut(&[&'a Node]) -> Result<bool, E>,
) -> Result<bool, E> {
    for end in 1..=lineage.len() {
        if pred(&lineage[..end])? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Number of lineage nodes for which `pred` holds
///
/// # Errors
///
/// Propagates the first error returned by `pred`.
pub fn count_past<'a, E>(
    lineage: &[&'a Node],
    mut pred: impl FnMut(&[&'a Node]) -> Result<bool, E>,
) -> Result<usize, E> {
    let mut count = 0;
    for end in 1..=lineage.len() {
        if pred(&lineage[..end])? {
            count += 1;
        }
    }
    Ok(count)
}

/// Scan from the subject back toward the root for the nearest boundary
///
/// At each node `end` is tested first: a match stops the scan with `false`.
/// Otherwise a `start` match stops it with `true`. Reaching past the root
/// without either match yields `false`.
///
/// # Errors
///
/// Propagates the first error returned by either predicate.
pub fn is_between<'a, E>(
    lineage: &[&'a Node],
    mut start: impl FnMut(&[&'a Node]) -> Result<bool, E>,
    mut end: impl FnMut(&[&'a Node]) -> Result<bool, E>,
) -> Result<bool, E> {
    for len in (1..=lineage.len()).rev() {
        let scope = &lineage[..len];
        if end(scope)? {
            return Ok(false);
        }
        if start(scope)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeAttributes;
    use std::convert::Infallible;

    fn chain(ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| Node::capture(*id, NodeAttributes::default(), i as u32 + 1, i + 1))
            .collect()
    }

    fn subject_is(id: &'static str) -> impl FnMut(&[&Node]) -> Result<bool, Infallible> {
        move |scope| Ok(scope.last().is_some_and(|n| n.id == id))
    }

    #[test]
    fn test_has_past_includes_subject() {
        let nodes = chain(&["root", "a", "b"]);
        let lineage: Vec<&Node> = nodes.iter().collect();

        assert!(has_past(&lineage, subject_is("b")).unwrap());
        assert!(has_past(&lineage, subject_is("root")).unwrap());
        assert!(!has_past(&lineage, subject_is("c")).unwrap());
    }

    #[test]
    fn test_nearest_end_wins() {
        // root -> A -> B -> C, start matches A, end matches B
        let nodes = chain(&["root", "A", "B", "C"]);
        let lineage: Vec<&Node> = nodes.iter().collect();

        let result = is_between(&lineage, subject_is("A"), subject_is("B")).unwrap();
        assert!(!result);
    }

    #[test]
    fn test_nearest_start_wins() {
        let nodes = chain(&["root", "A", "B", "C"]);
        let lineage: Vec<&Node> = nodes.iter().collect();

        let result = is_between(&lineage, subject_is("B"), subject_is("A")).unwrap();
        assert!(result);
    }

    #[test]
    fn test_is_between_exhaustion_is_false() {
        let nodes = chain(&["root", "A"]);
        let lineage: Vec<&Node> = nodes.iter().collect();

        assert!(!is_between(&lineage, subject_is("x"), subject_is("y")).unwrap());
    }

    #[test]
    fn test_sub_predicate_sees_prefix_lineage() {
        let nodes = chain(&["root", "A", "B"]);
        let lineage: Vec<&Node> = nodes.iter().collect();
        let mut seen = Vec::new();

        has_past(&lineage, |scope| -> Result<bool, Infallible> {
            seen.push(scope.len());
            Ok(false)
        })
        .unwrap();

        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_count_past() {
        let nodes = chain(&["l_arm", "l_elbow", "l_hand"]);
        let lineage: Vec<&Node> = nodes.iter().collect();
        let count = count_past(&lineage, |scope| -> Result<bool, Infallible> {
            Ok(scope.last().is_some_and(|n| n.id.starts_with("l_")))
        })
        .unwrap();
        assert_eq!(count, 3);
    }
}
