use std::collections::HashMap;

use crate::types::LicenseExpression;

/// Maps custom license identifiers on the left-hand side of a comparison to
/// the identifiers used for the same licenses on the right-hand side.
pub type TranslationMap = HashMap<String, String>;

/// True if `a` and `b` denote the same license expression.
///
/// `AND` and `OR` sets compare as unordered collections: every member of `a`
/// must pair with a distinct equal member of `b`. Custom licenses are equal
/// when `translation` maps the identifier of `a` to the identifier of `b`;
/// an identifier missing from the map is never equal to anything.
pub fn is_equal(a: &LicenseExpression, b: &LicenseExpression, translation: &TranslationMap) -> bool {
    use LicenseExpression as E;
    match (a, b) {
        (E::Conjunctive(left), E::Conjunctive(right))
        | (E::Disjunctive(left), E::Disjunctive(right)) => members_match(left, right, translation),
        (E::Custom(left), E::Custom(right)) => translation.get(left) == Some(right),
        (
            E::WithException {
                license: left,
                exception: left_exception,
            },
            E::WithException {
                license: right,
                exception: right_exception,
            },
        ) => left_exception == right_exception && is_equal(left, right, translation),
        (E::OrLater(left), E::OrLater(right)) => is_equal(left, right, translation),
        _ => a == b,
    }
}

/// Perfect matching between two member lists, found with augmenting paths.
fn members_match(
    left: &[LicenseExpression],
    right: &[LicenseExpression],
    translation: &TranslationMap,
) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let candidates: Vec<Vec<usize>> = left
        .iter()
        .map(|member| {
            right
                .iter()
                .enumerate()
                .filter(|(_, other)| is_equal(member, other, translation))
                .map(|(idx, _)| idx)
                .collect()
        })
        .collect();

    let mut owner: Vec<Option<usize>> = vec![None; right.len()];
    (0..left.len()).all(|member| {
        let mut visited = vec![false; right.len()];
        augment(member, &candidates, &mut owner, &mut visited)
    })
}

fn augment(
    member: usize,
    candidates: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &slot in &candidates[member] {
        if visited[slot] {
            continue;
        }
        visited[slot] = true;
        let free = match owner[slot] {
            None => true,
            Some(current) => augment(current, candidates, owner, visited),
        };
        if free {
            owner[slot] = Some(member);
            return true;
        }
    }
    false
}
