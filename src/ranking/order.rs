use super::{Criterion, Direction, IdeaSnapshot};

/// Order snapshots by `criterion` applied in `direction`.
///
/// The direction is applied to the comparator, including its `id`
/// tie-break, so the result is a strict total order whenever ids are
/// unique. The input slice is left untouched.
pub fn order(
    snapshots: &[IdeaSnapshot],
    criterion: Criterion,
    direction: Direction,
) -> Vec<IdeaSnapshot> {
    let mut ordered = snapshots.to_vec();
    ordered.sort_by(|a, b| direction.apply(criterion.compare(a, b)));
    ordered
}
