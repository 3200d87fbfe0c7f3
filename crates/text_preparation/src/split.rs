use crate::dataset::InMemoryDataset;
use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::hash::Hash;

/// Splits a dataset into train/test subsets while preserving per-class
/// proportions (stratification).
///
/// Records are grouped by `key` and every group is split independently:
/// `ceil(group_len * test_size)` records go to test, the rest to train. The
/// guarantee is per-class, not just global: for every class `C`,
/// `|train ∩ C| / |C| ≈ 1 - test_size` within integer-rounding tolerance.
///
/// # Arguments
/// - `key`: extracts the stratification value from a record (e.g.
///   `|r: &Record| r.tag.clone()`)
/// - `test_size`: fraction assigned to the test subset, strictly in `(0, 1)`
/// - `shuffle`: whether each group is shuffled before being split; the split
///   is positional (test takes the group's tail), so without shuffling it is
///   contiguous in dataset order
/// - `seed`: drives both the optional per-group shuffle and the final
///   reshuffle of each output. Both outputs are reshuffled with this seed
///   unconditionally, independent of the `shuffle` flag
///
/// Groups are processed in first-seen order, so the result is deterministic
/// for a given dataset order and seed. Outputs carry `"split"` metadata
/// (`"train"` / `"test"`).
///
/// # Edge cases
/// A class with very few records splits unevenly due to rounding: a
/// singleton class puts its only record in test and none in train. This is
/// not corrected.
pub fn stratified_split<T, K, F>(
    dataset: &InMemoryDataset<T>,
    key: F,
    test_size: f64,
    shuffle: bool,
    seed: u64,
) -> Result<(InMemoryDataset<T>, InMemoryDataset<T>)>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    ensure!(!dataset.is_empty(), "Cannot split an empty dataset");
    ensure!(
        0.0 < test_size && test_size < 1.0,
        "test_size must lie strictly in (0, 1), but got {test_size}"
    );

    // Group in first-seen order rather than hash order, so the split does
    // not change between runs of the same input.
    let mut group_index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Vec<T>> = Vec::new();
    for item in dataset.iter() {
        let index = *group_index.entry(key(item)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[index].push(item.clone());
    }
    let num_classes = groups.len();

    let mut train: Vec<T> = Vec::new();
    let mut test: Vec<T> = Vec::new();
    for mut group in groups {
        if shuffle {
            // Fresh RNG per group: every group sees the same seed, matching
            // one independent seeded split call per class.
            let mut rng = StdRng::seed_from_u64(seed);
            group.shuffle(&mut rng);
        }
        let num_test = ((group.len() as f64) * test_size).ceil() as usize;
        let split_at = group.len() - num_test;
        test.extend_from_slice(&group[split_at..]);
        group.truncate(split_at);
        train.append(&mut group);
    }
    tracing::debug!(
        "stratified split over {} classes: {} train / {} test",
        num_classes,
        train.len(),
        test.len()
    );

    let train = InMemoryDataset::new(train)
        .shuffled(seed)
        .with_metadata("split", "train");
    let test = InMemoryDataset::new(test)
        .shuffled(seed)
        .with_metadata("split", "test");
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SEED: u64 = 1234;

    /// (id, class) items: `per_class` counts per class label.
    fn labeled_items(per_class: &[(char, usize)]) -> InMemoryDataset<(usize, char)> {
        let mut items = Vec::new();
        let mut id = 0;
        for &(class, count) in per_class {
            for _ in 0..count {
                items.push((id, class));
                id += 1;
            }
        }
        InMemoryDataset::new(items)
    }

    fn class_count(dataset: &InMemoryDataset<(usize, char)>, class: char) -> usize {
        dataset.iter().filter(|(_, c)| *c == class).count()
    }

    #[test]
    fn preserves_per_class_proportions() -> Result<()> {
        let dataset = labeled_items(&[('a', 12), ('b', 10), ('c', 8)]);
        let (train, test) = stratified_split(&dataset, |item| item.1, 0.25, true, TEST_SEED)?;

        // ceil(12 * .25) = 3, ceil(10 * .25) = 3, ceil(8 * .25) = 2
        assert_eq!(class_count(&test, 'a'), 3);
        assert_eq!(class_count(&test, 'b'), 3);
        assert_eq!(class_count(&test, 'c'), 2);
        assert_eq!(class_count(&train, 'a'), 9);
        assert_eq!(class_count(&train, 'b'), 7);
        assert_eq!(class_count(&train, 'c'), 6);
        Ok(())
    }

    #[test]
    fn partitions_without_loss_or_duplication() -> Result<()> {
        let dataset = labeled_items(&[('a', 7), ('b', 5)]);
        let (train, test) = stratified_split(&dataset, |item| item.1, 0.4, true, TEST_SEED)?;

        let mut ids: Vec<usize> = train.iter().chain(test.iter()).map(|(id, _)| *id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..12).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn is_deterministic_per_seed() -> Result<()> {
        let dataset = labeled_items(&[('a', 20), ('b', 15)]);
        let order = |ds: &InMemoryDataset<(usize, char)>| {
            ds.iter().map(|(id, _)| *id).collect::<Vec<_>>()
        };

        let (train_a, test_a) = stratified_split(&dataset, |item| item.1, 0.3, true, TEST_SEED)?;
        let (train_b, test_b) = stratified_split(&dataset, |item| item.1, 0.3, true, TEST_SEED)?;
        assert_eq!(order(&train_a), order(&train_b));
        assert_eq!(order(&test_a), order(&test_b));

        let (train_c, _) = stratified_split(&dataset, |item| item.1, 0.3, true, 99)?;
        assert_ne!(order(&train_a), order(&train_c));
        Ok(())
    }

    #[test]
    fn unshuffled_split_takes_each_groups_tail() -> Result<()> {
        let dataset = labeled_items(&[('a', 4), ('b', 4)]);
        let (_, test) = stratified_split(&dataset, |item| item.1, 0.5, false, TEST_SEED)?;

        // Group 'a' is ids 0..4, group 'b' is ids 4..8; without shuffling
        // the last half of each goes to test.
        let mut test_ids: Vec<usize> = test.iter().map(|(id, _)| *id).collect();
        test_ids.sort_unstable();
        assert_eq!(test_ids, vec![2, 3, 6, 7]);
        Ok(())
    }

    #[test]
    fn singleton_class_lands_in_test() -> Result<()> {
        let dataset = labeled_items(&[('a', 10), ('z', 1)]);
        let (train, test) = stratified_split(&dataset, |item| item.1, 0.2, true, TEST_SEED)?;
        assert_eq!(class_count(&test, 'z'), 1);
        assert_eq!(class_count(&train, 'z'), 0);
        Ok(())
    }

    #[test]
    fn tags_outputs_with_split_metadata() -> Result<()> {
        let dataset = labeled_items(&[('a', 4)]);
        let (train, test) = stratified_split(&dataset, |item| item.1, 0.25, true, TEST_SEED)?;
        assert_eq!(train.metadata("split"), Some("train"));
        assert_eq!(test.metadata("split"), Some("test"));
        Ok(())
    }

    #[test]
    fn rejects_invalid_arguments() {
        let dataset = labeled_items(&[('a', 4)]);
        for bad in [0.0, 1.0, -0.3, 1.5] {
            assert!(stratified_split(&dataset, |item| item.1, bad, true, TEST_SEED).is_err());
        }

        let empty: InMemoryDataset<(usize, char)> = InMemoryDataset::new(vec![]);
        assert!(stratified_split(&empty, |item| item.1, 0.2, true, TEST_SEED).is_err());
    }
}
