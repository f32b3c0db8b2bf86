//! The eight animated sorting procedures. Every function mutates its working
//! slice in place and reports progress through the [`StepContext`]: a
//! `Compare` before each control-flow comparison (followed by a suspend), a
//! `Swap` at the moment elements move, and an `ArrayUpdated` immediately
//! after the move lands. Display conventions of the reference animation are
//! reproduced exactly, including merge sort labelling one-directional copies
//! as swaps and radix sort emitting self-referential `Compare(i, i)` /
//! `Swap(i, i)` pairs for pacing.
//!
//! Quick, merge, and heap avoid recursion at suspend points: quick sort runs
//! an explicit range stack, merge sort executes a precomputed post-order
//! merge schedule, and heapify is an iterative sift-down. Emission order is
//! identical to the depth-first recursive formulation.

use super::control::{StepContext, StepResult};

pub fn bubble(arr: &mut [u32], ctx: &StepContext) -> StepResult<()> {
    let n = arr.len();
    for i in 0..n.saturating_sub(1) {
        for j in 0..n - i - 1 {
            ctx.compare(j, j + 1)?;
            if arr[j] > arr[j + 1] {
                ctx.mark_swap(j, j + 1);
                arr.swap(j, j + 1);
                ctx.publish(arr);
            }
        }
    }
    Ok(())
}

pub fn selection(arr: &mut [u32], ctx: &StepContext) -> StepResult<()> {
    let n = arr.len();
    for i in 0..n.saturating_sub(1) {
        let mut min_idx = i;
        for j in i + 1..n {
            // The comparison is emitted even when the minimum does not move.
            ctx.compare(min_idx, j)?;
            if arr[j] < arr[min_idx] {
                min_idx = j;
            }
        }
        if min_idx != i {
            ctx.mark_swap(i, min_idx);
            arr.swap(i, min_idx);
            ctx.publish(arr);
        }
    }
    Ok(())
}

pub fn insertion(arr: &mut [u32], ctx: &StepContext) -> StepResult<()> {
    let n = arr.len();
    for i in 1..n {
        let key = arr[i];
        let mut j = i;
        while j > 0 {
            ctx.compare(j - 1, j)?;
            if arr[j - 1] > key {
                // Each shift is reported as a swap of adjacent slots.
                ctx.mark_swap(j - 1, j);
                arr[j] = arr[j - 1];
                ctx.publish(arr);
                j -= 1;
            } else {
                break;
            }
        }
        // Final placement publishes without a matching swap.
        arr[j] = key;
        ctx.publish(arr);
    }
    Ok(())
}

pub fn quick(arr: &mut [u32], ctx: &StepContext) -> StepResult<()> {
    if arr.len() < 2 {
        return Ok(());
    }
    // Explicit work stack; the left range is pushed last so it is processed
    // first, matching depth-first recursion order.
    let mut ranges = vec![(0usize, arr.len() - 1)];
    while let Some((low, high)) = ranges.pop() {
        if low >= high {
            continue;
        }
        let pivot = partition(arr, low, high, ctx)?;
        if pivot + 1 < high {
            ranges.push((pivot + 1, high));
        }
        if pivot > 0 && low + 1 < pivot {
            ranges.push((low, pivot - 1));
        }
    }
    Ok(())
}

/// Lomuto partition with the last element as pivot. `slot` tracks where the
/// next small element lands; self-swaps are emitted like any other.
fn partition(arr: &mut [u32], low: usize, high: usize, ctx: &StepContext) -> StepResult<usize> {
    let pivot = arr[high];
    let mut slot = low;
    for j in low..high {
        ctx.compare(j, high)?;
        if arr[j] < pivot {
            ctx.mark_swap(slot, j);
            arr.swap(slot, j);
            ctx.publish(arr);
            slot += 1;
        }
    }
    ctx.mark_swap(slot, high);
    arr.swap(slot, high);
    ctx.publish(arr);
    Ok(slot)
}

pub fn merge(arr: &mut [u32], ctx: &StepContext) -> StepResult<()> {
    if arr.len() < 2 {
        return Ok(());
    }
    let mut schedule = Vec::new();
    merge_schedule(0, arr.len() - 1, &mut schedule);
    for (left, mid, right) in schedule {
        merge_range(arr, left, mid, right, ctx)?;
    }
    Ok(())
}

/// Post-order list of `(left, mid, right)` merges, identical to the order a
/// top-down recursive merge sort performs them in. Pure range arithmetic, no
/// suspend points.
fn merge_schedule(left: usize, right: usize, out: &mut Vec<(usize, usize, usize)>) {
    if left < right {
        let mid = (left + right) / 2;
        merge_schedule(left, mid, out);
        merge_schedule(mid + 1, right, out);
        out.push((left, mid, right));
    }
}

fn merge_range(
    arr: &mut [u32],
    left: usize,
    mid: usize,
    right: usize,
    ctx: &StepContext,
) -> StepResult<()> {
    let left_buf: Vec<u32> = arr[left..=mid].to_vec();
    let right_buf: Vec<u32> = arr[mid + 1..=right].to_vec();

    let mut i = 0;
    let mut j = 0;
    let mut k = left;

    while i < left_buf.len() && j < right_buf.len() {
        ctx.compare(left + i, mid + 1 + j)?;
        // "Swap" here is a one-directional copy from a temp buffer into the
        // destination slot; the display convention is kept as-is.
        if left_buf[i] <= right_buf[j] {
            ctx.mark_swap(k, left + i);
            arr[k] = left_buf[i];
            i += 1;
        } else {
            ctx.mark_swap(k, mid + 1 + j);
            arr[k] = right_buf[j];
            j += 1;
        }
        ctx.publish(arr);
        k += 1;
    }

    // Drain loops emit without suspending.
    while i < left_buf.len() {
        ctx.mark_swap(k, left + i);
        arr[k] = left_buf[i];
        ctx.publish(arr);
        i += 1;
        k += 1;
    }
    while j < right_buf.len() {
        ctx.mark_swap(k, mid + 1 + j);
        arr[k] = right_buf[j];
        ctx.publish(arr);
        j += 1;
        k += 1;
    }
    Ok(())
}

pub fn heap(arr: &mut [u32], ctx: &StepContext) -> StepResult<()> {
    let n = arr.len();
    for i in (0..n / 2).rev() {
        sift_down(arr, n, i, ctx)?;
    }
    for end in (1..n).rev() {
        ctx.mark_swap(0, end);
        arr.swap(0, end);
        ctx.publish(arr);
        ctx.pace()?;
        sift_down(arr, end, 0, ctx)?;
    }
    Ok(())
}

/// Iterative sift-down; an extra suspend follows each swap before descending.
fn sift_down(arr: &mut [u32], n: usize, mut i: usize, ctx: &StepContext) -> StepResult<()> {
    loop {
        let mut largest = i;
        let left = 2 * i + 1;
        let right = 2 * i + 2;

        if left < n {
            ctx.compare(largest, left)?;
            if arr[left] > arr[largest] {
                largest = left;
            }
        }
        if right < n {
            ctx.compare(largest, right)?;
            if arr[right] > arr[largest] {
                largest = right;
            }
        }
        if largest == i {
            return Ok(());
        }
        ctx.mark_swap(i, largest);
        arr.swap(i, largest);
        ctx.publish(arr);
        ctx.pace()?;
        i = largest;
    }
}

pub fn shell(arr: &mut [u32], ctx: &StepContext) -> StepResult<()> {
    let n = arr.len();
    let mut gap = n / 2;
    while gap > 0 {
        for i in gap..n {
            let temp = arr[i];
            let mut j = i;
            while j >= gap {
                ctx.compare(j, j - gap)?;
                if arr[j - gap] > temp {
                    ctx.mark_swap(j, j - gap);
                    arr[j] = arr[j - gap];
                    ctx.publish(arr);
                    ctx.pace()?;
                    j -= gap;
                } else {
                    break;
                }
            }
            arr[j] = temp;
            ctx.publish(arr);
        }
        gap /= 2;
    }
    Ok(())
}

pub fn radix(arr: &mut [u32], ctx: &StepContext) -> StepResult<()> {
    if arr.len() < 2 {
        return Ok(());
    }
    let max = arr.iter().copied().max().unwrap_or(0);
    let mut exp: u64 = 1;
    while u64::from(max) / exp > 0 {
        let mut output = vec![0u32; arr.len()];
        let mut count = [0usize; 10];

        // Counting pass: the self-comparison exists purely for visual pacing.
        for i in 0..arr.len() {
            ctx.compare(i, i)?;
            count[digit(arr[i], exp)] += 1;
        }
        for d in 1..10 {
            count[d] += count[d - 1];
        }
        for i in (0..arr.len()).rev() {
            let d = digit(arr[i], exp);
            output[count[d] - 1] = arr[i];
            count[d] -= 1;
        }

        // Writeback: one self-referential "swap" per output position.
        for i in 0..arr.len() {
            ctx.mark_swap(i, i);
            arr[i] = output[i];
            ctx.publish(arr);
            ctx.pace()?;
        }
        exp *= 10;
    }
    Ok(())
}

fn digit(value: u32, exp: u64) -> usize {
    ((u64::from(value) / exp) % 10) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::control::{SortControls, StepContext};
    use crate::engine::observer::{AnimationEvent, RecordingObserver};
    use std::sync::Arc;
    use std::time::Duration;

    fn run<F>(algorithm: F, input: &[u32]) -> (Vec<u32>, Vec<AnimationEvent>)
    where
        F: Fn(&mut [u32], &StepContext) -> StepResult<()>,
    {
        let observer = Arc::new(RecordingObserver::new());
        let ctx = StepContext::new(
            Duration::ZERO,
            Arc::new(SortControls::new()),
            observer.clone(),
        );
        let mut working = input.to_vec();
        algorithm(&mut working, &ctx).unwrap();
        (working, observer.events())
    }

    fn is_sorted(arr: &[u32]) -> bool {
        arr.windows(2).all(|w| w[0] <= w[1])
    }

    fn assert_permutation(original: &[u32], sorted: &[u32]) {
        let mut a = original.to_vec();
        let mut b = sorted.to_vec();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    const ALGORITHMS: [(&str, fn(&mut [u32], &StepContext) -> StepResult<()>); 8] = [
        ("bubble", bubble),
        ("selection", selection),
        ("insertion", insertion),
        ("quick", quick),
        ("merge", merge),
        ("heap", heap),
        ("shell", shell),
        ("radix", radix),
    ];

    #[test]
    fn all_algorithms_sort_random_input() {
        let input = crate::sequence::generate(40);
        for (name, algorithm) in ALGORITHMS {
            let (result, _) = run(algorithm, &input);
            assert!(is_sorted(&result), "{name} left the array unsorted");
            assert_permutation(&input, &result);
        }
    }

    #[test]
    fn all_algorithms_handle_degenerate_input() {
        for (name, algorithm) in ALGORITHMS {
            let (result, events) = run(algorithm, &[]);
            assert!(result.is_empty());
            assert!(events.is_empty(), "{name} emitted on empty input");

            let (result, events) = run(algorithm, &[42]);
            assert_eq!(result, vec![42]);
            assert!(events.is_empty(), "{name} emitted on singleton input");
        }
    }

    #[test]
    fn all_emitted_indices_are_in_range() {
        let input = crate::sequence::generate(25);
        for (name, algorithm) in ALGORITHMS {
            let (_, events) = run(algorithm, &input);
            for event in events {
                match event {
                    AnimationEvent::Compare(i, j) | AnimationEvent::Swap(i, j) => {
                        assert!(i < input.len() && j < input.len(), "{name}: ({i}, {j})");
                    }
                    AnimationEvent::ArrayUpdated(snapshot) => {
                        assert_eq!(snapshot.len(), input.len(), "{name} resized the array");
                    }
                }
            }
        }
    }

    #[test]
    fn bubble_scenario_counts_match() {
        let (result, events) = run(bubble, &[5, 3, 8, 1]);
        assert_eq!(result, vec![1, 3, 5, 8]);

        let compares: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                AnimationEvent::Compare(i, j) => Some((*i, *j)),
                _ => None,
            })
            .collect();
        let swaps = events
            .iter()
            .filter(|e| matches!(e, AnimationEvent::Swap(..)))
            .count();

        // 6 comparisons over three shrinking passes; one swap per inversion.
        assert_eq!(compares.len(), 6);
        assert_eq!(swaps, 4);
        // First pass walks the adjacent pairs in order.
        assert_eq!(&compares[..3], &[(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn swap_replay_reproduces_output_for_exchange_sorts() {
        let input = crate::sequence::generate(30);
        for (name, algorithm) in [
            ("bubble", bubble as fn(&mut [u32], &StepContext) -> StepResult<()>),
            ("selection", selection),
            ("quick", quick),
            ("heap", heap),
        ] {
            let (result, events) = run(algorithm, &input);
            let mut replay = input.clone();
            for event in &events {
                if let AnimationEvent::Swap(i, j) = event {
                    replay.swap(*i, *j);
                }
            }
            assert_eq!(replay, result, "{name} replay diverged");
        }
    }

    #[test]
    fn copy_swaps_move_live_values_for_insertion_and_shell() {
        // Insertion and shell label shifts as swaps, but the mutation is a
        // one-directional copy whose source is still the live array. Each
        // swap-then-update pair must show exactly that copy; placements
        // publish without a swap and are adopted as-is.
        let input = crate::sequence::generate(25);
        for (name, algorithm) in [
            ("insertion", insertion as fn(&mut [u32], &StepContext) -> StepResult<()>),
            ("shell", shell),
        ] {
            let (result, events) = run(algorithm, &input);
            let mut current = input.clone();
            let mut pending: Option<(usize, usize)> = None;
            for event in &events {
                match event {
                    AnimationEvent::Swap(a, b) => pending = Some((*a, *b)),
                    AnimationEvent::ArrayUpdated(snapshot) => {
                        if let Some((a, b)) = pending.take() {
                            for idx in 0..current.len() {
                                if idx != a && idx != b {
                                    assert_eq!(
                                        snapshot[idx], current[idx],
                                        "{name}: copy touched slot {idx}"
                                    );
                                }
                            }
                            let from_a = snapshot[b] == current[a] && snapshot[a] == current[a];
                            let from_b = snapshot[a] == current[b] && snapshot[b] == current[b];
                            assert!(from_a || from_b, "{name}: swap ({a}, {b}) is not a live copy");
                        }
                        current = snapshot.clone();
                    }
                    AnimationEvent::Compare(..) => {}
                }
            }
            assert_eq!(current, result, "{name}: update stream diverged");
        }
    }

    #[test]
    fn last_snapshot_matches_final_array() {
        let input = crate::sequence::generate(20);
        for (name, algorithm) in ALGORITHMS {
            let (result, events) = run(algorithm, &input);
            let last = events.iter().rev().find_map(|e| match e {
                AnimationEvent::ArrayUpdated(snapshot) => Some(snapshot.clone()),
                _ => None,
            });
            if let Some(snapshot) = last {
                assert_eq!(snapshot, result, "{name} final snapshot stale");
            }
        }
    }

    #[test]
    fn selection_emits_compare_even_when_min_unchanged() {
        // Already sorted: the minimum never moves, yet every candidate in the
        // unscanned suffix is compared. n-1 + n-2 + ... + 1 comparisons.
        let (_, events) = run(selection, &[1, 2, 3, 4, 5]);
        let compares = events
            .iter()
            .filter(|e| matches!(e, AnimationEvent::Compare(..)))
            .count();
        let swaps = events
            .iter()
            .filter(|e| matches!(e, AnimationEvent::Swap(..)))
            .count();
        assert_eq!(compares, 10);
        assert_eq!(swaps, 0);
    }

    #[test]
    fn insertion_publishes_placement_without_swap() {
        // [2, 1]: one compare, one shift-swap, shift publish, then the key
        // placement publish with no matching swap.
        let (result, events) = run(insertion, &[2, 1]);
        assert_eq!(result, vec![1, 2]);
        assert_eq!(
            events,
            vec![
                AnimationEvent::Compare(0, 1),
                AnimationEvent::Swap(0, 1),
                AnimationEvent::ArrayUpdated(vec![2, 2]),
                AnimationEvent::ArrayUpdated(vec![1, 2]),
            ]
        );
    }

    #[test]
    fn merge_labels_copies_as_swaps() {
        let (result, events) = run(merge, &[2, 1]);
        assert_eq!(result, vec![1, 2]);
        assert_eq!(
            events,
            vec![
                AnimationEvent::Compare(0, 1),
                AnimationEvent::Swap(0, 1),
                AnimationEvent::ArrayUpdated(vec![1, 1]),
                AnimationEvent::Swap(1, 0),
                AnimationEvent::ArrayUpdated(vec![1, 2]),
            ]
        );
    }

    #[test]
    fn radix_scenario_sorts_multi_digit_values() {
        let (result, events) = run(radix, &[170, 45, 75, 90, 802, 24, 2, 66]);
        assert_eq!(result, vec![2, 24, 45, 66, 75, 90, 170, 802]);
        // Three decimal digit passes over eight elements: every compare and
        // swap is self-referential.
        for event in &events {
            match event {
                AnimationEvent::Compare(i, j) | AnimationEvent::Swap(i, j) => {
                    assert_eq!(i, j);
                }
                AnimationEvent::ArrayUpdated(_) => {}
            }
        }
        let compares = events
            .iter()
            .filter(|e| matches!(e, AnimationEvent::Compare(..)))
            .count();
        assert_eq!(compares, 3 * 8);
    }

    #[test]
    fn radix_handles_all_equal_and_zero_values() {
        let (result, _) = run(radix, &[7, 7, 7]);
        assert_eq!(result, vec![7, 7, 7]);

        let (result, events) = run(radix, &[0, 0]);
        assert_eq!(result, vec![0, 0]);
        // max == 0 means no digit passes at all.
        assert!(events.is_empty());
    }

    #[test]
    fn quick_sorts_adversarial_inputs() {
        for input in [
            vec![9, 8, 7, 6, 5, 4, 3, 2, 1],
            vec![1, 1, 1, 1],
            vec![2, 1],
            vec![5, 5, 3, 5, 1, 5],
        ] {
            let (result, _) = run(quick, &input);
            assert!(is_sorted(&result));
            assert_permutation(&input, &result);
        }
    }

    #[test]
    fn shell_uses_halving_gap_sequence() {
        // For n=5 the gaps are 2 then 1; with a reverse-sorted input the
        // first emitted comparison is at gap distance 2.
        let (result, events) = run(shell, &[5, 4, 3, 2, 1]);
        assert_eq!(result, vec![1, 2, 3, 4, 5]);
        assert_eq!(events[0], AnimationEvent::Compare(2, 0));
    }

    #[test]
    fn every_swap_is_followed_by_an_update() {
        let input = crate::sequence::generate(15);
        for (name, algorithm) in ALGORITHMS {
            let (_, events) = run(algorithm, &input);
            for pair in events.windows(2) {
                if matches!(pair[0], AnimationEvent::Swap(..)) {
                    assert!(
                        matches!(pair[1], AnimationEvent::ArrayUpdated(_)),
                        "{name}: swap not followed by update"
                    );
                }
            }
            if let Some(last) = events.last() {
                assert!(
                    !matches!(last, AnimationEvent::Swap(..)),
                    "{name}: trailing swap without update"
                );
            }
        }
    }
}
