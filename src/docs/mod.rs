//! Reference documentation panel content.

use crate::engine::Algorithm;

/// One entry in the documentation panel.
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmDoc {
    pub algorithm: Algorithm,
    pub summary: &'static str,
    pub complexity: &'static str,
}

const DOCS: [AlgorithmDoc; 8] = [
    AlgorithmDoc {
        algorithm: Algorithm::Bubble,
        summary: "A simple comparison sort that repeatedly steps through the list, \
                  compares adjacent elements and swaps them if they are in the wrong order.",
        complexity: "O(n²)",
    },
    AlgorithmDoc {
        algorithm: Algorithm::Selection,
        summary: "Divides the input list into a sorted and an unsorted region, and \
                  repeatedly selects the smallest element from the unsorted region to \
                  add to the sorted region.",
        complexity: "O(n²)",
    },
    AlgorithmDoc {
        algorithm: Algorithm::Insertion,
        summary: "Builds the final sorted array one item at a time, by repeatedly \
                  inserting a new element into the sorted portion of the array.",
        complexity: "O(n²)",
    },
    AlgorithmDoc {
        algorithm: Algorithm::Quick,
        summary: "A divide-and-conquer algorithm that works by selecting a 'pivot' \
                  element and partitioning the array around it.",
        complexity: "O(n log n) average, O(n²) worst case",
    },
    AlgorithmDoc {
        algorithm: Algorithm::Merge,
        summary: "A divide-and-conquer algorithm that recursively divides the input \
                  array into two halves, sorts them, and then merges the sorted halves.",
        complexity: "O(n log n)",
    },
    AlgorithmDoc {
        algorithm: Algorithm::Heap,
        summary: "Uses a binary heap data structure to sort elements, building a \
                  max-heap and repeatedly extracting the maximum element.",
        complexity: "O(n log n)",
    },
    AlgorithmDoc {
        algorithm: Algorithm::Shell,
        summary: "An optimization of insertion sort that allows the exchange of items \
                  that are far apart, reducing the number of swaps required.",
        complexity: "O(n log n) to O(n²)",
    },
    AlgorithmDoc {
        algorithm: Algorithm::Radix,
        summary: "A non-comparative sorting algorithm that sorts numbers by processing \
                  each digit position, starting from the least significant digit.",
        complexity: "O(nk) where k is the number of digits",
    },
];

pub fn algorithm_docs() -> &'static [AlgorithmDoc] {
    &DOCS
}

pub fn doc_for(algorithm: Algorithm) -> &'static AlgorithmDoc {
    // DOCS mirrors Algorithm::ALL, one entry per variant.
    DOCS.iter()
        .find(|d| d.algorithm == algorithm)
        .expect("every algorithm is documented")
}

/// The text block the runtime shows when the docs panel is toggled on.
pub fn panel_text() -> String {
    let mut text = String::from("Sorting Algorithms\n\n");
    for doc in &DOCS {
        text.push_str(doc.algorithm.label());
        text.push('\n');
        text.push_str(doc.summary);
        text.push('\n');
        text.push_str("Time Complexity: ");
        text.push_str(doc.complexity);
        text.push_str("\n\n");
    }
    text
}
