use rand::Rng;

/// Smallest value the generator produces.
pub const MIN_VALUE: u32 = 10;
/// Largest value the generator produces.
pub const MAX_VALUE: u32 = 99;
/// Slider bounds for the array size.
pub const MIN_SIZE: usize = 10;
pub const MAX_SIZE: usize = 100;
/// Length of the sandbox's sample input.
pub const SAMPLE_LEN: usize = 10;

/// Draw `size` independent integers uniformly from `[MIN_VALUE, MAX_VALUE]`.
/// Unseeded by design; two calls are expected to differ.
pub fn generate(size: usize) -> Vec<u32> {
    let mut rng = rand::rng();
    (0..size)
        .map(|_| rng.random_range(MIN_VALUE..=MAX_VALUE))
        .collect()
}

/// Fresh 10-element sample for the sandbox evaluator, values in `[0, 99]`.
pub fn sample() -> Vec<u32> {
    let mut rng = rand::rng();
    (0..SAMPLE_LEN).map(|_| rng.random_range(0..100)).collect()
}
