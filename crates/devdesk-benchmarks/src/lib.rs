//! Benchmark crate: NFR smoke tests live in `tests/`.
