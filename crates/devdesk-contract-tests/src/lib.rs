//! Contract validation crate: tests live in `tests/`.
