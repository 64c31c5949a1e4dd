//! Internal implementation details.

pub(crate) mod build_guard;

pub(crate) use build_guard::BuildGuard;
