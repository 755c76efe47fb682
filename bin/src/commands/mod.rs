//! CLI command implementations.

pub(crate) mod daily;
pub(crate) mod info;
pub(crate) mod monthly;
pub(crate) mod stations;
