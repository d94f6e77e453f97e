pub mod answer;
pub mod config;
pub mod error;
pub mod eval;
pub mod interpretation;
pub mod metrics;
pub mod name;
pub mod nogood;
pub mod plugin;
pub mod plugins;
pub mod query;
pub mod registry;
pub mod store;
pub mod symbol;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_utils;
