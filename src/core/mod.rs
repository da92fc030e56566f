pub mod attributes;
pub mod components;
pub mod couplings;
pub mod error;
pub mod events;
pub mod execution;
pub mod types;
pub mod values;
pub mod workspace;

#[cfg(test)]
mod tests;
