pub mod ai;
pub mod conditions;
pub mod engine;
pub mod rewards;
pub mod state;
pub mod turn;

#[cfg(test)]
mod tests;
