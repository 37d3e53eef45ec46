pub mod common;

#[cfg(test)]
mod test_actions;

#[cfg(test)]
mod test_battle_flow;
