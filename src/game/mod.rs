pub mod constants;
pub mod events;
pub mod input;
pub mod match_result;
pub mod ship;
pub mod simulation;
pub mod state;
pub mod systems;
