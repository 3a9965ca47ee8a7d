pub mod ai;
pub mod arena;
pub mod collision;
pub mod debris;
pub mod gravity;
pub mod hazards;
pub mod projectile;
