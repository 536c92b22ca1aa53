pub mod custom_grid;
pub mod grid_world;
