pub mod cart_pole_environment;
pub mod cart_pole_drawer;
pub mod cli;
