pub mod maintenance;
pub mod mechanic;
pub mod planner;
pub mod trips;
pub mod weather;
