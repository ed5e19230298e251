pub mod ecs;
pub mod session;
