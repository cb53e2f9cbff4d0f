pub mod room_flow;
pub mod sweeper;
