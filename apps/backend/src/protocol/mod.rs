pub mod room_state;
