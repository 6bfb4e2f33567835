pub mod comm;
pub mod sock;
