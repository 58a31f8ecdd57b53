// Smartmark state managers
// Managers hold the live bookmark view and decide what a session may see.

pub mod bookmark_list;
pub mod session_gate;
pub mod sync_engine;
