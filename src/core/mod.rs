pub mod histogram;
pub mod io;
pub mod table;
pub mod trials;
