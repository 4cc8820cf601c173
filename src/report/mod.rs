pub mod show;
pub mod svg;
