pub mod media;
pub mod quiz;
pub mod sessions;
