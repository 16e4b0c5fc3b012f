//! The window's panels, laid out by `TalkCleanerApp::update`.

pub mod bottom;
pub mod central;
pub mod side;
pub mod top;
