//! The hand viewer: a smoothed quaternion camera with recorded transitions, and procedural or
//! toggle-driven finger poses resolved through the hand's bone hierarchy.

pub mod camera;
pub mod config;
pub mod controls;
pub mod generators;
pub mod math;
pub mod mode;
pub mod pose;
pub mod session;
pub mod skeleton;
pub mod transition;
