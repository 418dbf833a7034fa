// Controller for a 6-axis servo arm driven by line commands over serial

pub mod bridge;
pub mod config;
pub mod controller;
pub mod error;
pub mod joint;
pub mod messages;
pub mod motion;
pub mod motor;
pub mod poses;
pub mod protocol;
pub mod runtime;
pub mod teleop;
