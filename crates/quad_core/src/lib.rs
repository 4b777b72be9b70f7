#![deny(warnings)]

pub mod app;
pub mod event;
pub mod fps;
pub mod gpu;
pub mod lifecycle;
pub mod offscreen;
pub mod overlay;
pub mod renderer;
pub mod state;
