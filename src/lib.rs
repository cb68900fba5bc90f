pub mod api;
pub mod bins;
pub mod calibration;
pub mod config;
pub mod error;
pub mod geo;
pub mod heatmap;
pub mod priority;
pub mod route;
pub mod seed;
pub mod service;
pub mod state;
pub mod store;
