//! Rescue boat dispatch simulation: alert clustering, greedy boat assignment,
//! per-tick movement and street routing, driven by an actor-owned state.

pub mod config;
pub mod console;
pub mod engine;
pub mod fleet;
pub mod generator;
pub mod geo;
pub mod models;
pub mod processor;
pub mod routing;
pub mod simulation;
