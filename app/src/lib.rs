//! Todo lists, todos and notes over REST

pub mod config;
pub mod controllers;
pub mod migrations;
pub mod models;
pub mod routes;
pub mod state;

#[cfg(test)]
mod tests;
