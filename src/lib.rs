//! Newsroom - a small news publishing site
//!
//! This library provides the core functionality for the Newsroom site:
//! categorized news with paginated listings, user accounts and a contact form.

pub mod config;
pub mod db;
pub mod forms;
pub mod models;
pub mod services;
pub mod theme;
pub mod web;
