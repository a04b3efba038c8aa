//! HTTP front end for the sentiment classification service

pub mod api;
pub mod config;
