//! Helpdesk Control - console front-end for the FAQ responder

pub mod chat;
pub mod cli;
pub mod commands;
