//! CLI module - Command-line interface for yamdb
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// yamdb - a catalog of titles with reviews, comments and ratings
#[derive(Parser)]
#[command(name = "yamdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API (the default)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Inspect or move the database schema
    Migrate {
        #[command(subcommand)]
        command: MigrateCommands,
    },

    /// Manage API users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Browse titles
    Title {
        #[command(subcommand)]
        command: TitleCommands,
    },

    /// Browse reviews
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },
}

#[derive(Subcommand)]
pub enum MigrateCommands {
    /// Apply all pending migrations
    Up,
    /// Revert the most recent migrations
    Down {
        /// Number of migrations to revert
        #[arg(default_value = "1")]
        steps: u32,
    },
    /// Show applied and pending migrations
    Status,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user and print its API key
    Add {
        /// Unique username
        username: String,
    },
    /// List users
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand)]
pub enum TitleCommands {
    /// List titles with their ratings
    #[command(alias = "ls")]
    List {
        /// Only titles in this category (slug)
        #[arg(long)]
        category: Option<String>,
        /// Only titles with this genre (slug)
        #[arg(long)]
        genre: Option<String>,
    },
    /// Show a title summary
    Show {
        /// Title ID
        id: i32,
    },
}

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// Show a review with its comments
    Show {
        /// Review ID
        id: i32,
    },
}

pub use commands::*;
