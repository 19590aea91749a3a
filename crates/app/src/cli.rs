//! Command line surface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stockroom_core::Role;

/// Stockroom - inventory back office with an audited stock ledger
#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, global = true, env = "STOCKROOM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bearer token returned by `login`
    #[arg(long, global = true, env = "STOCKROOM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Pretty-print the JSON result
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an account
    Register(RegisterArgs),

    /// Log in and print a bearer token
    Login(LoginArgs),

    /// End every session of the calling user
    Logout,

    /// Manage accounts
    #[command(subcommand)]
    User(UserCommand),

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Manage stocked items
    #[command(subcommand)]
    Item(ItemCommand),

    /// Read the audit trail
    #[command(subcommand)]
    Activity(ActivityCommand),

    /// Report items at or below a stock threshold
    Report(ReportArgs),

    /// Delete expired session records
    PruneSessions,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    User,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Role::Admin,
            RoleArg::User => Role::User,
        }
    }
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub full_name: String,

    #[arg(long, env = "STOCKROOM_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, value_enum, default_value = "user")]
    pub role: RoleArg,
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long, env = "STOCKROOM_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// List all accounts
    List,

    /// Show one account
    Show { username: String },

    /// Check whether a username is taken
    Exists { username: String },

    /// Overwrite an account's name, password and role
    Update(UserUpdateArgs),

    /// Delete an account
    Delete { username: String },
}

#[derive(Args)]
pub struct UserUpdateArgs {
    pub username: String,

    #[arg(long)]
    pub full_name: String,

    #[arg(long, env = "STOCKROOM_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, value_enum)]
    pub role: RoleArg,
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// List all categories
    List,

    /// Show one category
    Show { id: i64 },

    /// Check whether a category name is taken
    Exists { name: String },

    /// Create a category
    Add { name: String },

    /// Rename a category
    Update { id: i64, name: String },

    /// Delete a category
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum ItemCommand {
    /// List all items
    List,

    /// Show one item
    Show { id: i64 },

    /// List the items filed under a category
    ByCategory { category_id: i64 },

    /// Check whether an item name is taken
    Exists { name: String },

    /// Create an item
    Add(ItemArgs),

    /// Overwrite an item
    Update {
        id: i64,

        #[command(flatten)]
        item: ItemArgs,
    },

    /// Delete an item
    Delete { id: i64 },
}

#[derive(Args)]
pub struct ItemArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub category_id: i64,

    #[arg(long, allow_negative_numbers = true)]
    pub quantity: i64,

    #[arg(long)]
    pub price: f64,

    #[arg(long)]
    pub specification: String,
}

#[derive(Subcommand)]
pub enum ActivityCommand {
    /// List every audit entry
    List,

    /// List the audit entries for one item id
    Item { item_id: i64 },
}

#[derive(Args)]
pub struct ReportArgs {
    /// Include items whose quantity is at or below this value
    #[arg(long, default_value_t = 5)]
    pub threshold: i64,
}
