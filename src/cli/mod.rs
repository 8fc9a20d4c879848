//! CLI command implementations.
//!
//! Each submodule implements one `asclepius` command. Argument types derive
//! `clap` traits so the binary can embed them directly.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `classify` | Classify an image and optionally save the result |
//! | `history` | List, show, or delete saved results |
//! | `news` | Fetch cancer-related health headlines |
//! | `status` | Show database, model, and news API status |
//! | `config` | Show the effective configuration |
//!
//! # Example Usage
//!
//! ```bash
//! # Classify a photo and keep the result
//! asclepius classify skin.jpg --save
//!
//! # Classify a region of a photo as JSON
//! asclepius classify skin.jpg --crop 10,10,200,200 --format json
//!
//! # Browse the history
//! asclepius history list
//! asclepius history delete 3 --force
//! ```

mod classify;
mod config;
mod history;
mod news;
mod status;

pub use classify::{ClassifyArgs, cmd_classify};
pub use config::cmd_config;
pub use history::{HistoryAction, cmd_history};
pub use news::cmd_news;
pub use status::cmd_status;
