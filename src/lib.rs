// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |          show / get / set / unset
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |           store           |
//!              |  Context: lock, dirty,    |
//!              |  import scripts, cursor   |
//!              '--+-----------------+------'
//!                 |                 |
//!                 v                 v
//!              config              env
//!        structured YAML |    EnvBackend trait
//!        legacy fw_env   |    UbootEnv: image,
//!                             redundant copies
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging            |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod env;
pub mod error;
pub mod logging;
pub mod store;
