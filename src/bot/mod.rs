// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat command layer: parsing, dispatch and reply formatting.

pub mod command;
pub mod handlers;
pub mod reply;

pub use command::{Command, CommandKind};
pub use handlers::handle_text;
pub use reply::Reply;
