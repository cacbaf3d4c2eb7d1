// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules.

pub mod webhook_auth;

pub use webhook_auth::require_webhook_secret;
