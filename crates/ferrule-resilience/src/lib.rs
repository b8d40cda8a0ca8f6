// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry and cancellation primitives for provider calls.

pub mod abort;
pub mod retry;

pub use abort::AbortSignal;
pub use retry::RetryPolicy;
