// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Misuse of a deferred result.
///
/// These indicate a bug in how calls were composed, never a runtime condition.
/// The panicking entry points (`complete`, `fail`, `on_outcome`) raise them
/// loudly; the `try_*` variants hand them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeferredError {
    #[error("deferred result already settled")]
    AlreadySettled,

    #[error("deferred result already has a completion handler")]
    HandlerAlreadyAttached,
}
