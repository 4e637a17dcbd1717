// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

use super::types::{FeatureName, ReferenceSpaceKind, SessionId};

/// Failures reported by an [`XrRuntime`](super::runtime::XrRuntime) request.
///
/// None of these are fatal to the app; callers degrade (no session, no reticle)
/// and log.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum XrError {
    #[error("immersive AR sessions are not supported by this runtime")]
    NotSupported,
    #[error("required feature `{0}` is not supported")]
    FeatureUnsupported(FeatureName),
    #[error("reference space `{0}` is not available")]
    SpaceUnavailable(ReferenceSpaceKind),
    #[error("session {0} has ended")]
    SessionEnded(SessionId),
    #[error("request was dropped before it resolved")]
    Dropped,
    #[error("runtime error: {0}")]
    Runtime(String),
}
