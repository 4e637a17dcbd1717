// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lifecycle of the single hit-test query of a session.
//!
//! Uninitialized -> Requesting -> Ready, with Failed as a dead end for the
//! session and TornDown reachable from every state on session end. The
//! `requested` guard is set once per session and only cleared on teardown.

use bevy::prelude::*;
use std::task::Poll;

use crate::xr::{
    Hit, HitTestSource, Pending, ReferenceSpace, ReferenceSpaceKind, SessionId, XrError, XrFrame,
    XrRuntime, XrSession,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPhase {
    Uninitialized,
    Requesting,
    Ready,
    /// An acquisition step was rejected; no retry for this session.
    Failed,
    TornDown,
}

#[derive(Debug)]
enum AcquireStep {
    ViewerSpace(Pending<ReferenceSpace>),
    Source(Pending<HitTestSource>),
}

#[derive(Debug)]
enum ChannelState {
    Uninitialized,
    Requesting { session: SessionId, step: AcquireStep },
    Ready { source: HitTestSource },
    Failed { session: SessionId, error: XrError },
    TornDown,
}

#[derive(Debug)]
pub struct HitTestChannel {
    state: ChannelState,
    requested: bool,
    requests_issued: u32,
}

impl Default for HitTestChannel {
    fn default() -> Self {
        Self { state: ChannelState::Uninitialized, requested: false, requests_issued: 0 }
    }
}

impl HitTestChannel {
    pub fn phase(&self) -> ChannelPhase {
        match self.state {
            ChannelState::Uninitialized => ChannelPhase::Uninitialized,
            ChannelState::Requesting { .. } => ChannelPhase::Requesting,
            ChannelState::Ready { .. } => ChannelPhase::Ready,
            ChannelState::Failed { .. } => ChannelPhase::Failed,
            ChannelState::TornDown => ChannelPhase::TornDown,
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ChannelState::Ready { .. })
    }

    pub fn source(&self) -> Option<&HitTestSource> {
        match &self.state {
            ChannelState::Ready { source } => Some(source),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&XrError> {
        match &self.state {
            ChannelState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Number of acquisition chains started over the channel's lifetime.
    pub fn requests_issued(&self) -> u32 {
        self.requests_issued
    }

    fn owner(&self) -> Option<SessionId> {
        match &self.state {
            ChannelState::Requesting { session, .. } | ChannelState::Failed { session, .. } => Some(*session),
            ChannelState::Ready { source } => Some(source.session),
            ChannelState::Uninitialized | ChannelState::TornDown => None,
        }
    }

    /// Start acquisition for `session` unless it already started. Safe to call
    /// every tick. Returns true when a request was issued by this call.
    pub fn ensure_requested(&mut self, session: &XrSession, runtime: &mut dyn XrRuntime) -> bool {
        if self.requested {
            if self.owner() == Some(session.id) {
                return false;
            }
            warn!(
                target: "hit_test",
                "HitTestChannel: state of session {:?} outlived its session; resetting for {}",
                self.owner(),
                session.id
            );
            self.on_session_end();
        }
        let step = AcquireStep::ViewerSpace(runtime.request_reference_space(session, ReferenceSpaceKind::Viewer));
        self.state = ChannelState::Requesting { session: session.id, step };
        self.requested = true;
        self.requests_issued += 1;
        info!(target: "hit_test", "HitTestChannel: requesting viewer space for session {}", session.id);
        true
    }

    /// Poll outstanding acquisition steps, chaining the source request once the
    /// viewer space arrives. Does nothing outside `Requesting`.
    pub fn advance(&mut self, session: &XrSession, runtime: &mut dyn XrRuntime) -> ChannelPhase {
        loop {
            let ChannelState::Requesting { session: owner, step } = &mut self.state else {
                break;
            };
            if *owner != session.id {
                break;
            }
            match step {
                AcquireStep::ViewerSpace(pending) => match pending.poll() {
                    Poll::Pending => break,
                    Poll::Ready(Ok(space)) => {
                        debug!(target: "hit_test", "HitTestChannel: viewer space ready; requesting source");
                        *step = AcquireStep::Source(runtime.request_hit_test_source(session, &space));
                    }
                    Poll::Ready(Err(error)) => {
                        self.fail(session.id, error);
                        break;
                    }
                },
                AcquireStep::Source(pending) => match pending.poll() {
                    Poll::Pending => break,
                    Poll::Ready(Ok(source)) => {
                        info!(target: "hit_test", "HitTestChannel: ready for session {}", session.id);
                        self.state = ChannelState::Ready { source };
                        break;
                    }
                    Poll::Ready(Err(error)) => {
                        self.fail(session.id, error);
                        break;
                    }
                },
            }
        }
        self.phase()
    }

    fn fail(&mut self, session: SessionId, error: XrError) {
        warn!(
            target: "hit_test",
            "HitTestChannel: acquisition failed for session {session}: {error}; reticle stays hidden"
        );
        self.state = ChannelState::Failed { session, error };
    }

    /// Ordered hits for this tick. Empty unless `Ready` for the frame's session.
    pub fn query_hits<'f>(&self, frame: &'f XrFrame) -> &'f [Hit] {
        match &self.state {
            ChannelState::Ready { source } if source.session == frame.session => {
                frame.hit_test_results(source)
            }
            _ => &[],
        }
    }

    /// Drop the source and any pending step; the next session may request again.
    pub fn on_session_end(&mut self) {
        if self.phase() != ChannelPhase::TornDown {
            debug!(target: "hit_test", "HitTestChannel: {:?} -> TornDown", self.phase());
        }
        self.state = ChannelState::TornDown;
        self.requested = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xr::{FeatureName, ManualRuntime, SessionInit};

    fn open(rt: &mut ManualRuntime) -> XrSession {
        let init = SessionInit {
            required_features: [FeatureName::HitTest].into_iter().collect(),
            ..Default::default()
        };
        match rt.request_session(&init).poll() {
            Poll::Ready(Ok(s)) => s,
            other => panic!("session not granted: {other:?}"),
        }
    }

    #[test]
    fn repeated_ticks_issue_one_request() {
        let mut rt = ManualRuntime::new();
        let session = open(&mut rt);
        let mut ch = HitTestChannel::default();
        for _ in 0..10 {
            ch.ensure_requested(&session, &mut rt);
            ch.advance(&session, &mut rt);
        }
        assert_eq!(ch.phase(), ChannelPhase::Requesting);
        assert_eq!(rt.counts().reference_spaces, 1);
        assert_eq!(rt.counts().hit_test_sources, 0);
    }

    #[test]
    fn two_steps_chain_to_ready() {
        let mut rt = ManualRuntime::new();
        let session = open(&mut rt);
        let mut ch = HitTestChannel::default();
        assert!(ch.ensure_requested(&session, &mut rt));
        assert!(rt.resolve_reference_space());
        assert_eq!(ch.advance(&session, &mut rt), ChannelPhase::Requesting);
        assert_eq!(rt.counts().hit_test_sources, 1);
        assert!(rt.resolve_hit_test_source());
        assert_eq!(ch.advance(&session, &mut rt), ChannelPhase::Ready);
        assert!(ch.source().is_some());
    }

    #[test]
    fn rejected_step_fails_without_retry() {
        let mut rt = ManualRuntime::new();
        let session = open(&mut rt);
        let mut ch = HitTestChannel::default();
        ch.ensure_requested(&session, &mut rt);
        rt.reject_reference_space(XrError::Runtime("no tracking".into()));
        assert_eq!(ch.advance(&session, &mut rt), ChannelPhase::Failed);
        for _ in 0..5 {
            assert!(!ch.ensure_requested(&session, &mut rt));
            ch.advance(&session, &mut rt);
        }
        assert_eq!(rt.counts().reference_spaces, 1);
        assert!(ch.failure().is_some());
    }

    #[test]
    fn teardown_resets_guard_and_drops_pending() {
        let mut rt = ManualRuntime::new();
        let first = open(&mut rt);
        let mut ch = HitTestChannel::default();
        ch.ensure_requested(&first, &mut rt);
        ch.on_session_end();
        assert_eq!(ch.phase(), ChannelPhase::TornDown);
        assert!(!ch.is_requested());
        // The old request can no longer be delivered.
        assert!(!rt.resolve_reference_space());

        rt.end_active_session();
        let second = open(&mut rt);
        assert!(ch.ensure_requested(&second, &mut rt));
        assert_eq!(rt.counts().reference_spaces, 2);
    }

    #[test]
    fn query_is_empty_unless_ready() {
        let mut rt = ManualRuntime::new();
        let session = open(&mut rt);
        let mut ch = HitTestChannel::default();
        let frame = XrFrame::new(session.id, 0.0);
        assert!(ch.query_hits(&frame).is_empty());
        ch.ensure_requested(&session, &mut rt);
        assert!(ch.query_hits(&frame).is_empty());
    }
}
