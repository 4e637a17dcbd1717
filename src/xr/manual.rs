// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Runtime whose acquisition requests are settled by the caller.
//!
//! Hosts that receive runtime callbacks on their own schedule (and tests that
//! need exact control over when a request resolves) hold a clone of the
//! [`ManualRuntime`] handle and settle outstanding requests explicitly.
//! Capability queries and session requests settle immediately.

use bevy::prelude::*;
use std::sync::{Arc, Mutex, MutexGuard};

use super::error::XrError;
use super::pending::{pending, Pending, Resolver};
use super::runtime::XrRuntime;
use super::types::{
    FeatureName, FeatureSet, Hit, HitTestSource, HitTestSourceId, Pose, ReferenceSpace,
    ReferenceSpaceKind, SessionId, SessionInit, SessionMode, SpaceId, XrEvent, XrFrame, XrSession,
};

struct SpaceRequest {
    session: SessionId,
    kind: ReferenceSpaceKind,
    resolver: Resolver<ReferenceSpace>,
}

struct SourceRequest {
    session: SessionId,
    space: ReferenceSpace,
    resolver: Resolver<HitTestSource>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestCounts {
    pub sessions: usize,
    pub reference_spaces: usize,
    pub hit_test_sources: usize,
}

struct ManualState {
    supported: bool,
    features: FeatureSet,
    next_id: u64,
    active: Option<XrSession>,
    space_requests: Vec<SpaceRequest>,
    source_requests: Vec<SourceRequest>,
    sources: Vec<HitTestSource>,
    hits: Vec<Hit>,
    tracking: bool,
    viewer: Option<Pose>,
    events: Vec<XrEvent>,
    counts: RequestCounts,
}

impl ManualState {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Clone)]
pub struct ManualRuntime(Arc<Mutex<ManualState>>);

impl Default for ManualRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualRuntime {
    /// Supports immersive AR with hit-test, local-floor and dom-overlay.
    pub fn new() -> Self {
        Self::with_support(
            true,
            [FeatureName::HitTest, FeatureName::LocalFloor, FeatureName::DomOverlay].into_iter().collect(),
        )
    }

    pub fn unsupported() -> Self {
        Self::with_support(false, FeatureSet::new())
    }

    pub fn with_support(supported: bool, features: FeatureSet) -> Self {
        Self(Arc::new(Mutex::new(ManualState {
            supported,
            features,
            next_id: 1,
            active: None,
            space_requests: Vec::new(),
            source_requests: Vec::new(),
            sources: Vec::new(),
            hits: Vec::new(),
            tracking: true,
            viewer: None,
            events: Vec::new(),
            counts: RequestCounts::default(),
        })))
    }

    fn state(&self) -> MutexGuard<'_, ManualState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn counts(&self) -> RequestCounts {
        self.state().counts
    }

    pub fn active_session(&self) -> Option<XrSession> {
        self.state().active.clone()
    }

    pub fn outstanding_reference_spaces(&self) -> usize {
        self.state().space_requests.len()
    }

    pub fn outstanding_hit_test_sources(&self) -> usize {
        self.state().source_requests.len()
    }

    /// Settle the oldest reference-space request. The space origin is the
    /// tracking origin. Returns false if nothing was outstanding or the
    /// requester had already gone away.
    pub fn resolve_reference_space(&self) -> bool {
        let mut st = self.state();
        if st.space_requests.is_empty() {
            return false;
        }
        let req = st.space_requests.remove(0);
        let space = ReferenceSpace { id: SpaceId(st.next_id()), kind: req.kind, origin: Mat4::IDENTITY };
        req.resolver.resolve(space)
    }

    pub fn reject_reference_space(&self, err: XrError) -> bool {
        let mut st = self.state();
        if st.space_requests.is_empty() {
            return false;
        }
        st.space_requests.remove(0).resolver.reject(err)
    }

    pub fn resolve_hit_test_source(&self) -> bool {
        let mut st = self.state();
        if st.source_requests.is_empty() {
            return false;
        }
        let req = st.source_requests.remove(0);
        let source = HitTestSource { id: HitTestSourceId(st.next_id()), session: req.session, space: req.space };
        let delivered = req.resolver.resolve(source.clone());
        if delivered {
            st.sources.push(source);
        }
        delivered
    }

    pub fn reject_hit_test_source(&self, err: XrError) -> bool {
        let mut st = self.state();
        if st.source_requests.is_empty() {
            return false;
        }
        st.source_requests.remove(0).resolver.reject(err)
    }

    /// Hits reported to every live source on subsequent frames, in order.
    pub fn set_hits(&self, hits: Vec<Hit>) {
        self.state().hits = hits;
    }

    /// When false, `begin_frame` yields no tracking context (render-only ticks).
    pub fn set_tracking(&self, tracking: bool) {
        self.state().tracking = tracking;
    }

    pub fn set_viewer(&self, viewer: Option<Pose>) {
        self.state().viewer = viewer;
    }

    /// Runtime-initiated end (e.g. tracking lost, system UI closed the session).
    pub fn end_active_session(&self) {
        let mut st = self.state();
        if let Some(session) = st.active.take() {
            end_locked(&mut st, session.id);
        }
    }

    pub fn push_select(&self) {
        let mut st = self.state();
        if let Some(id) = st.active.as_ref().map(|s| s.id) {
            st.events.push(XrEvent::Select(id));
        }
    }
}

fn end_locked(st: &mut ManualState, id: SessionId) {
    st.sources.retain(|s| s.session != id);
    st.events.push(XrEvent::SessionEnded(id));
}

impl XrRuntime for ManualRuntime {
    fn name(&self) -> &str {
        "manual"
    }

    fn is_session_supported(&mut self, mode: SessionMode, required: &FeatureSet) -> Pending<bool> {
        let st = self.state();
        let ok = st.supported && mode == SessionMode::ImmersiveAr && required.is_subset(&st.features);
        Pending::ready(Ok(ok))
    }

    fn request_session(&mut self, init: &SessionInit) -> Pending<XrSession> {
        let mut st = self.state();
        st.counts.sessions += 1;
        if !st.supported {
            return Pending::rejected(XrError::NotSupported);
        }
        if let Some(missing) = init.required_features.iter().find(|f| !st.features.contains(*f)) {
            return Pending::rejected(XrError::FeatureUnsupported(*missing));
        }
        if st.active.is_some() {
            return Pending::rejected(XrError::Runtime("a session is already active".into()));
        }
        let optional: FeatureSet = init.optional_features.intersection(&st.features).copied().collect();
        let granted: FeatureSet = init.required_features.union(&optional).copied().collect();
        let id = SessionId(st.next_id());
        let render_space = ReferenceSpace {
            id: SpaceId(st.next_id()),
            kind: init.reference_space,
            origin: Mat4::IDENTITY,
        };
        let session = XrSession { id, mode: init.mode, granted_features: granted, render_space };
        st.active = Some(session.clone());
        Pending::ready(Ok(session))
    }

    fn request_reference_space(
        &mut self,
        session: &XrSession,
        kind: ReferenceSpaceKind,
    ) -> Pending<ReferenceSpace> {
        let mut st = self.state();
        st.counts.reference_spaces += 1;
        if st.active.as_ref().map(|s| s.id) != Some(session.id) {
            return Pending::rejected(XrError::SessionEnded(session.id));
        }
        let (resolver, pending) = pending();
        st.space_requests.push(SpaceRequest { session: session.id, kind, resolver });
        pending
    }

    fn request_hit_test_source(
        &mut self,
        session: &XrSession,
        space: &ReferenceSpace,
    ) -> Pending<HitTestSource> {
        let mut st = self.state();
        st.counts.hit_test_sources += 1;
        if st.active.as_ref().map(|s| s.id) != Some(session.id) {
            return Pending::rejected(XrError::SessionEnded(session.id));
        }
        if !session.has_feature(FeatureName::HitTest) {
            return Pending::rejected(XrError::FeatureUnsupported(FeatureName::HitTest));
        }
        let (resolver, pending) = pending();
        st.source_requests.push(SourceRequest { session: session.id, space: *space, resolver });
        pending
    }

    fn end_session(&mut self, session: &XrSession) {
        let mut st = self.state();
        if st.active.as_ref().map(|s| s.id) == Some(session.id) {
            st.active = None;
            end_locked(&mut st, session.id);
        }
    }

    fn begin_frame(&mut self, session: Option<&XrSession>, time: f64) -> Option<XrFrame> {
        let st = self.state();
        let session = session?;
        if !st.tracking || st.active.as_ref().map(|s| s.id) != Some(session.id) {
            return None;
        }
        let mut frame = XrFrame::new(session.id, time);
        if let Some(viewer) = st.viewer {
            frame = frame.with_viewer(viewer);
        }
        for source in st.sources.iter().filter(|s| s.session == session.id) {
            frame = frame.with_hits(source.id, st.hits.clone());
        }
        Some(frame)
    }

    fn drain_events(&mut self) -> Vec<XrEvent> {
        std::mem::take(&mut self.state().events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::task::Poll;

    #[test]
    fn request_counts_track_every_call() {
        let mut rt = ManualRuntime::new();
        let init = SessionInit {
            required_features: [FeatureName::HitTest].into_iter().collect(),
            ..Default::default()
        };
        let Poll::Ready(Ok(session)) = rt.request_session(&init).poll() else {
            panic!("session should settle immediately");
        };
        let mut space = rt.request_reference_space(&session, ReferenceSpaceKind::Viewer);
        assert!(space.poll().is_pending());
        assert!(rt.resolve_reference_space());
        assert!(matches!(space.poll(), Poll::Ready(Ok(s)) if s.kind == ReferenceSpaceKind::Viewer));
        assert_eq!(rt.counts().reference_spaces, 1);
        assert_eq!(rt.counts().sessions, 1);
    }

    #[test]
    fn unsupported_runtime_rejects_sessions() {
        let mut rt = ManualRuntime::unsupported();
        let mut p = rt.is_session_supported(SessionMode::ImmersiveAr, &FeatureSet::new());
        assert_eq!(p.poll(), Poll::Ready(Ok(false)));
        let mut s = rt.request_session(&SessionInit::default());
        assert_eq!(s.poll(), Poll::Ready(Err(XrError::NotSupported)));
    }
}
