// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use super::hit_test::{ChannelPhase, HitTestChannel};
use super::reticle::PlacementReticle;
use crate::xr::{SessionId, XrFrame, XrRuntime, XrSession};

/// Live session plus the entity its end observer is registered on.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub session: XrSession,
    pub entity: Entity,
}

/// Everything the frame loop mutates, owned in one place so nothing from one
/// session can leak into the next.
#[derive(Resource, Debug, Default)]
pub struct ArSessionContext {
    session: Option<ActiveSession>,
    hit_test: HitTestChannel,
    reticle: PlacementReticle,
    template: Option<Handle<Scene>>,
}

impl ArSessionContext {
    pub fn session(&self) -> Option<&ActiveSession> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.session.id)
    }

    pub fn hit_test(&self) -> &HitTestChannel {
        &self.hit_test
    }

    pub fn reticle(&self) -> &PlacementReticle {
        &self.reticle
    }

    /// Loaded template scene; None until the asset is ready.
    pub fn template(&self) -> Option<&Handle<Scene>> {
        self.template.as_ref()
    }

    pub fn set_template(&mut self, template: Handle<Scene>) {
        self.template = Some(template);
    }

    pub fn begin_session(&mut self, session: XrSession, entity: Entity) {
        if let Some(prev) = self.session.take() {
            warn!(
                target: "session",
                "ArSessionContext: session {} replaced before its end was observed",
                prev.session.id
            );
            self.hit_test.on_session_end();
        }
        self.reticle.hide();
        self.session = Some(ActiveSession { session, entity });
    }

    /// Tear down everything bound to `id`. Returns false for a session that is
    /// not the current one (already ended or never started).
    pub fn end_session(&mut self, id: SessionId) -> bool {
        if self.session_id() != Some(id) {
            return false;
        }
        self.session = None;
        self.hit_test.on_session_end();
        self.reticle.hide();
        true
    }

    /// One frame-loop step. Without a tracking context for the current session
    /// this is render-only and nothing changes.
    pub fn tick(&mut self, runtime: &mut dyn XrRuntime, frame: Option<&XrFrame>) -> ChannelPhase {
        let (Some(active), Some(frame)) = (self.session.as_ref(), frame) else {
            return self.hit_test.phase();
        };
        if frame.session != active.session.id {
            return self.hit_test.phase();
        }
        let session = &active.session;
        self.hit_test.ensure_requested(session, runtime);
        let phase = self.hit_test.advance(session, runtime);
        if phase == ChannelPhase::Ready {
            let hits = self.hit_test.query_hits(frame);
            self.reticle.update(hits, &session.render_space);
        }
        phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xr::{FeatureName, Hit, ManualRuntime, SessionInit};
    use std::task::Poll;

    fn start(rt: &mut ManualRuntime, ctx: &mut ArSessionContext) -> XrSession {
        let init = SessionInit {
            required_features: [FeatureName::HitTest].into_iter().collect(),
            ..Default::default()
        };
        let Poll::Ready(Ok(session)) = rt.request_session(&init).poll() else {
            panic!("session should be granted");
        };
        ctx.begin_session(session.clone(), Entity::PLACEHOLDER);
        session
    }

    fn frame(rt: &mut ManualRuntime, session: &XrSession) -> Option<XrFrame> {
        rt.begin_frame(Some(session), 0.0)
    }

    #[test]
    fn render_only_ticks_do_not_request() {
        let mut rt = ManualRuntime::new();
        let mut ctx = ArSessionContext::default();
        let _session = start(&mut rt, &mut ctx);
        for _ in 0..3 {
            ctx.tick(&mut rt, None);
        }
        assert_eq!(rt.counts().reference_spaces, 0);
        assert_eq!(ctx.hit_test().phase(), ChannelPhase::Uninitialized);
    }

    #[test]
    fn reticle_follows_hits_once_ready() {
        let mut rt = ManualRuntime::new();
        let mut ctx = ArSessionContext::default();
        let session = start(&mut rt, &mut ctx);
        rt.set_hits(vec![Hit::new(Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0)))]);

        let f = frame(&mut rt, &session);
        ctx.tick(&mut rt, f.as_ref());
        rt.resolve_reference_space();
        let f = frame(&mut rt, &session);
        ctx.tick(&mut rt, f.as_ref());
        rt.resolve_hit_test_source();
        // The source is registered now, so this frame carries its results.
        let f = frame(&mut rt, &session);
        assert_eq!(ctx.tick(&mut rt, f.as_ref()), ChannelPhase::Ready);
        assert!(ctx.reticle().visible);

        rt.set_hits(Vec::new());
        let f = frame(&mut rt, &session);
        ctx.tick(&mut rt, f.as_ref());
        assert!(!ctx.reticle().visible);
    }

    #[test]
    fn ending_a_foreign_session_is_ignored() {
        let mut rt = ManualRuntime::new();
        let mut ctx = ArSessionContext::default();
        let session = start(&mut rt, &mut ctx);
        assert!(!ctx.end_session(SessionId(session.id.0 + 100)));
        assert!(ctx.session().is_some());
        assert!(ctx.end_session(session.id));
        assert!(!ctx.end_session(session.id));
        assert_eq!(ctx.hit_test().phase(), ChannelPhase::TornDown);
    }
}
