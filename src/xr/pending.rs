// This file is part of AR Placement.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Promise-like handles for runtime requests.
//!
//! A runtime hands out a [`Pending`] and keeps the matching [`Resolver`]. The
//! consumer polls once per tick; nothing blocks. Dropping the resolver without
//! settling it surfaces as [`XrError::Dropped`], dropping the `Pending` makes any
//! later resolution a silent no-op.

use futures::channel::oneshot;
use std::task::Poll;

use super::error::XrError;

pub type XrResult<T> = Result<T, XrError>;

#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<XrResult<T>>,
}

#[derive(Debug)]
pub struct Resolver<T> {
    tx: oneshot::Sender<XrResult<T>>,
}

/// Create a linked resolver / pending pair.
pub fn pending<T>() -> (Resolver<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (Resolver { tx }, Pending { rx })
}

impl<T> Pending<T> {
    /// Already settled with `value`.
    pub fn ready(value: XrResult<T>) -> Self {
        let (resolver, pending) = pending();
        resolver.settle(value);
        pending
    }

    pub fn rejected(err: XrError) -> Self {
        Self::ready(Err(err))
    }

    /// Non-blocking check. Once this returns `Ready` the handle is spent.
    pub fn poll(&mut self) -> Poll<XrResult<T>> {
        match self.rx.try_recv() {
            Ok(Some(result)) => Poll::Ready(result),
            Ok(None) => Poll::Pending,
            Err(oneshot::Canceled) => Poll::Ready(Err(XrError::Dropped)),
        }
    }
}

impl<T> Resolver<T> {
    /// Returns false when the consumer already dropped its `Pending`.
    pub fn settle(self, value: XrResult<T>) -> bool {
        self.tx.send(value).is_ok()
    }

    pub fn resolve(self, value: T) -> bool {
        self.settle(Ok(value))
    }

    pub fn reject(self, err: XrError) -> bool {
        self.settle(Err(err))
    }

    pub fn is_abandoned(&self) -> bool {
        self.tx.is_canceled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_pending_until_resolved() {
        let (resolver, mut p) = pending::<u32>();
        assert!(p.poll().is_pending());
        assert!(p.poll().is_pending());
        assert!(resolver.resolve(7));
        assert_eq!(p.poll(), Poll::Ready(Ok(7)));
    }

    #[test]
    fn dropped_resolver_reports_dropped() {
        let (resolver, mut p) = pending::<u32>();
        drop(resolver);
        assert_eq!(p.poll(), Poll::Ready(Err(XrError::Dropped)));
    }

    #[test]
    fn resolving_after_consumer_gone_is_noop() {
        let (resolver, p) = pending::<u32>();
        drop(p);
        assert!(resolver.is_abandoned());
        assert!(!resolver.resolve(1));
    }
}
