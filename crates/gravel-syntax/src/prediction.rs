//! Shared memo of speculative parse decisions.
//!
//! Several grammar decisions (declaration vs expression, cast vs parenthesized
//! expression, ...) are resolved by scanning ahead. A decision that depended
//! on at most `prediction_window` tokens is keyed by those token kinds and
//! remembered process-wide, so later units skip the scan.
//!
//! Thread-safety contract: any number of fast-mode parses may hold the read
//! side at once. Each parse buffers what it learned and merges it through the
//! write side only after it released its read guard.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// `Type name ...` local declaration vs statement expression.
    LocalDeclaration,
    /// Script or block level method declaration vs statement.
    MethodDeclaration,
    /// `(Type) expr` vs parenthesized expression.
    Cast,
    /// `(params) -> body` vs parenthesized expression.
    Lambda,
    /// `{ params -> ...}` vs a closure with implicit parameters.
    ClosureParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PredictionKey {
    pub(crate) decision: Decision,
    pub(crate) window: Box<[SyntaxKind]>,
}

pub(crate) type PredictionTable = HashMap<PredictionKey, bool>;

#[derive(Debug, Clone, Default)]
pub struct PredictionCache {
    inner: Arc<RwLock<PredictionTable>>,
}

impl PredictionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, PredictionTable> {
        self.inner.read()
    }

    /// Merge predictions learned by one parse. Must not be called while the
    /// same thread holds a read guard.
    pub(crate) fn merge(&self, learned: PredictionTable) {
        if learned.is_empty() {
            return;
        }
        let mut table = self.inner.write();
        for (key, alt) in learned {
            table.entry(key).or_insert(alt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_first_prediction() {
        let cache = PredictionCache::new();
        let key = PredictionKey {
            decision: Decision::Cast,
            window: vec![SyntaxKind::LParen, SyntaxKind::IntKw, SyntaxKind::RParen].into(),
        };

        let mut learned = PredictionTable::new();
        learned.insert(key.clone(), true);
        cache.merge(learned);

        let mut again = PredictionTable::new();
        again.insert(key.clone(), false);
        cache.merge(again);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.read().get(&key), Some(&true));
    }

    #[test]
    fn clones_share_storage() {
        let cache = PredictionCache::new();
        let other = cache.clone();
        let mut learned = PredictionTable::new();
        learned.insert(
            PredictionKey {
                decision: Decision::Lambda,
                window: vec![SyntaxKind::LParen].into(),
            },
            false,
        );
        other.merge(learned);
        assert!(!cache.is_empty());
        cache.clear();
        assert!(other.is_empty());
    }
}
