// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A mounter that records what it is asked to do.

use umbra_core::backend::Mounter;
use umbra_core::error::MutationError;
use umbra_core::mounting::{MountingTransaction, ShadowView, StubViewTree};
use umbra_core::node::ShadowNode;

/// Records every transaction it applies and replays it onto a
/// [`StubViewTree`].
///
/// The first inconsistent instruction is kept in [`error`](Self::error);
/// later transactions are still recorded but no longer replayed.
#[derive(Debug)]
pub struct RecordingMounter {
    stub: StubViewTree,
    transactions: Vec<MountingTransaction>,
    error: Option<(u64, MutationError)>,
}

impl RecordingMounter {
    /// Creates a mounter whose mounted tree holds only `root`'s view.
    #[must_use]
    pub fn new(root: &ShadowNode) -> Self {
        Self {
            stub: StubViewTree::new(ShadowView::new(root)),
            transactions: Vec::new(),
            error: None,
        }
    }

    /// Returns the mounted tree.
    #[must_use]
    pub fn stub(&self) -> &StubViewTree {
        &self.stub
    }

    /// Returns every transaction applied so far, oldest first.
    #[must_use]
    pub fn transactions(&self) -> &[MountingTransaction] {
        &self.transactions
    }

    /// Returns the numbers of the transactions applied so far.
    #[must_use]
    pub fn numbers(&self) -> Vec<u64> {
        self.transactions.iter().map(|t| t.number).collect()
    }

    /// Returns the first inconsistency and the number of the transaction
    /// that caused it.
    #[must_use]
    pub fn error(&self) -> Option<&(u64, MutationError)> {
        self.error.as_ref()
    }
}

impl Mounter for RecordingMounter {
    fn apply(&mut self, transaction: &MountingTransaction) {
        self.transactions.push(transaction.clone());
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.stub.mutate(&transaction.mutations) {
            self.error = Some((transaction.number, error));
        }
    }
}
