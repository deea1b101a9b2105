// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("failed to persist event before fanout")]
    Persistence(#[from] amelia_store::StoreError),
}
