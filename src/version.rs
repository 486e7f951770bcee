// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Kosera AI Service

/// Full version string with feature description
pub const VERSION: &str = "v1.1.0-batch-index-alignment-2025-11-02";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.1.0";

/// Build date
pub const BUILD_DATE: &str = "2025-11-02";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "single-vectorize",
    "batch-vectorize",
    "batch-index-alignment",
    "readiness-gating",
    "multilingual-embeddings",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Kosera AI Service {} ({})", VERSION_NUMBER, BUILD_DATE)
}
