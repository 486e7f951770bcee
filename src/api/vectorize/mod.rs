// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Vectorize API Module
//!
//! POST /vectorize and POST /vectorize/batch, returning embeddings from the
//! loaded sentence transformer.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{vectorize_batch_handler, vectorize_handler};
pub use request::{BatchVectorizeRequest, VectorizeRequest};
pub use response::{BatchVectorResponse, VectorResponse};
