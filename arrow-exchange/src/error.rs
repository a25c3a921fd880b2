// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Defines [`ExchangeError`] for representing failures at the exchange boundary

use arrow_schema::ArrowError;

/// A specialized `Result` for exchange errors
pub type Result<T, E = ExchangeError> = std::result::Result<T, E>;

/// Errors raised while exporting, importing or parsing exchange values
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The requested schema cannot be satisfied by the producer.
    ///
    /// Recoverable: the caller may request a different schema or accept the
    /// native layout by passing no requested schema.
    #[error("Requested schema {requested} is incompatible with native type {native}")]
    SchemaMismatch { requested: String, native: String },

    /// A lower level failure while building the exported structures
    #[error("Export failed: {source}")]
    ExportFailure { source: ArrowError },

    /// A string outside the closed set of area methods
    #[error(
        "Invalid area method '{value}', expected one of 'ellipsoidal', 'euclidean' or 'spherical'"
    )]
    InvalidMethod { value: String },

    /// Reading an exported handle back into native arrays failed
    #[error("Import failed: {source}")]
    Import { source: ArrowError },

    /// A producer was constructed from inconsistent parts
    #[error("Invalid data: {message}")]
    InvalidData { message: String },
}

impl ExchangeError {
    pub(crate) fn export(source: ArrowError) -> Self {
        Self::ExportFailure { source }
    }

    pub(crate) fn import(source: ArrowError) -> Self {
        Self::Import { source }
    }

    pub(crate) fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}

impl From<ExchangeError> for ArrowError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::ExportFailure { source } | ExchangeError::Import { source } => source,
            e @ ExchangeError::SchemaMismatch { .. } => ArrowError::SchemaError(e.to_string()),
            e @ (ExchangeError::InvalidMethod { .. } | ExchangeError::InvalidData { .. }) => {
                ArrowError::InvalidArgumentError(e.to_string())
            }
        }
    }
}
