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

//! Capabilities a producer of Arrow data implements to be consumed through
//! the [C Data Interface](https://arrow.apache.org/docs/format/CDataInterface.html)
//! and the [C Stream Interface](https://arrow.apache.org/docs/format/CStreamInterface.html).
//!
//! A consumer may pass a requested schema to ask for a specific layout. `None`
//! always means the producer's native layout, and a requested schema equal to
//! the native one is always satisfiable. Implementations usually resolve the
//! requested schema with [`negotiate`](crate::negotiate()).
//!
//! # Concurrency
//!
//! The traits do not require `Sync`. An implementation that hands out shared
//! buffers from immutable state, as every producer in this crate does, can be
//! exported from several threads at once; implementations that transfer
//! ownership of their buffers should document that they are not reentrant.

use arrow_schema::ffi::FFI_ArrowSchema;

use crate::error::Result;
use crate::handle::{ExportedArray, ExportedStream};

/// A value that can describe its native schema
pub trait ArrowSchemaExportable {
    /// Export the native schema of this value
    fn export_schema(&self) -> Result<FFI_ArrowSchema>;
}

/// A value that can be exported as a single array
pub trait ArrowArrayExportable {
    /// Export this value as one array and its schema.
    ///
    /// Fails with [`SchemaMismatch`](crate::ExchangeError::SchemaMismatch) if
    /// `requested_schema` cannot be satisfied and with
    /// [`ExportFailure`](crate::ExchangeError::ExportFailure) if building the
    /// exported structures fails. The exported buffers are shared with `self`
    /// and are never mutated by it.
    fn export_array(&self, requested_schema: Option<&FFI_ArrowSchema>) -> Result<ExportedArray>;
}

/// A value that can be exported as a stream of array chunks
pub trait ArrowStreamExportable {
    /// Export this value as a stream of chunks sharing one schema.
    ///
    /// Each call returns an independent stream: consuming one never affects
    /// another. Failures that can only be detected while producing a chunk
    /// are reported through the stream when that chunk is requested.
    fn export_stream(&self, requested_schema: Option<&FFI_ArrowSchema>)
        -> Result<ExportedStream>;
}
