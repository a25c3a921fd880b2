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

//! Exchange of Arrow arrays and streams over the
//! [Arrow C Data Interface](https://arrow.apache.org/docs/format/CDataInterface.html).
//!
//! A producer of Arrow data implements one or more capabilities:
//!
//! * [`ArrowArrayExportable`]: export as a single array and its schema
//! * [`ArrowStreamExportable`]: export as a stream of array chunks
//! * [`ArrowSchemaExportable`]: export only the schema
//!
//! Consumers may pass a requested schema to ask for a layout other than the
//! producer's native one; [`negotiate()`] implements the resolution every
//! producer in this crate uses, casting when [`ExportOptions`] allow it.
//!
//! ```
//! # use std::sync::Arc;
//! # use arrow_array::{ArrayRef, Int32Array};
//! # use arrow_exchange::{ArrowStreamExportable, ExportableChunkedArray};
//! let chunks: Vec<ArrayRef> = vec![
//!     Arc::new(Int32Array::from(vec![1, 2])),
//!     Arc::new(Int32Array::from(vec![3])),
//! ];
//! let producer = ExportableChunkedArray::from_array_refs(chunks).unwrap();
//!
//! let reader = producer.export_stream(None).unwrap().into_array_reader().unwrap();
//! assert_eq!(reader.count(), 2);
//! ```
//!
//! [`AreaMethod`] is the closed set of geometric models accepted by area
//! operations receiving such data.

pub mod area;
pub mod capability;
pub mod error;
pub mod handle;
pub mod input;
pub mod negotiate;
pub mod options;
pub mod producer;
pub mod stream;

pub use area::AreaMethod;
pub use capability::{ArrowArrayExportable, ArrowSchemaExportable, ArrowStreamExportable};
pub use error::{ExchangeError, Result};
pub use handle::{ExportedArray, ExportedStream};
pub use input::AnyArrayInput;
pub use negotiate::{negotiate, Negotiated};
pub use options::ExportOptions;
pub use producer::{
    ExportableArray, ExportableChunkedArray, ExportableRecordBatch, ExportableTable,
};
pub use stream::{ArrayIterator, ArrayReader, ArrowArrayStreamArrayReader};
