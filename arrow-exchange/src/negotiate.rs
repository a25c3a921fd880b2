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

//! Resolves a consumer's requested schema against a producer's native field

use std::sync::Arc;

use arrow_array::ArrayRef;
use arrow_cast::{can_cast_types, cast_with_options, CastOptions};
use arrow_schema::ffi::FFI_ArrowSchema;
use arrow_schema::{ArrowError, DataType, Field, FieldRef};
use tracing::debug;

use crate::error::{ExchangeError, Result};
use crate::options::ExportOptions;

/// The layout a producer exports after negotiation
#[derive(Debug, Clone)]
pub enum Negotiated {
    /// Export the native data unchanged
    Native(FieldRef),
    /// Cast the native data to the data type of `field`
    Cast {
        field: FieldRef,
        cast_options: CastOptions<'static>,
    },
}

impl Negotiated {
    /// The field describing the exported data
    pub fn field(&self) -> &FieldRef {
        match self {
            Negotiated::Native(field) => field,
            Negotiated::Cast { field, .. } => field,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Negotiated::Native(_))
    }

    /// Converts one array of the native type to the negotiated layout
    pub fn apply(&self, array: ArrayRef) -> std::result::Result<ArrayRef, ArrowError> {
        match self {
            Negotiated::Native(_) => Ok(array),
            Negotiated::Cast {
                field,
                cast_options,
            } => cast_with_options(&array, field.data_type(), cast_options),
        }
    }
}

/// Decides how data of the `native` field is exported given the consumer's
/// optional `requested` schema.
///
/// * no requested schema, or one with the native data type: [`Negotiated::Native`]
/// * a castable data type while `options` allow casting: [`Negotiated::Cast`],
///   keeping the native field's name and metadata. The field becomes nullable
///   when the cast options are `safe`, as unconvertible values turn into nulls
/// * anything else, including a requested schema that cannot be decoded or a
///   struct whose children are named or ordered differently:
///   [`ExchangeError::SchemaMismatch`]
pub fn negotiate(
    native: &FieldRef,
    requested: Option<&FFI_ArrowSchema>,
    options: &ExportOptions,
) -> Result<Negotiated> {
    let Some(requested) = requested else {
        return Ok(Negotiated::Native(native.clone()));
    };

    let requested = Field::try_from(requested).map_err(|e| ExchangeError::SchemaMismatch {
        requested: format!("<undecodable: {e}>"),
        native: native.data_type().to_string(),
    })?;

    if requested.data_type() == native.data_type() {
        debug!(data_type = %native.data_type(), "requested schema matches native schema");
        return Ok(Negotiated::Native(native.clone()));
    }

    if options.allow_cast()
        && struct_names_match(native.data_type(), requested.data_type())
        && can_cast_types(native.data_type(), requested.data_type())
    {
        debug!(
            from = %native.data_type(),
            to = %requested.data_type(),
            "casting to requested schema"
        );
        let nullable = native.is_nullable() || options.cast_options().safe;
        let field = native
            .as_ref()
            .clone()
            .with_data_type(requested.data_type().clone())
            .with_nullable(nullable);
        return Ok(Negotiated::Cast {
            field: Arc::new(field),
            cast_options: options.cast_options().clone(),
        });
    }

    Err(ExchangeError::SchemaMismatch {
        requested: requested.data_type().to_string(),
        native: native.data_type().to_string(),
    })
}

/// Returns false if a struct in `from` would be cast to a struct in `to` whose
/// children have different names or order.
///
/// The cast kernel pairs struct children by position, so such a cast would
/// export values under the wrong names.
fn struct_names_match(from: &DataType, to: &DataType) -> bool {
    match (from, to) {
        (DataType::Struct(from), DataType::Struct(to)) => {
            from.len() == to.len()
                && from.iter().zip(to.iter()).all(|(f, t)| {
                    f.name() == t.name() && struct_names_match(f.data_type(), t.data_type())
                })
        }
        (
            DataType::List(from) | DataType::LargeList(from) | DataType::FixedSizeList(from, _),
            DataType::List(to) | DataType::LargeList(to) | DataType::FixedSizeList(to, _),
        ) => struct_names_match(from.data_type(), to.data_type()),
        _ => true,
    }
}
