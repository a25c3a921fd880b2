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

//! Options controlling how producers satisfy a requested schema

use arrow_cast::CastOptions;

/// Default value for [`ExportOptions::allow_cast`]
pub const DEFAULT_ALLOW_CAST: bool = true;

/// Options for exporting arrays and streams
///
/// ```
/// # use arrow_exchange::ExportOptions;
/// let options = ExportOptions::default().with_allow_cast(false);
/// assert!(!options.allow_cast());
/// ```
#[derive(Debug, Clone)]
pub struct ExportOptions {
    allow_cast: bool,
    cast_options: CastOptions<'static>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            allow_cast: DEFAULT_ALLOW_CAST,
            // a value that does not fit the requested type fails the export
            // instead of being replaced by null
            cast_options: CastOptions {
                safe: false,
                ..Default::default()
            },
        }
    }
}

impl ExportOptions {
    /// If `false`, a requested schema is only honoured when it matches the
    /// native layout exactly, anything else is a schema mismatch
    pub fn with_allow_cast(mut self, allow_cast: bool) -> Self {
        self.allow_cast = allow_cast;
        self
    }

    /// Overrides the options passed to the cast kernel
    pub fn with_cast_options(self, cast_options: CastOptions<'static>) -> Self {
        Self {
            cast_options,
            ..self
        }
    }

    /// Whether a differing requested schema may be satisfied by casting
    pub fn allow_cast(&self) -> bool {
        self.allow_cast
    }

    pub fn cast_options(&self) -> &CastOptions<'static> {
        &self.cast_options
    }
}
