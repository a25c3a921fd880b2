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

//! The geometric model selected for area computations

use std::fmt;
use std::str::FromStr;

use crate::error::ExchangeError;

/// Default value for the `method` parameter of area operations
pub const DEFAULT_AREA_METHOD: AreaMethod = AreaMethod::Euclidean;

/// Selects the geometric model used by area and signed-area operations.
///
/// The string forms are exact and case-sensitive:
///
/// ```
/// # use arrow_exchange::AreaMethod;
/// let method: AreaMethod = "spherical".parse().unwrap();
/// assert_eq!(method, AreaMethod::Spherical);
/// assert!("Spherical".parse::<AreaMethod>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaMethod {
    /// Geodesic area on the WGS84 ellipsoid.
    Ellipsoidal,
    /// Planar area in the coordinate units of the input.
    Euclidean,
    /// Chamberlain-Duquette approximation on a sphere.
    Spherical,
}

impl AreaMethod {
    /// Every accepted method, in the order of their string forms
    pub const ALL: [AreaMethod; 3] = [
        AreaMethod::Ellipsoidal,
        AreaMethod::Euclidean,
        AreaMethod::Spherical,
    ];

    /// Returns the string accepted by [`FromStr`] for this method
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaMethod::Ellipsoidal => "ellipsoidal",
            AreaMethod::Euclidean => "euclidean",
            AreaMethod::Spherical => "spherical",
        }
    }
}

impl Default for AreaMethod {
    fn default() -> Self {
        DEFAULT_AREA_METHOD
    }
}

impl fmt::Display for AreaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AreaMethod {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ellipsoidal" => Ok(AreaMethod::Ellipsoidal),
            "euclidean" => Ok(AreaMethod::Euclidean),
            "spherical" => Ok(AreaMethod::Spherical),
            _ => Err(ExchangeError::InvalidMethod {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<&str> for AreaMethod {
    type Error = ExchangeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            "ellipsoidal".parse::<AreaMethod>().unwrap(),
            AreaMethod::Ellipsoidal
        );
        assert_eq!(
            "euclidean".parse::<AreaMethod>().unwrap(),
            AreaMethod::Euclidean
        );
        assert_eq!(
            AreaMethod::try_from("spherical").unwrap(),
            AreaMethod::Spherical
        );
    }

    #[test]
    fn test_parse_invalid() {
        for s in [
            "",
            "Euclidean",
            "EUCLIDEAN",
            " euclidean",
            "euclidean ",
            "geodesic",
            "planar",
            "chamberlain_duquette",
        ] {
            let err = s.parse::<AreaMethod>().unwrap_err();
            match err {
                ExchangeError::InvalidMethod { value } => assert_eq!(value, s),
                other => panic!("expected InvalidMethod, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_display_round_trip() {
        for method in AreaMethod::ALL {
            assert_eq!(method.to_string().parse::<AreaMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_default() {
        assert_eq!(AreaMethod::default(), AreaMethod::Euclidean);
    }
}
