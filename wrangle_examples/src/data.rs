// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small in-memory sample tables in the shape of the NYC flights data.

use anyhow::{Context, Result};
use wrangle_core::{Table, table};

/// A dozen flights with the usual delay/time columns; some delays missing.
pub(crate) fn flights() -> Result<Table> {
    table! {
        "year" => [2013; 12],
        "month" => [1, 1, 1, 1, 1, 2, 2, 2, 3, 3, 3, 3],
        "day" => [1, 1, 1, 2, 2, 1, 1, 3, 1, 1, 2, 2],
        "carrier" => ["UA", "AA", "B6", "UA", "DL", "AA", "UA", "B6", "DL", "UA", "AA", "OO"],
        "origin" => [
            "EWR", "LGA", "JFK", "EWR", "LGA", "JFK", "EWR", "JFK", "LGA", "EWR", "LGA", "EWR",
        ],
        "dest" => [
            "IAH", "MIA", "BQN", "ORD", "ATL", "MIA", "IAH", "BQN", "ATL", "SFO", "ORD", "CLE",
        ],
        "dep_delay" => [
            Some(2.0), Some(4.0), Some(-1.0), Some(-6.0), None, Some(101.0),
            Some(0.0), Some(-3.0), Some(25.0), Some(13.0), None, Some(-2.0),
        ],
        "arr_delay" => [
            Some(11.0), Some(20.0), Some(-18.0), Some(-25.0), None, Some(92.0),
            Some(-4.0), Some(-10.0), Some(19.0), Some(7.0), None, Some(-8.0),
        ],
        "air_time" => [
            Some(227.0), Some(160.0), Some(183.0), Some(116.0), None, Some(150.0),
            Some(225.0), Some(190.0), Some(112.0), Some(345.0), None, Some(70.0),
        ],
        "distance" => [1400, 1089, 1576, 719, 762, 1089, 1400, 1576, 762, 2565, 733, 404],
    }
    .context("building flights table")
}

/// Carrier codes and names. `OO` has no entry.
pub(crate) fn airlines() -> Result<Table> {
    table! {
        "carrier" => ["9E", "AA", "B6", "DL", "UA"],
        "name" => [
            "Endeavor Air Inc.",
            "American Airlines Inc.",
            "JetBlue Airways",
            "Delta Air Lines Inc.",
            "United Air Lines Inc.",
        ],
    }
    .context("building airlines table")
}

/// Case counts in the "wide" layout: one column per year.
pub(crate) fn cases_wide() -> Result<Table> {
    table! {
        "country" => ["Afghanistan", "Brazil", "China"],
        "1999" => [745, 37737, 212258],
        "2000" => [2666, 80488, 213766],
    }
    .context("building cases table")
}
