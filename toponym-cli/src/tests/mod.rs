//! Shared test harness modules for the toponym CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod check_unit;
mod helpers;
