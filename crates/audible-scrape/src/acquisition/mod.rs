// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page acquisition: get a URL loaded into a session whose product data
//! layer is populated, retrying with a growing budget when it is not.

pub mod controller;
pub mod policy;
pub mod wait;

pub use controller::{
    AcquisitionAttempt, AcquisitionController, AcquisitionState, AttemptOutcome, ReadyPage,
};
pub use policy::AcquisitionPolicy;
