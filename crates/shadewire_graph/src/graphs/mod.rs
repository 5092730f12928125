// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node registries built on the core framework.

pub mod arithmetic;
