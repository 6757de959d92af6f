// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Library entry exposing the dispatch core, bundled modules, and CLI helpers.
pub mod cli;
pub mod core;
pub mod modules;
pub mod registry_defaults;
