// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Bundled RealLive operation modules.

pub mod mem;
pub mod obj_management;
pub mod sel;
pub mod strings;
