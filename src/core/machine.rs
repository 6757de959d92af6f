// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Machine state mutated by operation handlers.

use std::collections::VecDeque;

use tracing::warn;

use crate::core::error::{EvalError, HandlerError};
use crate::core::expr::EvalContext;
use crate::core::memory::{IntMemRef, Memory, StrMemRef};

pub const OBJECTS_PER_LAYER: usize = 256;

/// Which graphics object table an operation addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjLayer {
    Fg,
    Bg,
}

impl ObjLayer {
    pub fn name(self) -> &'static str {
        match self {
            ObjLayer::Fg => "fg",
            ObjLayer::Bg => "bg",
        }
    }
}

/// State of one graphics object slot. Nothing is rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphicsObject {
    pub image: Option<String>,
    pub visible: bool,
    pub x: i32,
    pub y: i32,
    pub alpha: i32,
    pub wipe_copy: bool,
}

impl GraphicsObject {
    pub fn with_image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            visible: true,
            alpha: 255,
            ..Self::default()
        }
    }

    /// Reset every parameter along with the image.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drop the image, keeping position and flags.
    pub fn delete(&mut self) {
        self.image = None;
    }
}

/// User-facing collaborator consulted by selection operations.
pub trait System {
    /// Pick one of the displayed options, returning its index within `options`.
    fn select(&mut self, options: &[String]) -> usize;
}

/// A [`System`] that answers selections from a prepared queue.
///
/// When the queue runs dry the first option is chosen.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSystem {
    choices: VecDeque<usize>,
    shown: Vec<Vec<String>>,
}

impl ScriptedSystem {
    pub fn new(choices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
            shown: Vec::new(),
        }
    }

    /// Every option list presented so far, in order.
    pub fn shown(&self) -> &[Vec<String>] {
        &self.shown
    }
}

impl System for ScriptedSystem {
    fn select(&mut self, options: &[String]) -> usize {
        self.shown.push(options.to_vec());
        match self.choices.pop_front() {
            Some(choice) => choice,
            None => {
                warn!(options = options.len(), "no scripted choice left, picking the first option");
                0
            }
        }
    }
}

/// Interpreter state: memory banks, the store register, object tables, and
/// the external system.
pub struct RLMachine {
    memory: Memory,
    store_register: i32,
    fg_objects: Vec<GraphicsObject>,
    bg_objects: Vec<GraphicsObject>,
    system: Box<dyn System>,
    halted: bool,
}

impl Default for RLMachine {
    fn default() -> Self {
        Self::new(Box::new(ScriptedSystem::default()))
    }
}

impl RLMachine {
    pub fn new(system: Box<dyn System>) -> Self {
        Self {
            memory: Memory::new(),
            store_register: 0,
            fg_objects: vec![GraphicsObject::default(); OBJECTS_PER_LAYER],
            bg_objects: vec![GraphicsObject::default(); OBJECTS_PER_LAYER],
            system,
            halted: false,
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn get_int(&self, loc: IntMemRef) -> Result<i32, EvalError> {
        self.memory.get_int(loc)
    }

    pub fn set_int(&mut self, loc: IntMemRef, value: i32) -> Result<(), EvalError> {
        self.memory.set_int(loc, value)
    }

    pub fn get_str(&self, loc: StrMemRef) -> Result<&str, EvalError> {
        self.memory.get_str(loc)
    }

    pub fn set_str(&mut self, loc: StrMemRef, value: impl Into<String>) -> Result<(), EvalError> {
        self.memory.set_str(loc, value)
    }

    pub fn store_register(&self) -> i32 {
        self.store_register
    }

    pub fn set_store_register(&mut self, value: i32) {
        self.store_register = value;
    }

    pub fn system_mut(&mut self) -> &mut dyn System {
        self.system.as_mut()
    }

    pub fn objects(&self, layer: ObjLayer) -> &[GraphicsObject] {
        match layer {
            ObjLayer::Fg => &self.fg_objects,
            ObjLayer::Bg => &self.bg_objects,
        }
    }

    pub fn object(&self, layer: ObjLayer, index: i32) -> Result<&GraphicsObject, HandlerError> {
        let slot = object_slot(layer, index)?;
        Ok(&self.objects(layer)[slot])
    }

    pub fn object_mut(
        &mut self,
        layer: ObjLayer,
        index: i32,
    ) -> Result<&mut GraphicsObject, HandlerError> {
        let slot = object_slot(layer, index)?;
        let table = match layer {
            ObjLayer::Fg => &mut self.fg_objects,
            ObjLayer::Bg => &mut self.bg_objects,
        };
        Ok(&mut table[slot])
    }

    pub fn set_object(
        &mut self,
        layer: ObjLayer,
        index: i32,
        object: GraphicsObject,
    ) -> Result<(), HandlerError> {
        *self.object_mut(layer, index)? = object;
        Ok(())
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn halt(&mut self) {
        self.halted = true;
    }
}

fn object_slot(layer: ObjLayer, index: i32) -> Result<usize, HandlerError> {
    usize::try_from(index)
        .ok()
        .filter(|slot| *slot < OBJECTS_PER_LAYER)
        .ok_or_else(|| {
            HandlerError::failed(format!(
                "object {index} is outside the {} layer (size {OBJECTS_PER_LAYER})",
                layer.name()
            ))
        })
}

impl EvalContext for RLMachine {
    fn int_value(&self, loc: IntMemRef) -> Result<i32, EvalError> {
        self.memory.get_int(loc)
    }

    fn str_value(&self, loc: StrMemRef) -> Result<String, EvalError> {
        self.memory.get_str(loc).map(str::to_string)
    }

    fn store_register(&self) -> i32 {
        self.store_register
    }
}
