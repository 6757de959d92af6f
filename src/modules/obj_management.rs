// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Modules 1:60, 1:61 and 1:62: copying, clearing and deleting graphics
//! objects in the foreground and background tables.

use crate::core::error::{HandlerError, RegistrationError};
use crate::core::machine::{GraphicsObject, ObjLayer, RLMachine};
use crate::core::module::OpModule;
use crate::core::operation::{void_op, OpHandler};
use crate::core::param::IntConstant;

fn copy_object(
    from: ObjLayer,
    to: ObjLayer,
) -> Result<Box<dyn OpHandler>, RegistrationError> {
    void_op::<(IntConstant, IntConstant), _>(move |machine, (source, dest)| {
        let object = machine.object(from, source)?.clone();
        machine.set_object(to, dest, object)
    })
}

fn for_each_object(
    machine: &mut RLMachine,
    layer: ObjLayer,
    indices: impl Iterator<Item = i32>,
    mut apply: impl FnMut(&mut GraphicsObject),
) -> Result<(), HandlerError> {
    for index in indices {
        apply(machine.object_mut(layer, index)?);
    }
    Ok(())
}

fn wipe_copy(layer: ObjLayer, on: bool) -> Result<[Box<dyn OpHandler>; 2], RegistrationError> {
    let single = void_op::<(IntConstant,), _>(move |machine, (index,)| {
        machine.object_mut(layer, index)?.wipe_copy = on;
        Ok(())
    })?;
    let counted = void_op::<(IntConstant, IntConstant), _>(move |machine, (first, count)| {
        for_each_object(machine, layer, first..first.saturating_add(count), |object| {
            object.wipe_copy = on;
        })
    })?;
    Ok([single, counted])
}

fn clear(layer: ObjLayer) -> Result<[Box<dyn OpHandler>; 2], RegistrationError> {
    let single = void_op::<(IntConstant,), _>(move |machine, (index,)| {
        machine.object_mut(layer, index)?.clear();
        Ok(())
    })?;
    let range = void_op::<(IntConstant, IntConstant), _>(move |machine, (first, last)| {
        for_each_object(machine, layer, first..=last, |object| object.clear())
    })?;
    Ok([single, range])
}

fn delete(layer: ObjLayer) -> Result<[Box<dyn OpHandler>; 2], RegistrationError> {
    let single = void_op::<(IntConstant,), _>(move |machine, (index,)| {
        machine.object_mut(layer, index)?.delete();
        Ok(())
    })?;
    let range = void_op::<(IntConstant, IntConstant), _>(move |machine, (first, last)| {
        for_each_object(machine, layer, first..=last, |object| object.delete())
    })?;
    Ok([single, range])
}

fn add_pair(
    module: &mut OpModule,
    opcode: u16,
    name: &str,
    [single, multiple]: [Box<dyn OpHandler>; 2],
) {
    module.add_opcode(opcode, 0, name, single);
    module.add_opcode(opcode, 1, name, multiple);
}

pub fn copy_fg_to_bg_module() -> Result<OpModule, RegistrationError> {
    let mut module = OpModule::new("ObjCopyFgToBg", 1, 60);
    module.add_opcode(
        2,
        0,
        "objCopyFgToBg",
        void_op::<(IntConstant,), _>(|machine, (index,)| {
            let object = machine.object(ObjLayer::Fg, index)?.clone();
            machine.set_object(ObjLayer::Bg, index, object)
        })?,
    );
    Ok(module)
}

fn layer_module(
    name: &str,
    module_number: u8,
    layer: ObjLayer,
    names: [&str; 6],
) -> Result<OpModule, RegistrationError> {
    let other = match layer {
        ObjLayer::Fg => ObjLayer::Bg,
        ObjLayer::Bg => ObjLayer::Fg,
    };
    let [copy_same, copy_other, wipe_on, wipe_off, clear_name, delete_name] = names;
    let (same_opcode, other_opcode) = match layer {
        ObjLayer::Fg => (2, 3),
        ObjLayer::Bg => (3, 2),
    };

    let mut module = OpModule::new(name, 1, module_number);
    module.add_opcode(same_opcode, 0, copy_same, copy_object(layer, layer)?);
    module.add_opcode(other_opcode, 0, copy_other, copy_object(layer, other)?);
    add_pair(&mut module, 4, wipe_on, wipe_copy(layer, true)?);
    add_pair(&mut module, 5, wipe_off, wipe_copy(layer, false)?);
    add_pair(&mut module, 10, clear_name, clear(layer)?);
    add_pair(&mut module, 11, delete_name, delete(layer)?);
    Ok(module)
}

pub fn fg_management_module() -> Result<OpModule, RegistrationError> {
    layer_module(
        "ObjFgManagement",
        61,
        ObjLayer::Fg,
        [
            "objCopy",
            "objCopyToBg",
            "objWipeCopyOn",
            "objWipeCopyOff",
            "objClear",
            "objDelete",
        ],
    )
}

pub fn bg_management_module() -> Result<OpModule, RegistrationError> {
    layer_module(
        "ObjBgManagement",
        62,
        ObjLayer::Bg,
        [
            "objBgCopy",
            "objBgCopyToFg",
            "objWipeCopyOn",
            "objWipeCopyOff",
            "objBgClear",
            "objBgDelete",
        ],
    )
}
