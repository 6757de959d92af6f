// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Typed parameter markers layered over [`Descriptor`].
//!
//! Handlers declare their parameters as a tuple of marker types, e.g.
//! `(IntReference, Argc<IntConstant>)`. Each marker knows its runtime
//! descriptor and how to turn the extracted [`Value`] into a native type.

use std::marker::PhantomData;

use crate::core::descriptor::{Descriptor, Signature, Value, MAX_SPECIAL_ALTERNATIVES};
use crate::core::error::{DecodeError, RegistrationError};
use crate::core::memory::{IntMemRef, StrMemRef};

/// A single parameter slot.
pub trait Param {
    type Output;

    fn descriptor() -> Result<Descriptor, RegistrationError>;

    fn from_value(value: Value) -> Result<Self::Output, DecodeError>;
}

fn shape_error(expected: &'static str, value: &Value) -> DecodeError {
    DecodeError::ValueShape {
        expected,
        found: value.kind_name(),
    }
}

/// Integer expression, evaluated.
pub struct IntConstant;
/// String expression, evaluated.
pub struct StrConstant;
/// Integer memory location.
pub struct IntReference;
/// String memory location.
pub struct StrReference;

impl Param for IntConstant {
    type Output = i32;

    fn descriptor() -> Result<Descriptor, RegistrationError> {
        Ok(Descriptor::INT)
    }

    fn from_value(value: Value) -> Result<i32, DecodeError> {
        match value {
            Value::Int(v) => Ok(v),
            other => Err(shape_error("integer", &other)),
        }
    }
}

impl Param for StrConstant {
    type Output = String;

    fn descriptor() -> Result<Descriptor, RegistrationError> {
        Ok(Descriptor::STR)
    }

    fn from_value(value: Value) -> Result<String, DecodeError> {
        match value {
            Value::Str(v) => Ok(v),
            other => Err(shape_error("string", &other)),
        }
    }
}

impl Param for IntReference {
    type Output = IntMemRef;

    fn descriptor() -> Result<Descriptor, RegistrationError> {
        Ok(Descriptor::INT_REF)
    }

    fn from_value(value: Value) -> Result<IntMemRef, DecodeError> {
        match value {
            Value::IntRef(loc) => Ok(loc),
            other => Err(shape_error("integer reference", &other)),
        }
    }
}

impl Param for StrReference {
    type Output = StrMemRef;

    fn descriptor() -> Result<Descriptor, RegistrationError> {
        Ok(Descriptor::STR_REF)
    }

    fn from_value(value: Value) -> Result<StrMemRef, DecodeError> {
        match value {
            Value::StrRef(loc) => Ok(loc),
            other => Err(shape_error("string reference", &other)),
        }
    }
}

/// Every remaining operand, each read as `P`.
pub struct Argc<P>(PhantomData<P>);

impl<P: Param> Param for Argc<P> {
    type Output = Vec<P::Output>;

    fn descriptor() -> Result<Descriptor, RegistrationError> {
        Ok(Descriptor::argc(P::descriptor()?))
    }

    fn from_value(value: Value) -> Result<Self::Output, DecodeError> {
        match value {
            Value::List(items) => items.into_iter().map(<P as Param>::from_value).collect(),
            other => Err(shape_error("list", &other)),
        }
    }
}

/// A `{...}` tuple operand holding the parameters of `L`.
pub struct Complex<L>(PhantomData<L>);

impl<L: ParamList> Param for Complex<L> {
    type Output = L::Output;

    fn descriptor() -> Result<Descriptor, RegistrationError> {
        Ok(Descriptor::Complex(L::descriptors()?))
    }

    fn from_value(value: Value) -> Result<Self::Output, DecodeError> {
        match value {
            Value::Tuple(items) => L::from_values(items),
            other => Err(shape_error("tuple", &other)),
        }
    }
}

/// Placeholder for an undeclared special alternative. Uninhabited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Empty {}

/// One slot of a [`Special`] parameter.
pub trait Alternative {
    type Output;

    fn alternative() -> Result<Option<Descriptor>, RegistrationError>;

    fn from_alternative(value: Value) -> Result<Self::Output, DecodeError>;
}

impl<P: Param> Alternative for P {
    type Output = P::Output;

    fn alternative() -> Result<Option<Descriptor>, RegistrationError> {
        P::descriptor().map(Some)
    }

    fn from_alternative(value: Value) -> Result<Self::Output, DecodeError> {
        <P as Param>::from_value(value)
    }
}

impl Alternative for Empty {
    type Output = Empty;

    fn alternative() -> Result<Option<Descriptor>, RegistrationError> {
        Ok(None)
    }

    fn from_alternative(value: Value) -> Result<Empty, DecodeError> {
        Err(shape_error("nothing", &value))
    }
}

/// Overloaded operand with up to five alternatives.
pub struct Special<A, B = Empty, C = Empty, D = Empty, E = Empty>(PhantomData<(A, B, C, D, E)>);

/// Result of a [`Special`] parameter: the alternative selected by the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overload<A, B = Empty, C = Empty, D = Empty, E = Empty> {
    First(A),
    Second(B),
    Third(C),
    Fourth(D),
    Fifth(E),
}

impl<A, B, C, D, E> Overload<A, B, C, D, E> {
    pub fn tag(&self) -> u8 {
        match self {
            Overload::First(_) => 0,
            Overload::Second(_) => 1,
            Overload::Third(_) => 2,
            Overload::Fourth(_) => 3,
            Overload::Fifth(_) => 4,
        }
    }
}

impl<A, B, C, D, E> Param for Special<A, B, C, D, E>
where
    A: Alternative,
    B: Alternative,
    C: Alternative,
    D: Alternative,
    E: Alternative,
{
    type Output = Overload<A::Output, B::Output, C::Output, D::Output, E::Output>;

    fn descriptor() -> Result<Descriptor, RegistrationError> {
        let slots: [Option<Descriptor>; MAX_SPECIAL_ALTERNATIVES] = [
            A::alternative()?,
            B::alternative()?,
            C::alternative()?,
            D::alternative()?,
            E::alternative()?,
        ];
        let declared = slots.iter().take_while(|slot| slot.is_some()).count();
        if let Some(index) = slots[declared..].iter().position(Option::is_some) {
            return Err(RegistrationError::EmptySpecialAlternative {
                index: declared + index,
            });
        }
        Ok(Descriptor::Special(slots.into_iter().flatten().collect()))
    }

    fn from_value(value: Value) -> Result<Self::Output, DecodeError> {
        let (tag, value) = match value {
            Value::Overload { tag, value } => (tag, value),
            other => return Err(shape_error("overload", &other)),
        };
        match tag {
            0 => A::from_alternative(*value).map(Overload::First),
            1 => B::from_alternative(*value).map(Overload::Second),
            2 => C::from_alternative(*value).map(Overload::Third),
            3 => D::from_alternative(*value).map(Overload::Fourth),
            4 => E::from_alternative(*value).map(Overload::Fifth),
            _ => Err(DecodeError::OverloadTagOutOfRange {
                tag,
                alternatives: MAX_SPECIAL_ALTERNATIVES,
            }),
        }
    }
}

/// A fixed parameter list, implemented for tuples of [`Param`] types.
pub trait ParamList {
    type Output;

    fn descriptors() -> Result<Vec<Descriptor>, RegistrationError>;

    fn from_values(values: Vec<Value>) -> Result<Self::Output, DecodeError>;

    fn signature() -> Result<Signature, RegistrationError> {
        Signature::new(Self::descriptors()?)
    }
}

macro_rules! impl_param_list {
    ($len:expr; $($name:ident),*) => {
        impl<$($name: Param),*> ParamList for ($($name,)*) {
            type Output = ($(<$name as Param>::Output,)*);

            fn descriptors() -> Result<Vec<Descriptor>, RegistrationError> {
                Ok(vec![$(<$name as Param>::descriptor()?),*])
            }

            #[allow(unused_mut, unused_variables)]
            fn from_values(values: Vec<Value>) -> Result<Self::Output, DecodeError> {
                if values.len() != $len {
                    return Err(DecodeError::ValueCount {
                        expected: $len,
                        found: values.len(),
                    });
                }
                let mut values = values.into_iter();
                Ok(($(
                    <$name as Param>::from_value(values.next().ok_or(DecodeError::ValueCount {
                        expected: $len,
                        found: 0,
                    })?)?,
                )*))
            }
        }
    };
}

impl_param_list!(0;);
impl_param_list!(1; P1);
impl_param_list!(2; P1, P2);
impl_param_list!(3; P1, P2, P3);
impl_param_list!(4; P1, P2, P3, P4);
impl_param_list!(5; P1, P2, P3, P4, P5);
impl_param_list!(6; P1, P2, P3, P4, P5, P6);
