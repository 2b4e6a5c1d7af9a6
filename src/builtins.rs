//! Host-provided functions and constants.
//!
//! The host runtime exposes a fixed set of functions and constants to every
//! script. The parser seeds the global name table with them so the analyzer
//! and the checker resolve them like any other definition.

use crate::ast::{statements::Definition, types::Type};

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinFunc {
    pub name: String,
    pub arity: usize,
    pub ret_type: Type,
    /// Calling the function has no observable side effect.
    pub pure: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinConst {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltinTable {
    pub functions: Vec<BuiltinFunc>,
    pub constants: Vec<BuiltinConst>,
}

impl BuiltinTable {
    /// A table with no host definitions at all.
    pub fn empty() -> Self {
        BuiltinTable::default()
    }

    /// The host set available to stage, enemy, shot and player scripts.
    pub fn standard() -> Self {
        let mut table = BuiltinTable::empty();

        // Math
        for name in ["sin", "cos", "tan", "asin", "acos", "atan", "log", "log10"] {
            table.function(name, 1, Type::Real, true);
        }
        for name in ["absolute", "floor", "ceil", "round", "truncate", "trunc"] {
            table.function(name, 1, Type::Real, true);
        }
        for name in ["atan2", "min", "max", "power", "modc"] {
            table.function(name, 2, Type::Real, true);
        }
        table.function("length", 1, Type::Real, true);

        // Conversion
        table.function("ToString", 1, Type::String, true);
        table.function("IntToString", 1, Type::String, true);
        table.function("rtos", 2, Type::String, true);
        table.function("vtos", 2, Type::String, true);
        table.function("atoi", 1, Type::Real, true);
        table.function("ator", 1, Type::Real, true);

        // Arrays
        table.function("erase", 2, Type::array(Type::Any), true);
        table.function("append", 2, Type::array(Type::Any), true);
        table.function("slice", 3, Type::array(Type::Any), true);

        // Host state readers
        table.function("GetPlayerX", 0, Type::Real, true);
        table.function("GetPlayerY", 0, Type::Real, true);
        table.function("GetCommonData", 2, Type::Any, true);

        // Host effects
        table.function("rand", 2, Type::Real, false);
        table.function("WriteLog", 1, Type::Any, false);
        table.function("SetCommonData", 2, Type::Any, false);
        table.function("CreateShotA1", 6, Type::Real, false);
        table.function("ObjMove_SetPosition", 3, Type::Any, false);
        table.function("Obj_Delete", 1, Type::Any, false);
        table.function("CloseScript", 1, Type::Any, false);

        table.constant("true", Type::Bool);
        table.constant("false", Type::Bool);
        table.constant("pi", Type::Real);

        table
    }

    pub fn function(&mut self, name: &str, arity: usize, ret_type: Type, pure: bool) -> &mut Self {
        self.functions.push(BuiltinFunc {
            name: name.to_string(),
            arity,
            ret_type,
            pure,
        });
        self
    }

    pub fn constant(&mut self, name: &str, ty: Type) -> &mut Self {
        self.constants.push(BuiltinConst {
            name: name.to_string(),
            ty,
        });
        self
    }

    /// Definitions to place in the global name table.
    pub fn definitions(&self) -> impl Iterator<Item = Definition> + '_ {
        let functions = self.functions.iter().map(|func| Definition::BuiltInFunc {
            name: func.name.clone(),
            arity: func.arity,
            ret_type: func.ret_type.clone(),
            pure: func.pure,
        });
        let constants = self.constants.iter().map(|constant| Definition::Const {
            name: constant.name.clone(),
            ty: constant.ty.clone(),
        });

        functions.chain(constants)
    }
}
