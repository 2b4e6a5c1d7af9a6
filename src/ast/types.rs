//! Value types of the script language.
//!
//! The lattice is deliberately small: five scalar-ish types, arrays, and the
//! `Empty` element type carried only by the empty array (and the empty
//! string, which the language treats as the same value). There is no
//! subtyping beyond the absorption of `Array(Empty)` and the widening of
//! heterogeneous arrays to `Array(Any)`.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Type {
    Real,
    Char,
    Bool,
    String,
    Array(Box<Type>),
    #[default]
    Any,
    Empty,
}

impl Type {
    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    /// The type of `[]` and `""`.
    pub fn empty_array() -> Type {
        Type::array(Type::Empty)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    /// Arrays and strings; the latter is an array of characters at runtime.
    pub fn is_array_like(&self) -> bool {
        matches!(self, Type::Array(_) | Type::String)
    }

    pub fn is_empty_array(&self) -> bool {
        matches!(self, Type::Array(element) if **element == Type::Empty)
    }

    /// Element type produced by indexing a value of this type.
    pub fn element(&self) -> Type {
        match self {
            Type::Array(element) if **element != Type::Empty => (**element).clone(),
            Type::String => Type::Char,
            _ => Type::Any,
        }
    }

    /// Unifies two types, never failing.
    ///
    /// Equal types unify to themselves, `Array(Empty)` is absorbed by any
    /// other array-like type, and everything else falls back to `Array(Any)`.
    pub fn unify(&self, other: &Type) -> Type {
        if self == other {
            return self.clone();
        }

        if self.is_empty_array() && other.is_array_like() {
            return other.clone();
        }

        if other.is_empty_array() && self.is_array_like() {
            return self.clone();
        }

        Type::array(Type::Any)
    }

    /// Element type of an array literal built from elements of these types.
    ///
    /// Homogeneous elements keep their type and `Array(Empty)` elements are
    /// absorbed by other array-like ones. Any other mismatch widens to `Any`.
    /// No elements yields `Empty`.
    pub fn unify_elements<'a, I>(types: I) -> Type
    where
        I: IntoIterator<Item = &'a Type>,
    {
        let mut types = types.into_iter();
        let Some(first) = types.next() else {
            return Type::Empty;
        };

        let mut element = first.clone();
        for ty in types {
            if *ty == element {
                continue;
            }
            if ty.is_empty_array() && element.is_array_like() {
                continue;
            }
            if element.is_empty_array() && ty.is_array_like() {
                element = ty.clone();
                continue;
            }
            return Type::Any;
        }

        element
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Real => write!(f, "real"),
            Type::Char => write!(f, "char"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Array(element) => write!(f, "{}[]", element),
            Type::Any => write!(f, "any"),
            Type::Empty => write!(f, "empty"),
        }
    }
}
