use bitflags::bitflags;

use crate::intern::{Interner, Symbol};

bitflags! {
    /// Storage, qualifier, and matrix-majority modifier bits carried by types
    /// and variables. Majority bits are mutually exclusive on any finalized
    /// matrix type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u32 {
        const EXTERN          = 1 << 0;
        const NOINTERPOLATION = 1 << 1;
        const PRECISE         = 1 << 2;
        const SHARED          = 1 << 3;
        const GROUPSHARED     = 1 << 4;
        const STATIC          = 1 << 5;
        const UNIFORM         = 1 << 6;
        const VOLATILE        = 1 << 7;
        const CONST           = 1 << 8;
        const ROW_MAJOR       = 1 << 9;
        const COLUMN_MAJOR    = 1 << 10;
        const IN              = 1 << 11;
        const OUT             = 1 << 12;
    }
}

impl Modifiers {
    pub const MAJORITY: Modifiers = Modifiers::ROW_MAJOR.union(Modifiers::COLUMN_MAJOR);

    /// Bits legal on a typedef: qualifiers and majority, never storage.
    pub const TYPE_MODIFIERS: Modifiers = Modifiers::CONST
        .union(Modifiers::VOLATILE)
        .union(Modifiers::PRECISE)
        .union(Modifiers::MAJORITY);

    /// Storage-class bits forbidden on local variables.
    pub const NON_LOCAL: Modifiers = Modifiers::EXTERN
        .union(Modifiers::SHARED)
        .union(Modifiers::GROUPSHARED)
        .union(Modifiers::UNIFORM);

    /// Bits that participate in type identity comparisons.
    const IDENTITY: Modifiers = Modifiers::CONST.union(Modifiers::MAJORITY);

    /// Human-readable name of the lowest set bit, for diagnostics.
    pub fn describe_first(&self) -> &'static str {
        if self.contains(Modifiers::EXTERN) {
            "extern"
        } else if self.contains(Modifiers::NOINTERPOLATION) {
            "nointerpolation"
        } else if self.contains(Modifiers::PRECISE) {
            "precise"
        } else if self.contains(Modifiers::SHARED) {
            "shared"
        } else if self.contains(Modifiers::GROUPSHARED) {
            "groupshared"
        } else if self.contains(Modifiers::STATIC) {
            "static"
        } else if self.contains(Modifiers::UNIFORM) {
            "uniform"
        } else if self.contains(Modifiers::VOLATILE) {
            "volatile"
        } else if self.contains(Modifiers::CONST) {
            "const"
        } else if self.contains(Modifiers::ROW_MAJOR) {
            "row_major"
        } else if self.contains(Modifiers::COLUMN_MAJOR) {
            "column_major"
        } else if self.contains(Modifiers::IN) {
            "in"
        } else if self.contains(Modifiers::OUT) {
            "out"
        } else {
            "<none>"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Scalar,
    Vector,
    Matrix,
    Array,
    Struct,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Float,
    Half,
    Double,
    Int,
    Uint,
    Bool,
    Void,
    Sampler,
    Texture,
    String,
    PixelShader,
    VertexShader,
}

impl BaseType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            BaseType::Float
                | BaseType::Half
                | BaseType::Double
                | BaseType::Int
                | BaseType::Uint
                | BaseType::Bool
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, BaseType::Int | BaseType::Uint | BaseType::Bool)
    }

    /// Promotion rank for arithmetic: the operand with the higher rank wins.
    fn rank(&self) -> u32 {
        match self {
            BaseType::Bool => 0,
            BaseType::Int => 1,
            BaseType::Uint => 2,
            BaseType::Half => 3,
            BaseType::Float => 4,
            BaseType::Double => 5,
            _ => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BaseType::Float => "float",
            BaseType::Half => "half",
            BaseType::Double => "double",
            BaseType::Int => "int",
            BaseType::Uint => "uint",
            BaseType::Bool => "bool",
            BaseType::Void => "void",
            BaseType::Sampler => "sampler",
            BaseType::Texture => "texture",
            BaseType::String => "string",
            BaseType::PixelShader => "pixelshader",
            BaseType::VertexShader => "vertexshader",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerDim {
    Generic,
    Dim1D,
    Dim2D,
    Dim3D,
    Cube,
}

/// One member of a struct type. The register offset is the running sum of
/// the register footprints of the fields declared before it.
#[derive(Debug, Clone)]
pub struct StructField {
    pub name: Symbol,
    pub ty: TypeId,
    pub modifiers: Modifiers,
    pub semantic: Option<Symbol>,
    pub reg_offset: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Semantic descriptor for one HLSL type. Instances are owned by the
/// [`TypeRegistry`]; IR nodes and variables refer to them by [`TypeId`].
#[derive(Debug, Clone)]
pub struct Type {
    pub name: Option<Symbol>,
    pub class: TypeClass,
    pub base: BaseType,
    pub dimx: u32,
    pub dimy: u32,
    pub modifiers: Modifiers,
    pub sampler_dim: SamplerDim,
    pub element: Option<TypeId>,
    pub len: u32,
    pub fields: Vec<StructField>,
}

impl Type {
    pub fn numeric(class: TypeClass, base: BaseType, dimx: u32, dimy: u32) -> Self {
        Type {
            name: None,
            class,
            base,
            dimx,
            dimy,
            modifiers: Modifiers::empty(),
            sampler_dim: SamplerDim::Generic,
            element: None,
            len: 0,
            fields: Vec::new(),
        }
    }

    pub fn object(base: BaseType, sampler_dim: SamplerDim) -> Self {
        Type {
            name: None,
            class: TypeClass::Object,
            base,
            dimx: 1,
            dimy: 1,
            modifiers: Modifiers::empty(),
            sampler_dim,
            element: None,
            len: 0,
            fields: Vec::new(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.class,
            TypeClass::Scalar | TypeClass::Vector | TypeClass::Matrix
        ) && self.base.is_numeric()
    }

    pub fn is_scalar(&self) -> bool {
        self.dimx == 1 && self.dimy == 1
    }

    pub fn is_void(&self) -> bool {
        self.class == TypeClass::Object && self.base == BaseType::Void
    }

    pub fn has_majority(&self) -> bool {
        self.modifiers.intersects(Modifiers::MAJORITY)
    }
}

/// Owns every type descriptor of one compilation context.
pub struct TypeRegistry {
    types: Vec<Type>,
    float_ty: TypeId,
    int_ty: TypeId,
    uint_ty: TypeId,
    bool_ty: TypeId,
    void_ty: TypeId,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut reg = TypeRegistry {
            types: Vec::new(),
            float_ty: TypeId(0),
            int_ty: TypeId(0),
            uint_ty: TypeId(0),
            bool_ty: TypeId(0),
            void_ty: TypeId(0),
        };
        reg.float_ty = reg.alloc(Type::numeric(TypeClass::Scalar, BaseType::Float, 1, 1));
        reg.int_ty = reg.alloc(Type::numeric(TypeClass::Scalar, BaseType::Int, 1, 1));
        reg.uint_ty = reg.alloc(Type::numeric(TypeClass::Scalar, BaseType::Uint, 1, 1));
        reg.bool_ty = reg.alloc(Type::numeric(TypeClass::Scalar, BaseType::Bool, 1, 1));
        reg.void_ty = reg.alloc(Type::object(BaseType::Void, SamplerDim::Generic));
        reg
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.0 as usize]
    }

    pub fn float(&self) -> TypeId {
        self.float_ty
    }

    pub fn int(&self) -> TypeId {
        self.int_ty
    }

    pub fn uint(&self) -> TypeId {
        self.uint_ty
    }

    pub fn bool(&self) -> TypeId {
        self.bool_ty
    }

    pub fn void(&self) -> TypeId {
        self.void_ty
    }

    /// Unnamed scalar/vector/matrix type with the class implied by the dims.
    pub fn numeric(&mut self, base: BaseType, dimx: u32, dimy: u32) -> TypeId {
        let class = if dimy > 1 {
            TypeClass::Matrix
        } else if dimx > 1 {
            TypeClass::Vector
        } else {
            TypeClass::Scalar
        };
        self.alloc(Type::numeric(class, base, dimx, dimy))
    }

    pub fn array_of(&mut self, element: TypeId, len: u32) -> TypeId {
        let base = self.get(element).base;
        let mut ty = Type::numeric(TypeClass::Array, base, 1, 1);
        ty.element = Some(element);
        ty.len = len;
        self.alloc(ty)
    }

    /// Total scalar component count, the measure initializers and
    /// constructors are checked against.
    pub fn component_count(&self, id: TypeId) -> u32 {
        let ty = self.get(id);
        match ty.class {
            TypeClass::Scalar => 1,
            TypeClass::Vector => ty.dimx,
            TypeClass::Matrix => ty.dimx * ty.dimy,
            TypeClass::Array => match ty.element {
                Some(elem) => ty.len * self.component_count(elem),
                None => 0,
            },
            TypeClass::Struct => ty
                .fields
                .iter()
                .map(|f| self.component_count(f.ty))
                .sum(),
            TypeClass::Object => 0,
        }
    }

    /// Register footprint. For a matrix this is the row count when row-major
    /// and the column count otherwise.
    pub fn reg_size(&self, id: TypeId) -> u32 {
        let ty = self.get(id);
        match ty.class {
            TypeClass::Scalar | TypeClass::Vector | TypeClass::Object => 1,
            TypeClass::Matrix => {
                if ty.modifiers.contains(Modifiers::ROW_MAJOR) {
                    ty.dimy
                } else {
                    ty.dimx
                }
            }
            TypeClass::Array => match ty.element {
                Some(elem) => ty.len * self.reg_size(elem),
                None => 0,
            },
            TypeClass::Struct => ty.fields.iter().map(|f| self.reg_size(f.ty)).sum(),
        }
    }

    /// Assigns register offsets to `fields` as the running footprint sum.
    pub fn layout_fields(&self, fields: &mut [StructField]) {
        let mut offset = 0;
        for field in fields.iter_mut() {
            field.reg_offset = offset;
            offset += self.reg_size(field.ty);
        }
    }

    /// Structural type identity: class, base, dims, and the identity-relevant
    /// modifier subset must match; arrays and structs compare recursively.
    pub fn equal(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        let ta = self.get(a);
        let tb = self.get(b);
        if ta.class != tb.class {
            return false;
        }
        if ta.modifiers & Modifiers::IDENTITY != tb.modifiers & Modifiers::IDENTITY {
            return false;
        }
        match ta.class {
            TypeClass::Scalar | TypeClass::Vector | TypeClass::Matrix => {
                ta.base == tb.base && ta.dimx == tb.dimx && ta.dimy == tb.dimy
            }
            TypeClass::Array => {
                ta.len == tb.len
                    && match (ta.element, tb.element) {
                        (Some(ea), Some(eb)) => self.equal(ea, eb),
                        _ => false,
                    }
            }
            TypeClass::Struct => {
                ta.fields.len() == tb.fields.len()
                    && ta
                        .fields
                        .iter()
                        .zip(tb.fields.iter())
                        .all(|(fa, fb)| fa.name == fb.name && self.equal(fa.ty, fb.ty))
            }
            TypeClass::Object => ta.base == tb.base && ta.sampler_dim == tb.sampler_dim,
        }
    }

    /// Whether a value of `src` can be cast (explicitly or implicitly) to
    /// `dst`. Numeric casts allow broadcast from scalars, truncation to
    /// scalars and smaller shapes, and shape changes that preserve the
    /// component count. Everything else requires identical types.
    pub fn compatible(&self, src: TypeId, dst: TypeId) -> bool {
        if self.equal(src, dst) {
            return true;
        }
        let ts = self.get(src);
        let td = self.get(dst);
        if !ts.is_numeric() || !td.is_numeric() {
            return false;
        }
        if ts.is_scalar() || td.is_scalar() {
            return true;
        }
        match (ts.class, td.class) {
            (TypeClass::Vector, TypeClass::Vector) => td.dimx <= ts.dimx,
            (TypeClass::Matrix, TypeClass::Matrix) => td.dimx <= ts.dimx && td.dimy <= ts.dimy,
            _ => self.component_count(src) == self.component_count(dst),
        }
    }

    /// Common type of two numeric operands: the higher-ranked base, with
    /// scalars broadcasting to the other operand's shape. Returns `None`
    /// when either operand is non-numeric or the shapes cannot combine.
    pub fn common_numeric(&mut self, a: TypeId, b: TypeId) -> Option<TypeId> {
        let ta = self.get(a);
        let tb = self.get(b);
        if !ta.is_numeric() || !tb.is_numeric() {
            return None;
        }
        let base = if ta.base.rank() >= tb.base.rank() {
            ta.base
        } else {
            tb.base
        };
        let (dimx, dimy) = if ta.is_scalar() {
            (tb.dimx, tb.dimy)
        } else if tb.is_scalar() {
            (ta.dimx, ta.dimy)
        } else if ta.dimx == tb.dimx && ta.dimy == tb.dimy {
            (ta.dimx, ta.dimy)
        } else {
            return None;
        };
        Some(self.numeric(base, dimx, dimy))
    }

    /// Clone of `id` with `extra` modifier bits overlaid.
    pub fn with_modifiers(&mut self, id: TypeId, extra: Modifiers) -> TypeId {
        if extra.is_empty() {
            return id;
        }
        let mut ty = self.get(id).clone();
        ty.modifiers |= extra;
        self.alloc(ty)
    }

    /// Injects `default_majority` into a matrix type that carries neither
    /// majority bit. Non-matrix types pass through untouched.
    pub fn finalize_majority(&mut self, id: TypeId, default_majority: Modifiers) -> TypeId {
        let ty = self.get(id);
        if ty.class != TypeClass::Matrix || ty.has_majority() {
            return id;
        }
        self.with_modifiers(id, default_majority)
    }

    /// Renders a type for diagnostics, e.g. `const float2x2` or `struct S`.
    pub fn describe(&self, id: TypeId, interner: &Interner) -> String {
        let ty = self.get(id);
        let prefix = if ty.modifiers.contains(Modifiers::CONST) {
            "const "
        } else {
            ""
        };
        let body = match ty.class {
            TypeClass::Scalar => ty.base.name().to_string(),
            TypeClass::Vector => format!("{}{}", ty.base.name(), ty.dimx),
            TypeClass::Matrix => format!("{}{}x{}", ty.base.name(), ty.dimx, ty.dimy),
            TypeClass::Array => match ty.element {
                Some(elem) => format!("{}[{}]", self.describe(elem, interner), ty.len),
                None => "<array>".to_string(),
            },
            TypeClass::Struct => match ty.name {
                Some(name) => format!("struct {}", interner.resolve(name)),
                None => "<anonymous struct>".to_string(),
            },
            TypeClass::Object => match ty.name {
                Some(name) => interner.resolve(name).to_string(),
                None => ty.base.name().to_string(),
            },
        };
        format!("{}{}", prefix, body)
    }

    /// Builds every predefined numeric type plus the object types and legacy
    /// aliases, returning (name, id) pairs for insertion into the global
    /// scope's type map.
    pub fn seed_predefined(&mut self, interner: &mut Interner) -> Vec<(Symbol, TypeId)> {
        const BASES: [BaseType; 6] = [
            BaseType::Float,
            BaseType::Half,
            BaseType::Double,
            BaseType::Int,
            BaseType::Uint,
            BaseType::Bool,
        ];
        let mut seeded = Vec::new();
        let mut push = |reg: &mut TypeRegistry,
                        interner: &mut Interner,
                        name: String,
                        mut ty: Type| {
            let sym = interner.intern(&name);
            ty.name = Some(sym);
            let id = reg.alloc(ty);
            seeded.push((sym, id));
            id
        };

        let mut float4 = TypeId(0);
        let mut float4x4 = TypeId(0);
        let mut int_scalar = TypeId(0);
        let mut float_scalar = TypeId(0);
        for base in BASES {
            let id = push(
                self,
                interner,
                base.name().to_string(),
                Type::numeric(TypeClass::Scalar, base, 1, 1),
            );
            if base == BaseType::Int {
                int_scalar = id;
            }
            if base == BaseType::Float {
                float_scalar = id;
            }
            for x in 1..=4u32 {
                let class = if x == 1 {
                    TypeClass::Scalar
                } else {
                    TypeClass::Vector
                };
                let id = push(
                    self,
                    interner,
                    format!("{}{}", base.name(), x),
                    Type::numeric(class, base, x, 1),
                );
                if base == BaseType::Float && x == 4 {
                    float4 = id;
                }
            }
            for x in 1..=4u32 {
                for y in 1..=4u32 {
                    let id = push(
                        self,
                        interner,
                        format!("{}{}x{}", base.name(), x, y),
                        Type::numeric(TypeClass::Matrix, base, x, y),
                    );
                    if base == BaseType::Float && x == 4 && y == 4 {
                        float4x4 = id;
                    }
                }
            }
        }

        let objects: [(&str, BaseType, SamplerDim); 10] = [
            ("void", BaseType::Void, SamplerDim::Generic),
            ("sampler", BaseType::Sampler, SamplerDim::Generic),
            ("sampler1D", BaseType::Sampler, SamplerDim::Dim1D),
            ("sampler2D", BaseType::Sampler, SamplerDim::Dim2D),
            ("sampler3D", BaseType::Sampler, SamplerDim::Dim3D),
            ("samplerCUBE", BaseType::Sampler, SamplerDim::Cube),
            ("texture", BaseType::Texture, SamplerDim::Generic),
            ("string", BaseType::String, SamplerDim::Generic),
            ("pixelshader", BaseType::PixelShader, SamplerDim::Generic),
            ("vertexshader", BaseType::VertexShader, SamplerDim::Generic),
        ];
        let mut texture = TypeId(0);
        let mut string_ty = TypeId(0);
        let mut pixelshader = TypeId(0);
        let mut vertexshader = TypeId(0);
        for (name, base, dim) in objects {
            let id = push(self, interner, name.to_string(), Type::object(base, dim));
            match base {
                BaseType::Texture => texture = id,
                BaseType::String => string_ty = id,
                BaseType::PixelShader => pixelshader = id,
                BaseType::VertexShader => vertexshader = id,
                _ => {}
            }
        }

        // Legacy effect-framework aliases share the canonical descriptors.
        let aliases: [(&str, TypeId); 8] = [
            ("DWORD", int_scalar),
            ("FLOAT", float_scalar),
            ("VECTOR", float4),
            ("MATRIX", float4x4),
            ("STRING", string_ty),
            ("TEXTURE", texture),
            ("PIXELSHADER", pixelshader),
            ("VERTEXSHADER", vertexshader),
        ];
        for (name, id) in aliases {
            let sym = interner.intern(name);
            seeded.push((sym, id));
        }

        seeded
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_component_count_is_one() {
        let reg = TypeRegistry::new();
        assert_eq!(reg.component_count(reg.float()), 1);
    }

    #[test]
    fn matrix_component_count_is_product_of_dims() {
        let mut reg = TypeRegistry::new();
        let m = reg.numeric(BaseType::Float, 3, 2);
        assert_eq!(reg.component_count(m), 6);
    }

    #[test]
    fn array_component_count_multiplies_length() {
        let mut reg = TypeRegistry::new();
        let v = reg.numeric(BaseType::Float, 4, 1);
        let arr = reg.array_of(v, 3);
        assert_eq!(reg.component_count(arr), 12);
    }

    #[test]
    fn reg_size_of_row_major_matrix_is_row_count() {
        let mut reg = TypeRegistry::new();
        let m = reg.numeric(BaseType::Float, 4, 2);
        let rm = reg.with_modifiers(m, Modifiers::ROW_MAJOR);
        assert_eq!(reg.reg_size(rm), 2);
    }

    #[test]
    fn reg_size_of_column_major_matrix_is_column_count() {
        let mut reg = TypeRegistry::new();
        let m = reg.numeric(BaseType::Float, 4, 2);
        let cm = reg.with_modifiers(m, Modifiers::COLUMN_MAJOR);
        assert_eq!(reg.reg_size(cm), 4);
    }

    #[test]
    fn finalize_majority_injects_default_once() {
        let mut reg = TypeRegistry::new();
        let m = reg.numeric(BaseType::Float, 2, 2);
        let finalized = reg.finalize_majority(m, Modifiers::COLUMN_MAJOR);
        assert!(reg.get(finalized).has_majority());
        // Already-finalized types pass through unchanged.
        assert_eq!(reg.finalize_majority(finalized, Modifiers::ROW_MAJOR), finalized);
    }

    #[test]
    fn equal_ignores_storage_but_honors_const() {
        let mut reg = TypeRegistry::new();
        let f = reg.float();
        let f_uniform = reg.with_modifiers(f, Modifiers::UNIFORM);
        let f_const = reg.with_modifiers(f, Modifiers::CONST);
        assert!(reg.equal(f, f_uniform));
        assert!(!reg.equal(f, f_const));
    }

    #[test]
    fn equal_compares_vector_dims() {
        let mut reg = TypeRegistry::new();
        let v2 = reg.numeric(BaseType::Float, 2, 1);
        let v3 = reg.numeric(BaseType::Float, 3, 1);
        let v3b = reg.numeric(BaseType::Float, 3, 1);
        assert!(!reg.equal(v2, v3));
        assert!(reg.equal(v3, v3b));
    }

    #[test]
    fn scalar_is_compatible_with_any_numeric_shape() {
        let mut reg = TypeRegistry::new();
        let f = reg.float();
        let v4 = reg.numeric(BaseType::Float, 4, 1);
        let m22 = reg.numeric(BaseType::Float, 2, 2);
        assert!(reg.compatible(f, v4));
        assert!(reg.compatible(v4, f));
        assert!(reg.compatible(f, m22));
    }

    #[test]
    fn vector_truncation_is_compatible_widening_is_not() {
        let mut reg = TypeRegistry::new();
        let v2 = reg.numeric(BaseType::Float, 2, 1);
        let v4 = reg.numeric(BaseType::Float, 4, 1);
        assert!(reg.compatible(v4, v2));
        assert!(!reg.compatible(v2, v4));
    }

    #[test]
    fn matrix_vector_cast_requires_matching_component_count() {
        let mut reg = TypeRegistry::new();
        let v4 = reg.numeric(BaseType::Float, 4, 1);
        let m22 = reg.numeric(BaseType::Float, 2, 2);
        let m23 = reg.numeric(BaseType::Float, 2, 3);
        assert!(reg.compatible(v4, m22));
        assert!(!reg.compatible(v4, m23));
    }

    #[test]
    fn struct_types_are_not_castable_to_numeric() {
        let mut reg = TypeRegistry::new();
        let mut interner = Interner::new();
        let name = interner.intern("S");
        let f = reg.float();
        let mut ty = Type::numeric(TypeClass::Struct, BaseType::Void, 1, 1);
        ty.class = TypeClass::Struct;
        ty.name = Some(name);
        ty.fields = vec![StructField {
            name: interner.intern("a"),
            ty: f,
            modifiers: Modifiers::empty(),
            semantic: None,
            reg_offset: 0,
        }];
        let s = reg.alloc(ty);
        let v4 = reg.numeric(BaseType::Float, 4, 1);
        assert!(!reg.compatible(s, v4));
        assert!(!reg.compatible(v4, s));
    }

    #[test]
    fn common_numeric_promotes_int_to_float() {
        let mut reg = TypeRegistry::new();
        let i = reg.int();
        let f = reg.float();
        let common = reg.common_numeric(i, f).unwrap();
        assert_eq!(reg.get(common).base, BaseType::Float);
        assert!(reg.get(common).is_scalar());
    }

    #[test]
    fn common_numeric_broadcasts_scalar_to_vector() {
        let mut reg = TypeRegistry::new();
        let f = reg.float();
        let v3 = reg.numeric(BaseType::Float, 3, 1);
        let common = reg.common_numeric(f, v3).unwrap();
        assert_eq!(reg.get(common).dimx, 3);
        assert_eq!(reg.get(common).class, TypeClass::Vector);
    }

    #[test]
    fn common_numeric_rejects_mismatched_vectors() {
        let mut reg = TypeRegistry::new();
        let v2 = reg.numeric(BaseType::Float, 2, 1);
        let v3 = reg.numeric(BaseType::Float, 3, 1);
        assert!(reg.common_numeric(v2, v3).is_none());
    }

    #[test]
    fn seed_registers_scalar_vector_matrix_names() {
        let mut reg = TypeRegistry::new();
        let mut interner = Interner::new();
        let seeded = reg.seed_predefined(&mut interner);
        let find = |name: &str| {
            let sym = interner.lookup(name).expect(name);
            seeded.iter().find(|(s, _)| *s == sym).map(|(_, id)| *id)
        };
        let f4 = find("float4").expect("float4 seeded");
        assert_eq!(reg.get(f4).class, TypeClass::Vector);
        assert_eq!(reg.get(f4).dimx, 4);
        let m = find("half3x2").expect("half3x2 seeded");
        assert_eq!(reg.get(m).class, TypeClass::Matrix);
        assert_eq!(reg.get(m).dimx, 3);
        assert_eq!(reg.get(m).dimy, 2);
        let s = find("bool1").expect("bool1 seeded");
        assert_eq!(reg.get(s).class, TypeClass::Scalar);
    }

    #[test]
    fn seed_registers_legacy_aliases() {
        let mut reg = TypeRegistry::new();
        let mut interner = Interner::new();
        let seeded = reg.seed_predefined(&mut interner);
        let find = |name: &str| {
            let sym = interner.lookup(name).expect(name);
            seeded.iter().find(|(s, _)| *s == sym).map(|(_, id)| *id)
        };
        let vec = find("VECTOR").expect("VECTOR seeded");
        assert_eq!(reg.get(vec).class, TypeClass::Vector);
        assert_eq!(reg.get(vec).dimx, 4);
        let dword = find("DWORD").expect("DWORD seeded");
        assert_eq!(reg.get(dword).base, BaseType::Int);
        let tex = find("TEXTURE").expect("TEXTURE seeded");
        assert_eq!(reg.get(tex).base, BaseType::Texture);
    }

    #[test]
    fn layout_fields_accumulates_register_offsets() {
        let mut reg = TypeRegistry::new();
        let mut interner = Interner::new();
        let f = reg.float();
        let m = reg.numeric(BaseType::Float, 4, 3);
        let rm = reg.with_modifiers(m, Modifiers::ROW_MAJOR);
        let mut fields = vec![
            StructField {
                name: interner.intern("a"),
                ty: f,
                modifiers: Modifiers::empty(),
                semantic: None,
                reg_offset: 0,
            },
            StructField {
                name: interner.intern("b"),
                ty: rm,
                modifiers: Modifiers::empty(),
                semantic: None,
                reg_offset: 0,
            },
            StructField {
                name: interner.intern("c"),
                ty: f,
                modifiers: Modifiers::empty(),
                semantic: None,
                reg_offset: 0,
            },
        ];
        reg.layout_fields(&mut fields);
        assert_eq!(fields[0].reg_offset, 0);
        assert_eq!(fields[1].reg_offset, 1);
        // row_major 4x3 occupies dimy = 3 registers
        assert_eq!(fields[2].reg_offset, 4);
    }

    #[test]
    fn describe_renders_const_prefix_and_shape() {
        let mut reg = TypeRegistry::new();
        let interner = Interner::new();
        let m = reg.numeric(BaseType::Float, 2, 3);
        let cm = reg.with_modifiers(m, Modifiers::CONST);
        assert_eq!(reg.describe(cm, &interner), "const float2x3");
        assert_eq!(reg.describe(reg.int(), &interner), "int");
    }
}
