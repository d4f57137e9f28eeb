//! Component types and element shapes - the fixed accessor size tables.

use std::fmt;

/// Component storage type of an accessor, keyed by the glTF numeric code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ComponentType {
    /// Signed 8-bit integer (5120)
    Int8 = 5120,
    /// Unsigned 8-bit integer (5121)
    Uint8 = 5121,
    /// Signed 16-bit integer (5122)
    Int16 = 5122,
    /// Unsigned 16-bit integer (5123)
    Uint16 = 5123,
    /// Unsigned 32-bit integer (5125)
    Uint32 = 5125,
    /// 32-bit floating point (5126)
    #[default]
    Float32 = 5126,
    /// 64-bit floating point (5130)
    Float64 = 5130,
}

impl ComponentType {
    /// All component types, in code order.
    pub const ALL: [Self; 7] = [
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Uint32,
        Self::Float32,
        Self::Float64,
    ];

    /// Look up a component type by its glTF code.
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            5120 => Some(Self::Int8),
            5121 => Some(Self::Uint8),
            5122 => Some(Self::Int16),
            5123 => Some(Self::Uint16),
            5125 => Some(Self::Uint32),
            5126 => Some(Self::Float32),
            5130 => Some(Self::Float64),
            _ => None,
        }
    }

    /// The glTF numeric code.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Byte width of a single component.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Uint32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Name of this type as it would appear in diagnostics.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

/// Element shape of an accessor - scalar, vector or matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementType {
    #[default]
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    /// All element shapes.
    pub const ALL: [Self; 7] = [
        Self::Scalar,
        Self::Vec2,
        Self::Vec3,
        Self::Vec4,
        Self::Mat2,
        Self::Mat3,
        Self::Mat4,
    ];

    /// Look up a shape by its glTF type string.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(Self::Scalar),
            "VEC2" => Some(Self::Vec2),
            "VEC3" => Some(Self::Vec3),
            "VEC4" => Some(Self::Vec4),
            "MAT2" => Some(Self::Mat2),
            "MAT3" => Some(Self::Mat3),
            "MAT4" => Some(Self::Mat4),
            _ => None,
        }
    }

    /// The glTF type string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }

    /// Number of components per element.
    #[inline]
    pub const fn num_components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// AccessorLayout describes how one element of accessor data is stored.
///
/// It combines a [`ComponentType`] with an [`ElementType`]. For example a
/// VEC3 of float32 has an element size of 12 bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AccessorLayout {
    /// Component storage type.
    pub component: ComponentType,
    /// Element shape.
    pub element: ElementType,
}

impl AccessorLayout {
    /// Create a layout from component and shape.
    #[inline]
    pub const fn new(component: ComponentType, element: ElementType) -> Self {
        Self { component, element }
    }

    /// Total size in bytes of one element.
    #[inline]
    pub const fn num_bytes(&self) -> usize {
        self.component.num_bytes() * self.element.num_components()
    }

    /// Number of components per element.
    #[inline]
    pub const fn num_components(&self) -> usize {
        self.element.num_components()
    }
}

impl fmt::Debug for AccessorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.element.name(), self.component.name())
    }
}

impl fmt::Display for AccessorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_codes_roundtrip() {
        for ct in ComponentType::ALL {
            assert_eq!(ComponentType::from_code(ct.code()), Some(ct));
        }
        assert_eq!(ComponentType::from_code(5124), None);
    }

    #[test]
    fn test_element_names_roundtrip() {
        for et in ElementType::ALL {
            assert_eq!(ElementType::from_name(et.name()), Some(et));
        }
        assert_eq!(ElementType::from_name("VEC5"), None);
    }

    #[test]
    fn test_layout_size_table() {
        // Every (component, shape) pair: element size = width * count.
        for ct in ComponentType::ALL {
            for et in ElementType::ALL {
                let layout = AccessorLayout::new(ct, et);
                assert_eq!(
                    layout.num_bytes(),
                    ct.num_bytes() * et.num_components(),
                    "{layout}"
                );
            }
        }
    }

    #[test]
    fn test_common_layouts() {
        let pos = AccessorLayout::new(ComponentType::Float32, ElementType::Vec3);
        assert_eq!(pos.num_bytes(), 12);
        let ibm = AccessorLayout::new(ComponentType::Float32, ElementType::Mat4);
        assert_eq!(ibm.num_bytes(), 64);
        let idx = AccessorLayout::new(ComponentType::Uint16, ElementType::Scalar);
        assert_eq!(idx.num_bytes(), 2);
    }
}
