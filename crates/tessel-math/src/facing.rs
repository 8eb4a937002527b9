//! The six axis-aligned facings a mesh face can point in.

use glam::{IVec3, Vec3};

use crate::packed_normal::pack_normal;

/// One of the six cardinal directions.
///
/// Meshes store a facing per face as a byte where 0 means "no facing" and
/// `1..=6` is [`Facing::mesh_data_index`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Facing {
    /// −Z direction.
    North = 0,
    /// +X direction.
    East = 1,
    /// +Z direction.
    South = 2,
    /// −X direction.
    West = 3,
    /// +Y direction.
    Up = 4,
    /// −Y direction.
    Down = 5,
}

impl Facing {
    /// All six facings in index order.
    pub const ALL: [Facing; 6] = [
        Self::North,
        Self::East,
        Self::South,
        Self::West,
        Self::Up,
        Self::Down,
    ];

    /// Returns the facing index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the facing for an index in `0..6`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The per-face byte stored in a mesh: `index + 1`, leaving 0 for "none".
    pub fn mesh_data_index(self) -> u8 {
        self as u8 + 1
    }

    /// Decodes a per-face byte. Returns `None` for 0 and for values above 6.
    pub fn from_mesh_data_index(value: u8) -> Option<Self> {
        match value {
            0 => None,
            v => Self::from_index(v as usize - 1),
        }
    }

    /// Integer unit normal.
    pub fn normal_i(self) -> IVec3 {
        match self {
            Self::North => IVec3::NEG_Z,
            Self::East => IVec3::X,
            Self::South => IVec3::Z,
            Self::West => IVec3::NEG_X,
            Self::Up => IVec3::Y,
            Self::Down => IVec3::NEG_Y,
        }
    }

    /// Float unit normal.
    pub fn normal(self) -> Vec3 {
        self.normal_i().as_vec3()
    }

    /// The unit normal in the packed `2_10_10_10` layout.
    pub fn packed_normal(self) -> u32 {
        pack_normal(self.normal())
    }

    /// Returns the opposite facing.
    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Axis this facing lies on: 0=X, 1=Y, 2=Z.
    pub fn axis(self) -> usize {
        match self {
            Self::East | Self::West => 0,
            Self::Up | Self::Down => 1,
            Self::North | Self::South => 2,
        }
    }

    /// Quantizes an arbitrary direction to the facing with the largest dot product.
    ///
    /// Ties resolve to the earliest facing in [`Facing::ALL`]; a zero vector
    /// therefore yields [`Facing::North`].
    pub fn from_vector(v: Vec3) -> Self {
        let mut best = Self::North;
        let mut best_dot = f32::NEG_INFINITY;
        for facing in Self::ALL {
            let dot = facing.normal().dot(v);
            if dot > best_dot {
                best = facing;
                best_dot = dot;
            }
        }
        best
    }
}
