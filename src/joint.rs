// Joint vector and the controller's position store
//
// A JointVector can only be built through validating constructors, so every
// value that reaches the store or the driver is already in 0..=180.

use std::fmt;

use crate::error::RangeError;

pub const JOINT_COUNT: usize = 6;

pub const MIN_ANGLE: u8 = 0;
pub const MAX_ANGLE: u8 = 180;

/// Arm joints in wire order (S1..S6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Base,
    Shoulder,
    Elbow,
    WristRotation,
    WristTilt,
    Gripper,
}

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Base,
        Joint::Shoulder,
        Joint::Elbow,
        Joint::WristRotation,
        Joint::WristTilt,
        Joint::Gripper,
    ];

    /// Joint addressed by a 1-based wire index
    pub fn from_index(index: i64) -> Result<Self, RangeError> {
        match index {
            1..=6 => Ok(Self::ALL[(index - 1) as usize]),
            _ => Err(RangeError::Index { value: index }),
        }
    }

    /// 1-based wire index
    pub fn index(self) -> usize {
        self.slot() + 1
    }

    /// 0-based slot in a JointVector
    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Joint::Base => "base",
            Joint::Shoulder => "shoulder",
            Joint::Elbow => "elbow",
            Joint::WristRotation => "wrist_rotation",
            Joint::WristTilt => "wrist_tilt",
            Joint::Gripper => "gripper",
        }
    }
}

/// Validate a single angle
pub fn angle(value: i64) -> Result<u8, RangeError> {
    if (MIN_ANGLE as i64..=MAX_ANGLE as i64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(RangeError::Angle { value })
    }
}

/// Full arm pose: one angle per joint, all within 0..=180
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointVector([u8; JOINT_COUNT]);

impl JointVector {
    /// Pose the arm holds after power-up
    pub const START: JointVector = JointVector([90, 90, 90, 90, 90, 73]);

    // Presets used by the desktop client
    pub const HOME: JointVector = JointVector([90, 90, 90, 90, 90, 90]);
    pub const REST: JointVector = JointVector([0, 0, 0, 90, 90, 0]);
    pub const WORK: JointVector = JointVector([90, 45, 135, 90, 90, 90]);

    /// Build from raw integers, rejecting the whole vector if any angle is out of range
    pub fn new(values: [i64; JOINT_COUNT]) -> Result<Self, RangeError> {
        let mut angles = [0u8; JOINT_COUNT];
        for (slot, &value) in angles.iter_mut().zip(values.iter()) {
            *slot = angle(value)?;
        }
        Ok(Self(angles))
    }

    pub fn get(&self, joint: Joint) -> u8 {
        self.0[joint.slot()]
    }

    /// Copy of this vector with one joint replaced
    pub fn with(mut self, joint: Joint, angle: u8) -> Result<Self, RangeError> {
        if angle > MAX_ANGLE {
            return Err(RangeError::Angle {
                value: angle as i64,
            });
        }
        self.0[joint.slot()] = angle;
        Ok(self)
    }

    pub fn as_array(&self) -> [u8; JOINT_COUNT] {
        self.0
    }

    /// Largest per-joint angle change between two poses
    pub fn max_delta(&self, other: &JointVector) -> u8 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| a.abs_diff(b))
            .max()
            .unwrap_or(0)
    }
}

impl Default for JointVector {
    fn default() -> Self {
        Self::START
    }
}

/// Comma separated, in wire order: `90,90,90,90,90,73`
impl fmt::Display for JointVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a},{b},{c},{d},{e},{g}")
    }
}

/// The arm's current pose, owned by the controller
///
/// Nothing else holds a mutable reference to it; motion code only assigns a
/// fully validated vector, and only once a move has completed.
#[derive(Debug, Default)]
pub struct PositionStore {
    current: JointVector,
}

impl PositionStore {
    pub fn new(initial: JointVector) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> JointVector {
        self.current
    }

    pub fn set(&mut self, target: JointVector) {
        self.current = target;
    }
}
