// Message types published by the runtime

use serde::{Deserialize, Serialize};

use crate::joint::{Joint, JointVector};

// Joint snapshot runtime -> zenoh, sent after every accepted command
// Named fields so subscribers don't depend on wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointState {
    pub base: u8,
    pub shoulder: u8,
    pub elbow: u8,
    pub wrist_rotation: u8,
    pub wrist_tilt: u8,
    pub gripper: u8,
}

impl From<&JointVector> for JointState {
    fn from(v: &JointVector) -> Self {
        Self {
            base: v.get(Joint::Base),
            shoulder: v.get(Joint::Shoulder),
            elbow: v.get(Joint::Elbow),
            wrist_rotation: v.get(Joint::WristRotation),
            wrist_tilt: v.get(Joint::WristTilt),
            gripper: v.get(Joint::Gripper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_uses_joint_names() {
        let state = JointState::from(&JointVector::START);
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["base"], 90);
        assert_eq!(json["wrist_tilt"], 90);
        assert_eq!(json["gripper"], 73);
    }
}
