// Keyboard teleop state
//
// Keys map to protocol commands against a locally tracked pose:
//   1-6  select joint          W/S  nudge selected joint up/down
//   R/F  bigger/smaller step   H/Z/T  home / rest / work preset
//   O/C  open/close gripper    M    smooth move to the tracked pose
//   P    save tracked pose     L    recall next saved pose
//   X    delete recalled pose  G/B  play / stop the saved poses as a sequence
//   Q    quit
//
// The pose is what we last asked for, not what the arm reports. While a
// sequence plays only B and Q are taken.

use std::time::{Duration, Instant};

use crate::config::SEQUENCE_STEP_DELAY;
use crate::joint::{Joint, JointVector, MAX_ANGLE, MIN_ANGLE};
use crate::poses::{Playback, PoseLibrary};
use crate::protocol::Command;

pub const STEP_SIZES: [u8; 3] = [1, 5, 15]; // degrees per nudge
pub const GRIPPER_OPEN: u8 = 0;
pub const GRIPPER_CLOSED: u8 = 180;

// Duration the desktop client uses for its smooth button
pub const TELEOP_SMOOTH_MS: u32 = 1500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send(Command),
    /// Library changed; the caller persists it
    Saved(String),
    Deleted(String),
    /// Sequence started with this many steps
    Playing(usize),
    Stopped,
    Finished,
    Quit,
    Nothing,
}

#[derive(Debug)]
pub struct Teleop {
    pose: JointVector,
    selected: Joint,
    step_idx: usize,
    library: PoseLibrary,
    // Saved pose the next L recalls
    cursor: usize,
    recalled: Option<String>,
    playback: Option<Playback>,
    step_delay: Duration,
}

impl Default for Teleop {
    fn default() -> Self {
        Self::new(JointVector::START)
    }
}

impl Teleop {
    pub fn new(pose: JointVector) -> Self {
        Self {
            pose,
            selected: Joint::Base,
            step_idx: 1,
            library: PoseLibrary::default(),
            cursor: 0,
            recalled: None,
            playback: None,
            step_delay: SEQUENCE_STEP_DELAY,
        }
    }

    pub fn with_library(mut self, library: PoseLibrary, step_delay: Duration) -> Self {
        self.library = library;
        self.step_delay = step_delay;
        self
    }

    pub fn library(&self) -> &PoseLibrary {
        &self.library
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    pub fn pose(&self) -> JointVector {
        self.pose
    }

    pub fn selected(&self) -> Joint {
        self.selected
    }

    pub fn step(&self) -> u8 {
        STEP_SIZES[self.step_idx]
    }

    pub fn on_key(&mut self, key: char) -> Action {
        let key = key.to_ascii_lowercase();
        if self.playback.is_some() {
            return match key {
                'b' => {
                    self.playback = None;
                    Action::Stopped
                }
                'q' => Action::Quit,
                _ => Action::Nothing,
            };
        }

        match key {
            c @ '1'..='6' => {
                if let Ok(joint) = Joint::from_index(c as i64 - '0' as i64) {
                    self.selected = joint;
                }
                Action::Nothing
            }
            'w' => self.nudge(true),
            's' => self.nudge(false),
            'r' => {
                self.step_idx = (self.step_idx + 1).min(STEP_SIZES.len() - 1);
                Action::Nothing
            }
            'f' => {
                self.step_idx = self.step_idx.saturating_sub(1);
                Action::Nothing
            }
            'h' => self.preset(JointVector::HOME),
            'z' => self.preset(JointVector::REST),
            't' => self.preset(JointVector::WORK),
            'o' => self.set(Joint::Gripper, GRIPPER_OPEN),
            'c' => self.set(Joint::Gripper, GRIPPER_CLOSED),
            'm' => Action::Send(Command::SetAllSmooth {
                vector: self.pose,
                duration_ms: TELEOP_SMOOTH_MS,
            }),
            'p' => {
                let name = self.library.next_free_name();
                self.library.insert(&name, self.pose);
                Action::Saved(name)
            }
            'l' => self.recall_next(),
            'x' => match self.recalled.take() {
                Some(name) if self.library.remove(&name) => Action::Deleted(name),
                _ => Action::Nothing,
            },
            'g' => {
                if self.library.is_empty() {
                    return Action::Nothing;
                }
                let playback = Playback::new(self.library.iter().cloned().collect(), self.step_delay);
                let steps = playback.len();
                self.playback = Some(playback);
                Action::Playing(steps)
            }
            'q' => Action::Quit,
            _ => Action::Nothing,
        }
    }

    /// Advance a playing sequence; call from the client loop
    pub fn tick(&mut self, now: Instant) -> Action {
        let Some(playback) = self.playback.as_mut() else {
            return Action::Nothing;
        };
        if let Some((_, command)) = playback.poll(now) {
            if let Command::SetAll { vector } = command {
                self.pose = vector;
            }
            return Action::Send(command);
        }
        if playback.is_finished(now) {
            self.playback = None;
            return Action::Finished;
        }
        Action::Nothing
    }

    fn recall_next(&mut self) -> Action {
        if self.library.is_empty() {
            return Action::Nothing;
        }
        let index = self.cursor % self.library.len();
        self.cursor = index + 1;
        match self.library.at(index) {
            Some(saved) => {
                let vector = saved.pose;
                self.recalled = Some(saved.name.clone());
                self.pose = vector;
                Action::Send(Command::SetAll { vector })
            }
            None => Action::Nothing,
        }
    }

    fn nudge(&mut self, up: bool) -> Action {
        let current = self.pose.get(self.selected);
        let angle = if up {
            current.saturating_add(self.step()).min(MAX_ANGLE)
        } else {
            current.saturating_sub(self.step()).max(MIN_ANGLE)
        };
        if angle == current {
            return Action::Nothing;
        }
        self.set(self.selected, angle)
    }

    fn set(&mut self, joint: Joint, angle: u8) -> Action {
        match self.pose.with(joint, angle) {
            Ok(pose) => {
                self.pose = pose;
                Action::Send(Command::SetSingle { joint, angle })
            }
            Err(_) => Action::Nothing,
        }
    }

    fn preset(&mut self, vector: JointVector) -> Action {
        self.pose = vector;
        Action::Send(Command::SetAll { vector })
    }
}
