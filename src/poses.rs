// Saved poses and sequence playback for clients
//
// The library file is a JSON list of named angle sets, the same layout the
// desktop client keeps:
//   [ { "Nombre": "pick", "Angulos": [90, 45, 135, 90, 90, 90] } ]
//
// A sequence replays saved poses as ALL commands with a fixed pause after
// each step. Nothing is queued on the arm side; the client paces itself.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PoseError;
use crate::joint::{JOINT_COUNT, JointVector};
use crate::protocol::Command;

/// One entry of the library file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SavedPose {
    #[serde(rename = "Nombre")]
    name: String,
    #[serde(rename = "Angulos")]
    angles: [i64; JOINT_COUNT],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPose {
    pub name: String,
    pub pose: JointVector,
}

/// Named poses in the order they were saved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoseLibrary {
    poses: Vec<NamedPose>,
}

impl PoseLibrary {
    /// Read a library file; a missing file is an empty library
    pub fn load(path: &Path) -> Result<Self, PoseError> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let library = Self::from_json(&json)?;
                info!("Loaded {} saved poses from {}", library.len(), path.display());
                Ok(library)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No pose file at {}, starting empty", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the whole library, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> Result<(), PoseError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_json()?)?;
        debug!("Wrote {} poses to {}", self.len(), path.display());
        Ok(())
    }

    /// Parse the file contents. Every pose must be in range or the load fails.
    pub fn from_json(json: &str) -> Result<Self, PoseError> {
        let saved: Vec<SavedPose> = serde_json::from_str(json)?;
        let poses = saved
            .into_iter()
            .map(|s| match JointVector::new(s.angles) {
                Ok(pose) => Ok(NamedPose { name: s.name, pose }),
                Err(source) => Err(PoseError::Range {
                    name: s.name,
                    source,
                }),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { poses })
    }

    pub fn to_json(&self) -> Result<String, PoseError> {
        let saved: Vec<SavedPose> = self
            .poses
            .iter()
            .map(|p| SavedPose {
                name: p.name.clone(),
                angles: p.pose.as_array().map(i64::from),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&saved)?)
    }

    /// Store `pose` under `name`, overwriting a pose with the same name in place
    pub fn insert(&mut self, name: &str, pose: JointVector) {
        match self.poses.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.pose = pose,
            None => self.poses.push(NamedPose {
                name: name.to_string(),
                pose,
            }),
        }
    }

    /// Returns false when there was no such pose
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.poses.len();
        self.poses.retain(|p| p.name != name);
        self.poses.len() != before
    }

    pub fn get(&self, name: &str) -> Option<JointVector> {
        self.poses.iter().find(|p| p.name == name).map(|p| p.pose)
    }

    pub fn at(&self, index: usize) -> Option<&NamedPose> {
        self.poses.get(index)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedPose> {
        self.poses.iter()
    }

    /// First unused name of the form `pose<n>`
    pub fn next_free_name(&self) -> String {
        (1..)
            .map(|n| format!("pose{}", n))
            .find(|name| self.get(name).is_none())
            .unwrap_or_default()
    }
}

/// Plays poses in order: send a step, wait `delay`, send the next one.
///
/// Time is passed in by the caller so the client loop decides how often to poll.
#[derive(Debug)]
pub struct Playback {
    steps: Vec<NamedPose>,
    delay: Duration,
    next: usize,
    due: Option<Instant>,
}

impl Playback {
    pub fn new(steps: Vec<NamedPose>, delay: Duration) -> Self {
        Self {
            steps,
            delay,
            next: 0,
            due: None,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The step to send now, if the previous step's pause has run out
    pub fn poll(&mut self, now: Instant) -> Option<(&str, Command)> {
        if self.due.is_some_and(|due| now < due) {
            return None;
        }
        let step = self.steps.get(self.next)?;
        info!("Sequence step {}/{}: {}", self.next + 1, self.steps.len(), step.name);
        self.next += 1;
        self.due = Some(now + self.delay);
        Some((&step.name, Command::SetAll { vector: step.pose }))
    }

    /// Every step was sent and the pause after the last one is over
    pub fn is_finished(&self, now: Instant) -> bool {
        self.next >= self.steps.len() && self.due.is_none_or(|due| now >= due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RangeError;

    fn vector(values: [i64; JOINT_COUNT]) -> JointVector {
        JointVector::new(values).unwrap()
    }

    fn library() -> PoseLibrary {
        let mut lib = PoseLibrary::default();
        lib.insert("pick", vector([90, 45, 135, 90, 90, 0]));
        lib.insert("drop", vector([10, 60, 120, 90, 90, 180]));
        lib
    }

    #[test]
    fn test_reads_desktop_client_file() {
        let json = r#"[
            { "Nombre": "saludo", "Angulos": [90, 90, 90, 90, 90, 90] },
            { "Nombre": "garra", "Angulos": [0, 45, 180, 90, 90, 20] }
        ]"#;
        let lib = PoseLibrary::from_json(json).unwrap();
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("garra"), Some(vector([0, 45, 180, 90, 90, 20])));
        assert_eq!(lib.at(0).map(|p| p.name.as_str()), Some("saludo"));
    }

    #[test]
    fn test_out_of_range_pose_fails_the_load() {
        let json = r#"[{ "Nombre": "bad", "Angulos": [0, 0, 0, 0, 0, 200] }]"#;
        match PoseLibrary::from_json(json) {
            Err(PoseError::Range { name, source }) => {
                assert_eq!(name, "bad");
                assert_eq!(source, RangeError::Angle { value: 200 });
            }
            other => panic!("expected range error, got {:?}", other),
        }
        assert!(matches!(
            PoseLibrary::from_json(r#"[{ "Nombre": "short", "Angulos": [1, 2] }]"#),
            Err(PoseError::Json(_))
        ));
    }

    #[test]
    fn test_json_keeps_client_field_names() {
        let json: serde_json::Value = serde_json::from_str(&library().to_json().unwrap()).unwrap();
        assert_eq!(json[0]["Nombre"], "pick");
        assert_eq!(json[1]["Angulos"][5], 180);
    }

    #[test]
    fn test_insert_overwrites_and_remove_deletes() {
        let mut lib = library();
        lib.insert("pick", JointVector::HOME);
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("pick"), Some(JointVector::HOME));

        assert!(lib.remove("pick"));
        assert!(!lib.remove("pick"));
        assert_eq!(lib.get("pick"), None);
        assert_eq!(lib.at(0).map(|p| p.name.as_str()), Some("drop"));
    }

    #[test]
    fn test_next_free_name_skips_taken() {
        let mut lib = PoseLibrary::default();
        assert_eq!(lib.next_free_name(), "pose1");
        lib.insert("pose1", JointVector::HOME);
        lib.insert("pose3", JointVector::HOME);
        assert_eq!(lib.next_free_name(), "pose2");
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("braccio-poses-{}", std::process::id()));
        let path = dir.join("nested").join("poses.json");

        assert!(PoseLibrary::load(&path).unwrap().is_empty());
        library().save(&path).unwrap();
        assert_eq!(PoseLibrary::load(&path).unwrap(), library());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_playback_paces_steps() {
        let delay = Duration::from_millis(500);
        let mut playback = Playback::new(library().iter().cloned().collect(), delay);
        let t0 = Instant::now();

        let (name, cmd) = playback.poll(t0).unwrap();
        assert_eq!(name, "pick");
        assert_eq!(
            cmd,
            Command::SetAll {
                vector: vector([90, 45, 135, 90, 90, 0])
            }
        );
        assert!(playback.poll(t0 + Duration::from_millis(499)).is_none());

        let (name, _) = playback.poll(t0 + delay).unwrap();
        assert_eq!(name, "drop");
        assert!(!playback.is_finished(t0 + delay));

        // Last step still gets its pause
        assert!(playback.poll(t0 + delay * 2).is_none());
        assert!(playback.is_finished(t0 + delay * 2));
    }

    #[test]
    fn test_empty_playback_is_finished() {
        let mut playback = Playback::new(Vec::new(), Duration::from_millis(10));
        assert!(playback.is_empty());
        assert!(playback.poll(Instant::now()).is_none());
        assert!(playback.is_finished(Instant::now()));
    }
}
