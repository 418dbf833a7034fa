// Line command parser
//
// Grammar (one command per line, surrounding whitespace ignored):
//   S<index>:<angle>                    single joint
//   ALL:<a1>,<a2>,<a3>,<a4>,<a5>,<a6>   all joints
//   SMOOTH:<a1>,...,<a6>[,<ms>]         all joints, interpolated over ms

use std::fmt;

use crate::config::DEFAULT_SMOOTH_DURATION_MS;
use crate::error::{CommandError, DurationError, ParseError};
use crate::joint::{self, JOINT_COUNT, Joint, JointVector};

const PREFIX_ALL: &str = "ALL:";
const PREFIX_SMOOTH: &str = "SMOOTH:";
const PREFIX_SINGLE: char = 'S';

/// One parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetSingle { joint: Joint, angle: u8 },
    SetAll { vector: JointVector },
    SetAllSmooth { vector: JointVector, duration_ms: u32 },
    Unknown { raw: String },
}

/// Parse one raw line.
///
/// Returns `Ok(None)` for a blank line, which gets no response at all.
/// Unrecognized prefixes come back as `Command::Unknown`; everything with a
/// known prefix is either fully valid or an error. A bare `S` line only
/// counts as a single joint command once it has a ':'.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    // SMOOTH also starts with 'S', so the longer prefixes go first
    let command = if let Some(fields) = line.strip_prefix(PREFIX_SMOOTH) {
        parse_smooth(fields)?
    } else if let Some(fields) = line.strip_prefix(PREFIX_ALL) {
        Command::SetAll {
            vector: parse_vector(fields)?,
        }
    } else if let Some((index, angle)) = line
        .strip_prefix(PREFIX_SINGLE)
        .and_then(|rest| rest.split_once(':'))
    {
        parse_single(index, angle)?
    } else {
        Command::Unknown {
            raw: line.to_string(),
        }
    };

    Ok(Some(command))
}

fn parse_single(index: &str, angle: &str) -> Result<Command, CommandError> {
    let joint = Joint::from_index(parse_int(index)?)?;
    let angle = joint::angle(parse_int(angle)?)?;
    Ok(Command::SetSingle { joint, angle })
}

fn parse_vector(fields: &str) -> Result<JointVector, CommandError> {
    let values = split_fields(fields)?;
    if values.len() != JOINT_COUNT {
        return Err(ParseError::FieldCount {
            expected: "6",
            actual: values.len(),
        }
        .into());
    }
    Ok(JointVector::new(angles(&values))?)
}

fn parse_smooth(fields: &str) -> Result<Command, CommandError> {
    let values = split_fields(fields)?;
    let duration_ms = match values.len() {
        JOINT_COUNT => DEFAULT_SMOOTH_DURATION_MS,
        n if n == JOINT_COUNT + 1 => {
            let ms = values[JOINT_COUNT];
            if ms <= 0 {
                return Err(DurationError { value: ms }.into());
            }
            u32::try_from(ms).map_err(|_| ParseError::NotANumber {
                field: ms.to_string(),
            })?
        }
        actual => {
            return Err(ParseError::FieldCount {
                expected: "6 or 7",
                actual,
            }
            .into());
        }
    };

    let vector = JointVector::new(angles(&values))?;
    Ok(Command::SetAllSmooth {
        vector,
        duration_ms,
    })
}

/// Split on ',' and parse every field; any bad field rejects the whole line
fn split_fields(fields: &str) -> Result<Vec<i64>, ParseError> {
    fields.split(',').map(parse_int).collect()
}

fn angles(values: &[i64]) -> [i64; JOINT_COUNT] {
    let mut out = [0i64; JOINT_COUNT];
    out.copy_from_slice(&values[..JOINT_COUNT]);
    out
}

fn parse_int(field: &str) -> Result<i64, ParseError> {
    let field = field.trim();
    field.parse::<i64>().map_err(|_| ParseError::NotANumber {
        field: field.to_string(),
    })
}

/// Wire form of the command, without the trailing newline
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetSingle { joint, angle } => {
                write!(f, "{}{}:{}", PREFIX_SINGLE, joint.index(), angle)
            }
            Command::SetAll { vector } => write!(f, "{}{}", PREFIX_ALL, vector),
            Command::SetAllSmooth {
                vector,
                duration_ms,
            } => write!(f, "{}{},{}", PREFIX_SMOOTH, vector, duration_ms),
            Command::Unknown { raw } => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RangeError;

    fn parsed(line: &str) -> Command {
        parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line_is_ignored() {
        assert!(parse("").unwrap().is_none());
        assert!(parse("   \r\n").unwrap().is_none());
    }

    #[test]
    fn test_single_joint() {
        assert_eq!(
            parsed("S1:90"),
            Command::SetSingle {
                joint: Joint::Base,
                angle: 90
            }
        );
        assert_eq!(
            parsed("  S6:0\r\n"),
            Command::SetSingle {
                joint: Joint::Gripper,
                angle: 0
            }
        );
        // Multi-digit index text is accepted
        assert_eq!(
            parsed("S03:180"),
            Command::SetSingle {
                joint: Joint::Elbow,
                angle: 180
            }
        );
    }

    #[test]
    fn test_single_joint_rejections() {
        assert!(matches!(
            parse("S7:90"),
            Err(CommandError::Range(RangeError::Index { value: 7 }))
        ));
        assert!(matches!(
            parse("S0:90"),
            Err(CommandError::Range(RangeError::Index { value: 0 }))
        ));
        assert!(matches!(
            parse("S1:181"),
            Err(CommandError::Range(RangeError::Angle { value: 181 }))
        ));
        assert!(matches!(
            parse("S1:-5"),
            Err(CommandError::Range(RangeError::Angle { value: -5 }))
        ));
        assert!(matches!(
            parse("S1:abc"),
            Err(CommandError::Parse(ParseError::NotANumber { .. }))
        ));
        assert!(matches!(
            parse("S:90"),
            Err(CommandError::Parse(ParseError::NotANumber { .. }))
        ));
    }

    #[test]
    fn test_s_lines_without_separator_are_unknown() {
        for line in ["S190", "S", "Stop", "SMOOTH 0,0,0,0,0,0"] {
            assert_eq!(
                parsed(line),
                Command::Unknown {
                    raw: line.to_string()
                }
            );
        }
    }

    #[test]
    fn test_all_joints() {
        assert_eq!(
            parsed("ALL:10,20,30,40,50,60"),
            Command::SetAll {
                vector: JointVector::new([10, 20, 30, 40, 50, 60]).unwrap()
            }
        );
        assert_eq!(
            parsed("ALL: 10, 20 ,30,40,50,60"),
            Command::SetAll {
                vector: JointVector::new([10, 20, 30, 40, 50, 60]).unwrap()
            }
        );
    }

    #[test]
    fn test_all_joints_rejections() {
        assert!(matches!(
            parse("ALL:10,20,30,40,200,60"),
            Err(CommandError::Range(RangeError::Angle { value: 200 }))
        ));
        assert!(matches!(
            parse("ALL:1,2,3"),
            Err(CommandError::Parse(ParseError::FieldCount { actual: 3, .. }))
        ));
        assert!(matches!(
            parse("ALL:1,2,3,4,5,6,7"),
            Err(CommandError::Parse(ParseError::FieldCount { actual: 7, .. }))
        ));
        assert!(matches!(
            parse("ALL:1,2,3,x,5,6"),
            Err(CommandError::Parse(ParseError::NotANumber { .. }))
        ));
        assert!(matches!(
            parse("ALL:1,2,3,,5,6"),
            Err(CommandError::Parse(ParseError::NotANumber { .. }))
        ));
        // i64 overflow is a parse failure, not a wrap-around
        assert!(matches!(
            parse("ALL:1,2,3,4,5,99999999999999999999"),
            Err(CommandError::Parse(ParseError::NotANumber { .. }))
        ));
    }

    #[test]
    fn test_smooth_default_and_explicit_duration() {
        let vector = JointVector::new([0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(
            parsed("SMOOTH:0,0,0,0,0,0"),
            Command::SetAllSmooth {
                vector,
                duration_ms: 2000
            }
        );
        assert_eq!(
            parsed("SMOOTH:0,0,0,0,0,0,1000"),
            Command::SetAllSmooth {
                vector,
                duration_ms: 1000
            }
        );
    }

    #[test]
    fn test_smooth_rejections() {
        assert!(matches!(
            parse("SMOOTH:0,0,0,0,0,0,0"),
            Err(CommandError::Duration(DurationError { value: 0 }))
        ));
        assert!(matches!(
            parse("SMOOTH:0,0,0,0,0,0,-100"),
            Err(CommandError::Duration(DurationError { value: -100 }))
        ));
        assert!(matches!(
            parse("SMOOTH:0,0,0,0,0,0,9999999999"),
            Err(CommandError::Parse(ParseError::NotANumber { .. }))
        ));
        assert!(matches!(
            parse("SMOOTH:0,0,0,0,0"),
            Err(CommandError::Parse(ParseError::FieldCount { actual: 5, .. }))
        ));
        assert!(matches!(
            parse("SMOOTH:0,0,0,0,0,0,100,1"),
            Err(CommandError::Parse(ParseError::FieldCount { actual: 8, .. }))
        ));
        assert!(matches!(
            parse("SMOOTH:0,0,0,0,0,190,100"),
            Err(CommandError::Range(RangeError::Angle { value: 190 }))
        ));
    }

    #[test]
    fn test_unknown_prefixes() {
        assert_eq!(
            parsed("XYZ"),
            Command::Unknown {
                raw: "XYZ".to_string()
            }
        );
        // Prefixes are case sensitive
        assert!(matches!(parsed("all:1,2,3,4,5,6"), Command::Unknown { .. }));
        assert!(matches!(parsed("s1:90"), Command::Unknown { .. }));
    }

    #[test]
    fn test_display_produces_parseable_lines() {
        let commands = [
            Command::SetSingle {
                joint: Joint::WristTilt,
                angle: 33,
            },
            Command::SetAll {
                vector: JointVector::WORK,
            },
            Command::SetAllSmooth {
                vector: JointVector::REST,
                duration_ms: 1500,
            },
        ];
        for cmd in commands {
            let line = cmd.to_string();
            assert_eq!(parsed(&line), cmd, "line {:?}", line);
        }
        assert_eq!(
            Command::SetAllSmooth {
                vector: JointVector::WORK,
                duration_ms: 2000
            }
            .to_string(),
            "SMOOTH:90,45,135,90,90,90,2000"
        );
    }
}
