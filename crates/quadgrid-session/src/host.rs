//! Scripted headless host.
//!
//! Drives a [`Session`] through the same lifecycle a windowed host would:
//! one `update` per input frame, `reset` on request, and a full
//! `pre_reload` / `post_reload` round trip for every reload step.

use serde::{Deserialize, Serialize};
use std::{fs, io::Write, path::Path};

use crate::{AssetSource, Canvas, ConfigIoError, InputFrame, Session, SessionError};

/// One step of a replay script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Frame(InputFrame),
    Reset,
    Reload,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub steps: Vec<ScriptStep>,
}

impl ReplayScript {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Counters collected while replaying.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplayReport {
    pub frames: usize,
    pub reloads: usize,
    pub saves: usize,
    pub decodes: Vec<Vec<u8>>,
}

/// Run `script` against `session`, returning the session that is live at the
/// end (a new one after every reload).
pub fn run_script(
    mut session: Session,
    script: &ReplayScript,
    assets: &mut dyn AssetSource,
    canvas: &mut dyn Canvas,
    out: &mut dyn Write,
) -> Result<(Session, ReplayReport), SessionError> {
    let mut report = ReplayReport::default();
    for step in &script.steps {
        match step {
            ScriptStep::Frame(input) => {
                let frame = session.update(input, canvas, assets, out)?;
                report.frames += 1;
                report.saves += usize::from(frame.saved);
                if let Some(bytes) = frame.decoded {
                    report.decodes.push(bytes);
                }
            }
            ScriptStep::Reset => session.reset(),
            ScriptStep::Reload => {
                let config = session.config().clone();
                let blob = session.pre_reload()?;
                session = Session::post_reload(blob, &*assets, config)?;
                report.reloads += 1;
                log::info!("reload #{} complete", report.reloads);
            }
        }
    }
    Ok((session, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryAssets, RecordingCanvas, SessionConfig};
    use nalgebra::Point2;
    use quadgrid_core::RgbaImage;

    #[test]
    fn script_parses_from_json() {
        let script: ReplayScript = serde_json::from_str(
            r#"{"steps":[
                {"op":"frame","pointer":[3.0,4.0],
                 "select_held":[true,false,false,false],"primary_pressed":true},
                {"op":"reload"},
                {"op":"reset"},
                {"op":"frame","decode":true}
            ]}"#,
        )
        .expect("script");
        assert_eq!(script.steps.len(), 4);
        assert_eq!(
            script.steps[0],
            ScriptStep::Frame(InputFrame::place_corner(0, 3.0, 4.0))
        );
        assert_eq!(script.steps[1], ScriptStep::Reload);
    }

    #[test]
    fn corners_placed_before_reload_drive_decode_after_it() {
        let mut assets = MemoryAssets::new(RgbaImage::filled(60, 60, [0, 0, 0, 255]));
        let mut cfg = SessionConfig::new("memory.png");
        cfg.seed = Some(5);
        let session = Session::init(&assets, cfg).expect("init");

        let script = ReplayScript {
            steps: vec![
                ScriptStep::Frame(InputFrame::place_corner(0, 0.0, 0.0)),
                ScriptStep::Frame(InputFrame::place_corner(1, 60.0, 0.0)),
                ScriptStep::Frame(InputFrame::place_corner(2, 0.0, 60.0)),
                ScriptStep::Frame(InputFrame::place_corner(3, 60.0, 60.0)),
                ScriptStep::Frame(InputFrame {
                    save: true,
                    ..InputFrame::default()
                }),
                ScriptStep::Reload,
                ScriptStep::Frame(InputFrame {
                    decode: true,
                    ..InputFrame::default()
                }),
            ],
        };

        let mut canvas = RecordingCanvas::default();
        let mut out = Vec::new();
        let (session, report) =
            run_script(session, &script, &mut assets, &mut canvas, &mut out).expect("replay");

        assert_eq!(report.frames, 6);
        assert_eq!(report.reloads, 1);
        assert_eq!(report.saves, 1);
        assert_eq!(report.decodes, vec![vec![0b111_1111u8; 66]]);
        assert_eq!(out.len(), 67);
        assert_eq!(session.corners().points[3], Point2::new(60.0, 60.0));
        assert!(assets.corners.is_some());
    }
}
