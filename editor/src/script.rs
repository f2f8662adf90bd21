//! Line-oriented edit scripts.
//!
//! One command per line; blank lines and lines starting with `#` are
//! skipped. Lights are referenced by 0-based list index or by the word
//! `selected`.
//!
//! ```text
//! add spot
//! position 0 1 2 3
//! set selected color #ffb74d
//! preset 0 warm
//! mode r
//! drag 0 1 2 3 0 0 0.2588 0.9659 1 1 1
//! undo
//! save
//! ```

use std::path::{Path, PathBuf};

use lumen_core::abstract_editor::EditActionError;
use lumen_lights::scene::{self, SceneError};
use lumen_lights::{
    AreaShape, Color, GizmoPose, LightEditor, LightId, LightKind, LightingPreset, PropertyUpdate,
    RayVisibilityUpdate, TransformMode, TransformUpdate,
};

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}: {source}")]
    Edit {
        line: usize,
        source: EditActionError,
    },
    #[error("line {line}: {source}")]
    Scene { line: usize, source: SceneError },
}

/// Which light a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightRef {
    Index(usize),
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis3 {
    Position,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(LightKind),
    Remove(LightRef),
    Select(Option<LightRef>),
    Duplicate(LightRef),
    Reorder(LightRef, LightRef),
    Transform(LightRef, Axis3, [f32; 3]),
    Set(LightRef, PropertyUpdate),
    Preset(LightRef, LightingPreset),
    Mode(TransformMode),
    Drag(LightRef, GizmoPose),
    Undo,
    Redo,
    Save,
}

/// Parses one script line. Blank lines and comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.starts_with('#') {
        return Ok(None);
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&keyword, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match (keyword, args) {
        ("add", [kind]) => Command::Add(parse_with(kind)?),
        ("remove", [r]) => Command::Remove(parse_ref(r)?),
        ("select", ["none"]) => Command::Select(None),
        ("select", [r]) => Command::Select(Some(parse_ref(r)?)),
        ("duplicate", [r]) => Command::Duplicate(parse_ref(r)?),
        ("reorder", [source, target]) => {
            Command::Reorder(parse_ref(source)?, parse_ref(target)?)
        }
        ("position", [r, rest @ ..]) => {
            Command::Transform(parse_ref(r)?, Axis3::Position, floats(rest)?)
        }
        ("rotation", [r, rest @ ..]) => {
            Command::Transform(parse_ref(r)?, Axis3::Rotation, floats(rest)?)
        }
        ("scale", [r, rest @ ..]) => Command::Transform(parse_ref(r)?, Axis3::Scale, floats(rest)?),
        ("set", [r, field, value @ ..]) if !value.is_empty() => {
            Command::Set(parse_ref(r)?, parse_property(field, &value.join(" "))?)
        }
        ("preset", [r, preset]) => Command::Preset(parse_ref(r)?, parse_with(preset)?),
        ("mode", [mode]) => Command::Mode(parse_with(mode)?),
        ("drag", [r, rest @ ..]) => Command::Drag(parse_ref(r)?, parse_pose(rest)?),
        ("undo", []) => Command::Undo,
        ("redo", []) => Command::Redo,
        ("save", []) => Command::Save,
        _ => return Err(format!("cannot parse {line:?}")),
    };
    Ok(Some(command))
}

fn parse_with<T>(word: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    word.parse().map_err(|e: T::Err| e.to_string())
}

fn parse_ref(word: &str) -> Result<LightRef, String> {
    if word == "selected" {
        return Ok(LightRef::Selected);
    }
    word.parse()
        .map(LightRef::Index)
        .map_err(|_| format!("expected a light index or `selected`, got {word:?}"))
}

fn parse_float(word: &str) -> Result<f32, String> {
    word.parse()
        .map_err(|_| format!("expected a number, got {word:?}"))
}

fn floats<const N: usize>(words: &[&str]) -> Result<[f32; N], String> {
    if words.len() != N {
        return Err(format!("expected {N} numbers, got {}", words.len()));
    }
    let mut out = [0.0; N];
    for (slot, word) in out.iter_mut().zip(words) {
        *slot = parse_float(word)?;
    }
    Ok(out)
}

fn parse_bool(word: &str) -> Result<bool, String> {
    match word {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => Err(format!("expected true or false, got {word:?}")),
    }
}

fn parse_pose(words: &[&str]) -> Result<GizmoPose, String> {
    let values: [f32; 10] = floats(words)?;
    Ok(GizmoPose {
        position: [values[0], values[1], values[2]],
        rotation: [values[3], values[4], values[5], values[6]],
        scale: [values[7], values[8], values[9]],
    })
}

fn parse_property(field: &str, value: &str) -> Result<PropertyUpdate, String> {
    let mut update = PropertyUpdate::default();
    match field {
        "name" => update.name = Some(value.trim_matches('"').to_owned()),
        "power" => update.power = Some(parse_float(value)?),
        "color" => update.color = Some(parse_with::<Color>(value)?),
        "radius" => update.radius = Some(parse_float(value)?),
        "soft_falloff" => update.soft_falloff = Some(parse_bool(value)?),
        "shadow" => update.shadow = Some(parse_bool(value)?),
        "shadow_bias" => update.shadow_bias = Some(parse_float(value)?),
        "shadow_radius" => update.shadow_radius = Some(parse_float(value)?),
        "angle" => update.angle = Some(parse_float(value)?),
        "penumbra" => update.penumbra = Some(parse_float(value)?),
        "shape" => update.shape = Some(parse_with::<AreaShape>(value)?),
        "diffuse" | "glossy" | "transmission" | "volume_scatter" => {
            let visible = Some(parse_bool(value)?);
            let mut rays = RayVisibilityUpdate::default();
            match field {
                "diffuse" => rays.diffuse = visible,
                "glossy" => rays.glossy = visible,
                "transmission" => rays.transmission = visible,
                _ => rays.volume_scatter = visible,
            }
            update.ray_visibility = Some(rays);
        }
        other => return Err(format!("unknown property {other:?}")),
    }
    Ok(update)
}

/// Executes script commands against a [`LightEditor`].
pub struct ScriptRunner<'a> {
    editor: &'a mut LightEditor,
    output: Option<PathBuf>,
}

impl<'a> ScriptRunner<'a> {
    /// `output` is where `save` writes the scene.
    pub fn new(editor: &'a mut LightEditor, output: Option<&Path>) -> Self {
        Self {
            editor,
            output: output.map(Path::to_owned),
        }
    }

    /// Runs every line of `source`, stopping at the first failure.
    pub fn run(&mut self, source: &str) -> Result<usize, ScriptError> {
        let mut executed = 0;
        for (index, text) in source.lines().enumerate() {
            let line = index + 1;
            let command =
                parse_line(text).map_err(|message| ScriptError::Syntax { line, message })?;
            if let Some(command) = command {
                log::debug!("line {line}: {command:?}");
                self.execute(line, command)?;
                executed += 1;
            }
        }
        log::info!("script ran {executed} commands");
        Ok(executed)
    }

    fn execute(&mut self, line: usize, command: Command) -> Result<(), ScriptError> {
        let edit = |source| ScriptError::Edit { line, source };
        match command {
            Command::Add(kind) => {
                self.editor.add(kind).map_err(edit)?;
            }
            Command::Remove(r) => {
                let id = self.resolve(line, r)?;
                self.editor.remove(id).map_err(edit)?;
            }
            Command::Select(r) => {
                let id = r.map(|r| self.resolve(line, r)).transpose()?;
                self.editor.select(id).map_err(edit)?;
            }
            Command::Duplicate(r) => {
                let id = self.resolve(line, r)?;
                self.editor.duplicate(id).map_err(edit)?;
            }
            Command::Reorder(source, target) => {
                let source = self.resolve(line, source)?;
                let target = self.resolve(line, target)?;
                self.editor.reorder(source, target).map_err(edit)?;
            }
            Command::Transform(r, axis, values) => {
                let id = self.resolve(line, r)?;
                let update = match axis {
                    Axis3::Position => TransformUpdate::default().with_position(values),
                    Axis3::Rotation => TransformUpdate::default().with_rotation(values),
                    Axis3::Scale => TransformUpdate::default().with_scale(values),
                };
                self.editor.update_transform(id, update).map_err(edit)?;
            }
            Command::Set(r, update) => {
                let id = self.resolve(line, r)?;
                self.editor.update_properties(id, update).map_err(edit)?;
            }
            Command::Preset(r, preset) => {
                let id = self.resolve(line, r)?;
                self.editor.apply_preset(id, preset).map_err(edit)?;
            }
            Command::Mode(mode) => self.editor.set_mode(mode),
            Command::Drag(r, pose) => {
                let id = self.resolve(line, r)?;
                self.editor.begin_drag(id).map_err(edit)?;
                let moved = self.editor.drag_to(pose);
                self.editor.end_drag();
                moved.map_err(edit)?;
            }
            Command::Undo => self.editor.undo().map_err(edit)?,
            Command::Redo => self.editor.redo().map_err(edit)?,
            Command::Save => self.save(line)?,
        }
        Ok(())
    }

    fn save(&mut self, line: usize) -> Result<(), ScriptError> {
        let Some(path) = &self.output else {
            return Err(ScriptError::Syntax {
                line,
                message: "`save` needs an output path (--output)".into(),
            });
        };
        scene::write_scene(path, &self.editor.snapshot())
            .map_err(|source| ScriptError::Scene { line, source })?;
        self.editor.mark_saved();
        Ok(())
    }

    fn resolve(&self, line: usize, r: LightRef) -> Result<LightId, ScriptError> {
        let registry = self.editor.registry();
        let found = match r {
            LightRef::Index(index) => registry.lights().get(index).map(|light| light.id),
            LightRef::Selected => registry.selected(),
        };
        found.ok_or_else(|| ScriptError::Syntax {
            line,
            message: match r {
                LightRef::Index(index) => {
                    format!("no light at index {index} ({} lights)", registry.len())
                }
                LightRef::Selected => "no light is selected".into(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(editor: &mut LightEditor, source: &str) -> Result<usize, ScriptError> {
        ScriptRunner::new(editor, None).run(source)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_line("  # note").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(
            parse_line("add area").unwrap(),
            Some(Command::Add(LightKind::Area))
        );
        assert_eq!(
            parse_line("select none").unwrap(),
            Some(Command::Select(None))
        );
        assert_eq!(
            parse_line("scale selected 2 2 2").unwrap(),
            Some(Command::Transform(LightRef::Selected, Axis3::Scale, [2.0; 3]))
        );
        assert_eq!(
            parse_line("mode r").unwrap(),
            Some(Command::Mode(TransformMode::Rotate))
        );
    }

    #[test]
    fn parses_property_values() {
        let Some(Command::Set(LightRef::Index(1), update)) =
            parse_line("set 1 color #ffb74d").unwrap()
        else {
            panic!("expected a set command");
        };
        assert_eq!(update.color, Some(Color::rgb(0xff, 0xb7, 0x4d)));

        let Some(Command::Set(_, update)) = parse_line("set 0 name Key Light").unwrap() else {
            panic!("expected a set command");
        };
        assert_eq!(update.name.as_deref(), Some("Key Light"));

        let Some(Command::Set(_, update)) = parse_line("set 0 glossy off").unwrap() else {
            panic!("expected a set command");
        };
        assert_eq!(update.ray_visibility.unwrap().glossy, Some(false));
        assert_eq!(update.ray_visibility.unwrap().diffuse, None);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("add lamp").is_err());
        assert!(parse_line("position 0 1 2").is_err());
        assert!(parse_line("set 0 power lots").is_err());
        assert!(parse_line("set 0 sparkle 1").is_err());
        assert!(parse_line("undo 3").is_err());
        assert!(parse_line("drag 0 1 2 3").is_err());
    }

    #[test]
    fn runs_a_session() {
        let mut editor = LightEditor::new();
        let executed = run(
            &mut editor,
            "# key and fill\n\
             add spot\n\
             set selected name Key\n\
             preset 0 warm\n\
             add point\n\
             position 1 4 2 0\n\
             duplicate 0\n\
             reorder 2 0\n\
             undo\n",
        )
        .unwrap();
        assert_eq!(executed, 8);

        let lights = editor.registry().lights();
        assert_eq!(lights.len(), 3);
        assert_eq!(lights[0].name, "Key");
        assert_eq!(lights[0].power, 1000.0);
        assert_eq!(lights[1].position, [4.0, 2.0, 0.0]);
        assert_eq!(lights[2].name, "Key Copy");
    }

    #[test]
    fn drag_command_is_one_step() {
        let mut editor = LightEditor::new();
        run(
            &mut editor,
            "add point\nmode s\ndrag 0 0 0 0 0 0 0 1 3 3 3\n",
        )
        .unwrap();
        assert_eq!(editor.registry().lights()[0].scale, [3.0; 3]);
        assert_eq!(editor.registry().lights()[0].position, [0.0, 5.0, 0.0]);

        run(&mut editor, "undo").unwrap();
        assert_eq!(editor.registry().lights()[0].scale, [1.0; 3]);
    }

    #[test]
    fn errors_carry_line_numbers() {
        let mut editor = LightEditor::new();
        let err = run(&mut editor, "add point\n\nremove 4\n").unwrap_err();
        assert!(matches!(err, ScriptError::Syntax { line: 3, .. }));
        assert_eq!(err.to_string(), "line 3: no light at index 4 (1 lights)");

        let err = run(&mut editor, "redo").unwrap_err();
        assert!(matches!(err, ScriptError::Edit { line: 1, .. }));

        let err = run(&mut editor, "save").unwrap_err();
        assert!(matches!(err, ScriptError::Syntax { line: 1, .. }));
    }

    #[test]
    fn save_writes_scene_and_marks_clean() {
        let dir = std::env::temp_dir().join(format!("lumen-script-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.ron");

        let mut editor = LightEditor::new();
        ScriptRunner::new(&mut editor, Some(&path))
            .run("add directional\nsave\n")
            .unwrap();
        assert!(!editor.has_unsaved_changes());

        let saved = scene::read_scene(&path).unwrap();
        assert_eq!(saved, editor.snapshot());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
