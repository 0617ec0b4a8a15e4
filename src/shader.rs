use std::path::Path;

use glam::Mat4;
use glium::{
    backend::Facade,
    uniforms::{UniformValue, Uniforms},
    Program, ProgramCreationError,
};

use crate::{
    error::RenderError,
    load,
    texture::{CubeMapTexture, Texture2D},
};

/// A uniform resolved once at build time. Slots for uniforms the compiler dropped (or
/// that never existed) are invalid and every write to them is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformSlot(Option<usize>);

impl UniformSlot {
    pub const INVALID: UniformSlot = UniformSlot(None);
}

/// Resolve each name to a slot, using `exists` to ask the linked program.
fn resolve_slots<'n>(
    names: &[&'n str],
    exists: impl Fn(&str) -> bool,
) -> (Vec<&'n str>, Vec<UniformSlot>) {
    let mut resolved = Vec::new();
    let slots = names
        .iter()
        .map(|&name| {
            if exists(name) {
                resolved.push(name);
                UniformSlot(Some(resolved.len() - 1))
            } else {
                log::debug!("uniform `{name}` is not active in the program");
                UniformSlot::INVALID
            }
        })
        .collect();
    (resolved, slots)
}

/// A linked vertex + fragment program and the uniforms it was asked to expose.
pub struct Pipeline {
    program: Program,
    names: Vec<String>,
    slots: Vec<(String, UniformSlot)>,
}

impl Pipeline {
    pub fn build<F: Facade + ?Sized>(
        facade: &F,
        vertex_source: &str,
        fragment_source: &str,
        uniform_names: &[&str],
    ) -> Result<Self, RenderError> {
        let program = Program::from_source(facade, vertex_source, fragment_source, None)
            .map_err(|err| match err {
                ProgramCreationError::CompilationError(log, stage) => RenderError::ShaderCompile {
                    stage: format!("{stage:?}"),
                    log,
                },
                ProgramCreationError::LinkingError(log) => RenderError::ShaderLink(log),
                other => RenderError::ShaderLink(other.to_string()),
            })?;

        let (resolved, slots) =
            resolve_slots(uniform_names, |name| program.get_uniform(name).is_some());

        Ok(Self {
            program,
            names: resolved.into_iter().map(str::to_owned).collect(),
            slots: uniform_names
                .iter()
                .map(|name| (*name).to_owned())
                .zip(slots)
                .collect(),
        })
    }

    pub fn from_files<F: Facade + ?Sized>(
        facade: &F,
        vertex_path: &Path,
        fragment_path: &Path,
        uniform_names: &[&str],
    ) -> Result<Self, RenderError> {
        let vertex_source = load::read_shader_source(vertex_path)?;
        let fragment_source = load::read_shader_source(fragment_path)?;
        let pipeline = Self::build(facade, &vertex_source, &fragment_source, uniform_names)?;
        log::debug!(
            "built pipeline from {} + {}",
            vertex_path.display(),
            fragment_path.display()
        );
        Ok(pipeline)
    }

    /// The slot `name` resolved to at build time. Names that were never requested are
    /// invalid too.
    pub fn slot(&self, name: &str) -> UniformSlot {
        self.slots
            .iter()
            .find(|(n, _)| n == name)
            .map_or(UniformSlot::INVALID, |(_, slot)| *slot)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Start collecting this frame's values for this pipeline.
    pub fn uniforms(&self) -> UniformBlock<'_> {
        UniformBlock::new(&self.names)
    }
}

#[derive(Clone, Copy)]
enum Value<'a> {
    Mat4([[f32; 4]; 4]),
    Texture2d(&'a Texture2D),
    Cubemap(&'a CubeMapTexture),
}

/// Per-draw uniform values keyed by slot. Implements glium's `Uniforms`, which is how
/// the values reach the program at draw time.
pub struct UniformBlock<'a> {
    names: &'a [String],
    values: Vec<(usize, Value<'a>)>,
}

impl<'a> UniformBlock<'a> {
    fn new(names: &'a [String]) -> Self {
        Self {
            names,
            values: Vec::with_capacity(names.len()),
        }
    }

    fn set(&mut self, slot: UniformSlot, value: Value<'a>) {
        let Some(index) = slot.0.filter(|&i| i < self.names.len()) else {
            return;
        };
        match self.values.iter_mut().find(|(i, _)| *i == index) {
            Some(entry) => entry.1 = value,
            None => self.values.push((index, value)),
        }
    }

    pub fn set_matrix4(&mut self, slot: UniformSlot, value: Mat4) {
        self.set(slot, Value::Mat4(value.to_cols_array_2d()));
    }

    pub fn set_texture_2d(&mut self, slot: UniformSlot, texture: &'a Texture2D) {
        self.set(slot, Value::Texture2d(texture));
    }

    pub fn set_cube_map(&mut self, slot: UniformSlot, texture: &'a CubeMapTexture) {
        self.set(slot, Value::Cubemap(texture));
    }
}

impl Uniforms for UniformBlock<'_> {
    fn visit_values<'b, F: FnMut(&str, UniformValue<'b>)>(&'b self, mut output: F) {
        for (index, value) in &self.values {
            let value = match *value {
                Value::Mat4(matrix) => UniformValue::Mat4(matrix),
                Value::Texture2d(texture) => {
                    UniformValue::Texture2d(texture.texture(), Some(texture.sampler()))
                }
                Value::Cubemap(texture) => {
                    UniformValue::Cubemap(texture.texture(), Some(texture.sampler()))
                }
            };
            output(&self.names[*index], value);
        }
    }
}
