//! Shading program descriptions.
//!
//! Each program states its entry points, the resources it binds and the
//! vertex attributes it consumes. [`ShaderProgramSpec::validate`] parses and
//! validates the WGSL with naga and checks the module against that
//! description, so a bad shader is caught once at startup instead of as a
//! GPU validation panic mid-frame.

use std::collections::BTreeSet;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use tracing::debug;

use crate::error::ShaderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Uniform,
    ReadOnlyStorage,
}

/// One `@group(g) @binding(b)` resource the program expects
#[derive(Debug, Clone, Copy)]
pub struct ResourceSlot {
    pub name: &'static str,
    pub group: u32,
    pub binding: u32,
    pub kind: ResourceKind,
    pub visibility: wgpu::ShaderStages,
}

/// One `@location(n)` vertex input, packed in declaration order into a single buffer
#[derive(Debug, Clone, Copy)]
pub struct AttributeSlot {
    pub name: &'static str,
    pub location: u32,
    pub format: wgpu::VertexFormat,
}

#[derive(Debug, Clone, Copy)]
pub struct ShaderProgramSpec {
    pub label: &'static str,
    pub source: &'static str,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    pub resources: &'static [ResourceSlot],
    pub attributes: &'static [AttributeSlot],
}

/// The lit mesh program used by the viewer
pub const MESH_PROGRAM: ShaderProgramSpec = ShaderProgramSpec {
    label: "mesh_shader",
    source: include_str!("shaders/mesh.wgsl"),
    vertex_entry: "vs_main",
    fragment_entry: "fs_main",
    resources: &[
        ResourceSlot {
            name: "transforms",
            group: 0,
            binding: 0,
            kind: ResourceKind::Uniform,
            visibility: wgpu::ShaderStages::VERTEX,
        },
        ResourceSlot {
            name: "lighting",
            group: 0,
            binding: 1,
            kind: ResourceKind::Uniform,
            visibility: wgpu::ShaderStages::FRAGMENT,
        },
        ResourceSlot {
            name: "positions",
            group: 0,
            binding: 2,
            kind: ResourceKind::ReadOnlyStorage,
            visibility: wgpu::ShaderStages::VERTEX,
        },
        ResourceSlot {
            name: "indices",
            group: 0,
            binding: 3,
            kind: ResourceKind::ReadOnlyStorage,
            visibility: wgpu::ShaderStages::VERTEX,
        },
    ],
    attributes: &[AttributeSlot {
        name: "normal",
        location: 0,
        format: wgpu::VertexFormat::Float32x3,
    }],
};

impl ShaderProgramSpec {
    /// Parse (compile) and validate (link) the source against this description
    pub fn validate(&self) -> Result<naga::Module, ShaderError> {
        let module = naga::front::wgsl::parse_str(self.source).map_err(|e| ShaderError::Compile {
            label: self.label.to_string(),
            message: e.emit_to_string(self.source),
        })?;

        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .map_err(|e| self.link_error(e.emit_to_string(self.source)))?;

        self.check_entry_point(&module, self.vertex_entry, naga::ShaderStage::Vertex)?;
        self.check_entry_point(&module, self.fragment_entry, naga::ShaderStage::Fragment)?;
        self.check_resources(&module)?;
        self.check_attributes(&module)?;

        debug!(
            "shader '{}' validated: {} resources, {} vertex attributes",
            self.label,
            self.resources.len(),
            self.attributes.len()
        );
        Ok(module)
    }

    fn link_error(&self, message: impl Into<String>) -> ShaderError {
        ShaderError::Link { label: self.label.to_string(), message: message.into() }
    }

    fn check_entry_point(
        &self,
        module: &naga::Module,
        name: &str,
        stage: naga::ShaderStage,
    ) -> Result<(), ShaderError> {
        if module.entry_points.iter().any(|ep| ep.name == name && ep.stage == stage) {
            Ok(())
        } else {
            Err(self.link_error(format!("missing {stage:?} entry point '{name}'")))
        }
    }

    fn check_resources(&self, module: &naga::Module) -> Result<(), ShaderError> {
        let declared: Vec<_> = module
            .global_variables
            .iter()
            .filter_map(|(_, var)| var.binding.as_ref().map(|b| (var, b.group, b.binding)))
            .collect();

        for slot in self.resources {
            let Some((var, _, _)) = declared
                .iter()
                .find(|(_, group, binding)| *group == slot.group && *binding == slot.binding)
            else {
                return Err(self.link_error(format!(
                    "resource '{}' (group {}, binding {}) is not declared",
                    slot.name, slot.group, slot.binding
                )));
            };

            if var.name.as_deref() != Some(slot.name) {
                return Err(self.link_error(format!(
                    "group {} binding {} is '{}', expected '{}'",
                    slot.group,
                    slot.binding,
                    var.name.as_deref().unwrap_or("<unnamed>"),
                    slot.name
                )));
            }

            let kind_matches = match (slot.kind, var.space) {
                (ResourceKind::Uniform, naga::AddressSpace::Uniform) => true,
                (ResourceKind::ReadOnlyStorage, naga::AddressSpace::Storage { access }) => {
                    !access.contains(naga::StorageAccess::STORE)
                }
                _ => false,
            };
            if !kind_matches {
                return Err(self.link_error(format!(
                    "resource '{}' is declared as {:?}, expected {:?}",
                    slot.name, var.space, slot.kind
                )));
            }
        }

        if let Some((var, group, binding)) = declared.iter().find(|(_, group, binding)| {
            !self.resources.iter().any(|s| s.group == *group && s.binding == *binding)
        }) {
            return Err(self.link_error(format!(
                "resource '{}' (group {group}, binding {binding}) is not described",
                var.name.as_deref().unwrap_or("<unnamed>")
            )));
        }
        Ok(())
    }

    fn check_attributes(&self, module: &naga::Module) -> Result<(), ShaderError> {
        let Some(entry) = module
            .entry_points
            .iter()
            .find(|ep| ep.name == self.vertex_entry && ep.stage == naga::ShaderStage::Vertex)
        else {
            return Err(self.link_error(format!("missing vertex entry point '{}'", self.vertex_entry)));
        };

        let mut locations = BTreeSet::new();
        for arg in &entry.function.arguments {
            match (&arg.binding, &module.types[arg.ty].inner) {
                (Some(binding), _) => locations.extend(location_of(binding)),
                (None, naga::TypeInner::Struct { members, .. }) => {
                    locations.extend(members.iter().filter_map(|m| m.binding.as_ref().and_then(location_of)));
                }
                _ => {}
            }
        }

        let described: BTreeSet<u32> = self.attributes.iter().map(|a| a.location).collect();
        if locations != described {
            return Err(self.link_error(format!(
                "vertex inputs at locations {locations:?}, described {described:?}"
            )));
        }
        Ok(())
    }

    /// Layout entries for one bind group
    pub fn bind_group_layout_entries(&self, group: u32) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.resources
            .iter()
            .filter(|slot| slot.group == group)
            .map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: slot.visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: match slot.kind {
                        ResourceKind::Uniform => wgpu::BufferBindingType::Uniform,
                        ResourceKind::ReadOnlyStorage => {
                            wgpu::BufferBindingType::Storage { read_only: true }
                        }
                    },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect()
    }

    /// Attributes with tightly packed offsets, plus the resulting stride
    pub fn vertex_attributes(&self) -> (Vec<wgpu::VertexAttribute>, wgpu::BufferAddress) {
        let mut offset = 0;
        let attributes = self
            .attributes
            .iter()
            .map(|a| {
                let attribute = wgpu::VertexAttribute {
                    format: a.format,
                    offset,
                    shader_location: a.location,
                };
                offset += a.format.size();
                attribute
            })
            .collect();
        (attributes, offset)
    }
}

fn location_of(binding: &naga::Binding) -> Option<u32> {
    match binding {
        naga::Binding::Location { location, .. } => Some(*location),
        _ => None,
    }
}
