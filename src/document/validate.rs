use crate::document::Document;
use crate::errors::StructuralError;

fn check(context: impl FnOnce() -> String, index: usize, len: usize) -> Result<(), StructuralError> {
    if index < len {
        Ok(())
    } else {
        Err(StructuralError::IndexOutOfBounds {
            context: context(),
            index,
            len,
        })
    }
}

impl Document {
    /// Verifies every index the scene builder depends on.
    ///
    /// Joint lists and channel target nodes are not checked here: those are
    /// resolved against the built scene and fail per skin / per channel.
    pub fn validate(&self) -> Result<(), StructuralError> {
        let nodes = self.nodes.len();
        let accessors = self.accessors.len();

        for (i, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                check(|| format!("Node {i} child"), child, nodes)?;
            }
            if let Some(mesh) = node.mesh {
                check(|| format!("Node {i} mesh"), mesh, self.meshes.len())?;
            }
            if let Some(skin) = node.skin {
                check(|| format!("Node {i} skin"), skin, self.skins.len())?;
            }
        }

        for (m, mesh) in self.meshes.iter().enumerate() {
            for (p, primitive) in mesh.primitives.iter().enumerate() {
                for (semantic, accessor) in &primitive.attributes {
                    check(
                        || format!("Mesh {m} primitive {p} attribute {semantic} accessor"),
                        *accessor,
                        accessors,
                    )?;
                }
                if let Some(indices) = primitive.indices {
                    check(|| format!("Mesh {m} primitive {p} indices accessor"), indices, accessors)?;
                }
                if let Some(material) = primitive.material {
                    check(
                        || format!("Mesh {m} primitive {p} material"),
                        material,
                        self.materials.len(),
                    )?;
                }
                for (t, target) in primitive.targets.iter().enumerate() {
                    for (semantic, accessor) in &target.attributes {
                        check(
                            || format!("Mesh {m} primitive {p} morph target {t} {semantic} accessor"),
                            *accessor,
                            accessors,
                        )?;
                    }
                }
            }
        }

        for (s, skin) in self.skins.iter().enumerate() {
            if let Some(ibm) = skin.inverse_bind_matrices {
                check(|| format!("Skin {s} inverse bind matrices accessor"), ibm, accessors)?;
            }
        }

        for (a, animation) in self.animations.iter().enumerate() {
            for (s, sampler) in animation.samplers.iter().enumerate() {
                check(|| format!("Animation {a} sampler {s} input accessor"), sampler.input, accessors)?;
                check(|| format!("Animation {a} sampler {s} output accessor"), sampler.output, accessors)?;
            }
            for (c, channel) in animation.channels.iter().enumerate() {
                check(
                    || format!("Animation {a} channel {c} sampler"),
                    channel.sampler,
                    animation.samplers.len(),
                )?;
            }
        }

        for (s, scene) in self.scenes.iter().enumerate() {
            for &node in &scene.nodes {
                check(|| format!("Scene {s} root node"), node, nodes)?;
            }
        }

        if let Some(default_scene) = self.default_scene {
            check(|| "Default scene".to_string(), default_scene, self.scenes.len())?;
        }

        Ok(())
    }
}
