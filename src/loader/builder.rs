use rustc_hash::FxHashMap;

use crate::assets::{GeometryResolver, MaterialHandle, ResolvedResources};
use crate::document::Document;
use crate::errors::StructuralError;
use crate::scene::{MeshInstance, Node, NodeHandle, Primitive, SceneGraph, Transform};

enum Visit {
    Enter { index: usize, parent: NodeHandle },
    Exit(usize),
}

/// Name of the synthetic root when the scene has none.
pub const DEFAULT_ROOT_NAME: &str = "gltf_root";

/// Document node index → built node.
///
/// Nodes outside the instantiated scene map to `None`.
#[derive(Debug, Clone, Default)]
pub struct NodeMap(Vec<Option<NodeHandle>>);

impl NodeMap {
    #[must_use]
    pub fn get(&self, node_index: usize) -> Option<NodeHandle> {
        self.0.get(node_index).copied().flatten()
    }

    /// Number of document nodes (mapped or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mapped (document index, handle) pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, NodeHandle)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.map(|h| (i, h)))
    }
}

/// Output of a successful build. Nothing here is attached to a host yet.
#[derive(Debug)]
pub struct BuiltScene {
    pub graph: SceneGraph,
    /// Synthetic root parenting the scene's root nodes.
    pub root: NodeHandle,
    pub node_map: NodeMap,
    /// Every handle obtained from the resolver, each once.
    pub resources: ResolvedResources,
}

/// Instantiates one scene of a [`Document`].
///
/// Depth-first from the scene's root nodes. Meshes referenced by several
/// nodes are resolved once and share their handles.
pub struct SceneBuilder<'a, R: GeometryResolver + ?Sized> {
    document: &'a Document,
    resolver: &'a mut R,

    graph: SceneGraph,
    node_map: Vec<Option<NodeHandle>>,
    on_stack: Vec<bool>,

    mesh_cache: Vec<Option<Vec<Primitive>>>,
    material_cache: FxHashMap<Option<usize>, MaterialHandle>,
    resources: ResolvedResources,
}

impl<'a, R: GeometryResolver + ?Sized> SceneBuilder<'a, R> {
    /// Builds scene `scene_index` (or the document's default scene).
    ///
    /// All-or-nothing: on error no graph is returned and every handle
    /// resolved so far has been released back to `resolver`.
    pub fn build(
        document: &'a Document,
        scene_index: Option<usize>,
        resolver: &'a mut R,
    ) -> Result<BuiltScene, StructuralError> {
        document.validate()?;
        let (root_name, roots) = select_scene(document, scene_index)?;

        let mut builder = Self {
            document,
            resolver,
            graph: SceneGraph::new(),
            node_map: vec![None; document.nodes.len()],
            on_stack: vec![false; document.nodes.len()],
            mesh_cache: vec![None; document.meshes.len()],
            material_cache: FxHashMap::default(),
            resources: ResolvedResources::default(),
        };

        let root = builder.graph.create_node(Node::with_name(root_name));

        if let Err(err) = builder.instantiate_roots(&roots, root) {
            builder.resources.release_into(&mut *builder.resolver);
            return Err(err);
        }

        log::debug!(
            "Built scene: {} nodes, {} meshes, {} geometries",
            builder.graph.node_count(),
            builder.mesh_cache.iter().flatten().count(),
            builder.resources.geometries.len()
        );

        Ok(BuiltScene {
            graph: builder.graph,
            root,
            node_map: NodeMap(builder.node_map),
            resources: builder.resources,
        })
    }

    fn instantiate_roots(&mut self, roots: &[usize], root: NodeHandle) -> Result<(), StructuralError> {
        for &index in roots {
            self.instantiate(index, root)?;
        }

        // Without a scene list every node hangs below a parentless node,
        // unless its ancestor chain loops.
        if self.document.scenes.is_empty()
            && let Some(node) = self.node_map.iter().position(Option::is_none)
        {
            return Err(StructuralError::NodeCycle { node });
        }
        Ok(())
    }

    /// Instantiates the subtree of document node `root_index` under `parent`.
    ///
    /// Iterative depth-first walk; children keep document order. `on_stack`
    /// marks the current ancestor chain and is cleared by the `Exit` entry
    /// pushed beneath a node's children.
    fn instantiate(&mut self, root_index: usize, parent: NodeHandle) -> Result<(), StructuralError> {
        let document = self.document;
        let mut stack = vec![Visit::Enter {
            index: root_index,
            parent,
        }];

        while let Some(visit) = stack.pop() {
            let (index, parent) = match visit {
                Visit::Enter { index, parent } => (index, parent),
                Visit::Exit(index) => {
                    self.on_stack[index] = false;
                    continue;
                }
            };

            let desc = document
                .nodes
                .get(index)
                .ok_or_else(|| out_of_bounds("Node", index, document.nodes.len()))?;

            if self.on_stack[index] {
                return Err(StructuralError::NodeCycle { node: index });
            }
            if self.node_map[index].is_some() {
                return Err(StructuralError::MultipleParents { node: index });
            }

            let handle = self.create_node(index, parent)?;

            self.on_stack[index] = true;
            stack.push(Visit::Exit(index));
            stack.extend(desc.children.iter().rev().map(|&child| Visit::Enter {
                index: child,
                parent: handle,
            }));
        }

        Ok(())
    }

    fn create_node(&mut self, index: usize, parent: NodeHandle) -> Result<NodeHandle, StructuralError> {
        let document = self.document;
        let desc = &document.nodes[index];

        let name = desc
            .name
            .clone()
            .unwrap_or_else(|| format!("Node_{index}"));
        let mut node = Node::with_name(name);
        node.transform = Transform::from_node_transform(&desc.transform);
        node.source_index = Some(index);

        let handle = self.graph.create_node(node);
        self.graph.attach(handle, parent);
        self.node_map[index] = Some(handle);

        if let Some(mesh_index) = desc.mesh {
            let primitives = self.resolve_mesh(mesh_index)?;
            let mesh = &document.meshes[mesh_index];

            let mut instance = MeshInstance::new(
                mesh.name.clone().unwrap_or_else(|| format!("Mesh_{mesh_index}")),
                handle,
                mesh_index,
                primitives,
            );

            let target_count = mesh.morph_target_count();
            let initial = desc.weights.as_deref().unwrap_or(&mesh.weights);
            if target_count > 0 && !initial.is_empty() && initial.len() != target_count {
                log::warn!(
                    "Node {index}: {} default weights for {target_count} morph targets, resizing",
                    initial.len()
                );
            }
            instance.init_morph_targets(target_count, initial);

            self.graph.set_mesh(instance);
        }

        Ok(handle)
    }

    fn resolve_mesh(&mut self, mesh_index: usize) -> Result<Vec<Primitive>, StructuralError> {
        if let Some(Some(cached)) = self.mesh_cache.get(mesh_index) {
            return Ok(cached.clone());
        }

        let document = self.document;
        let mesh = document
            .meshes
            .get(mesh_index)
            .ok_or_else(|| out_of_bounds("Mesh", mesh_index, document.meshes.len()))?;

        let mut primitives = Vec::with_capacity(mesh.primitives.len());
        for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
            let geometry =
                self.resolver
                    .resolve_geometry(document, mesh_index, primitive_index, primitive)?;
            self.resources.geometries.push(geometry);

            let material = self.resolve_material(primitive.material)?;

            primitives.push(Primitive {
                geometry,
                material,
                skinned: primitive.is_skinned(),
            });
        }

        self.mesh_cache[mesh_index] = Some(primitives.clone());
        Ok(primitives)
    }

    fn resolve_material(&mut self, index: Option<usize>) -> Result<MaterialHandle, StructuralError> {
        if let Some(&handle) = self.material_cache.get(&index) {
            return Ok(handle);
        }

        let document = self.document;
        let desc = match index {
            Some(i) => Some((
                i,
                document
                    .materials
                    .get(i)
                    .ok_or_else(|| out_of_bounds("Material", i, document.materials.len()))?,
            )),
            None => None,
        };

        let handle = self.resolver.resolve_material(document, desc)?;
        self.resources.materials.push(handle);
        self.material_cache.insert(index, handle);
        Ok(handle)
    }
}

/// Root name and root node indices of the requested scene.
///
/// A document without a scene list only accepts index 0, which selects
/// every parentless node.
fn select_scene(
    document: &Document,
    requested: Option<usize>,
) -> Result<(String, Vec<usize>), StructuralError> {
    if document.scenes.is_empty() {
        let index = requested.unwrap_or(0);
        if index != 0 {
            return Err(StructuralError::SceneIndexOutOfRange { index, count: 0 });
        }
        return Ok((DEFAULT_ROOT_NAME.to_string(), document.parentless_nodes()));
    }

    let index = requested.unwrap_or_else(|| document.default_scene_index());
    let scene = document
        .scenes
        .get(index)
        .ok_or(StructuralError::SceneIndexOutOfRange {
            index,
            count: document.scenes.len(),
        })?;

    let name = scene
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_ROOT_NAME.to_string());
    Ok((name, scene.nodes.clone()))
}

fn out_of_bounds(context: &str, index: usize, len: usize) -> StructuralError {
    StructuralError::IndexOutOfBounds {
        context: context.to_string(),
        index,
        len,
    }
}
