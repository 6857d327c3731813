//! Background loading of OBJ meshes and textures.
//!
//! Each request runs on its own thread via [`std::thread::spawn`] and sends its
//! result back over an [`mpsc`] channel. The frame loop calls
//! [`AssetLoader::poll`] at the start of a frame to attach whatever has arrived:
//!
//! ```ignore
//! let mut loader = AssetLoader::new(InitOptions::default());
//! let node = scene.create_node("ship", Some(Model::new("ship")), None, true)?;
//! loader.request_mesh(node, "assets/ship.obj");
//! // once per frame:
//! loader.poll(&mut scene);
//! ```
//!
//! Until then the model is not ready and the scene skips it. A failed mesh load
//! leaves the model not ready; a failed texture load leaves it untextured.

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::error::LoadError;
use crate::mesh::{InitOptions, Mesh, MeshBuilder};
use crate::scene::{NodeId, Scene};
use crate::texture::Texture;

/// How long [`AssetLoader::finish`] waits for a single result.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

enum LoadMessage {
    Mesh {
        node: NodeId,
        path: PathBuf,
        result: Result<Mesh, LoadError>,
    },
    Texture {
        source: String,
        result: Result<Texture, LoadError>,
    },
}

pub struct AssetLoader {
    sender: Sender<LoadMessage>,
    receiver: Receiver<LoadMessage>,
    in_flight: usize,
    init: InitOptions,
}

impl AssetLoader {
    /// `init` is applied to every mesh built on a loader thread.
    pub fn new(init: InitOptions) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
            init,
        }
    }

    /// Requests sent and not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// Load an OBJ file for the model of `node`.
    pub fn request_mesh(&mut self, node: NodeId, path: impl Into<PathBuf>) {
        let path = path.into();
        let sender = self.sender.clone();
        let init = self.init;
        self.in_flight += 1;
        log::debug!("loading mesh {}", path.display());

        thread::spawn(move || {
            let result = MeshBuilder::from_obj(&path).map(|builder| builder.build(init));
            let _ = sender.send(LoadMessage::Mesh { node, path, result });
        });
    }

    /// Load a texture for every model waiting on `source`.
    pub fn request_texture(&mut self, source: impl Into<String>) {
        let source = source.into();
        let sender = self.sender.clone();
        self.in_flight += 1;
        log::debug!("loading texture '{source}'");

        thread::spawn(move || {
            let result = Texture::load(&source);
            let _ = sender.send(LoadMessage::Texture { source, result });
        });
    }

    /// Request every texture a model in `scene` is still waiting for.
    pub fn request_pending_textures(&mut self, scene: &Scene) {
        let mut sources: Vec<String> = scene
            .graph()
            .render_order()
            .iter()
            .filter_map(|&id| scene.graph().node(id).model()?.pending_texture())
            .map(str::to_owned)
            .collect();
        sources.sort();
        sources.dedup();
        for source in sources {
            self.request_texture(source);
        }
    }

    /// Apply every result that has arrived, without blocking. Returns the number
    /// of assets attached.
    pub fn poll(&mut self, scene: &mut Scene) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.receiver.try_recv() {
            applied += self.apply(message, scene);
        }
        applied
    }

    /// Block until every request has been applied, or a result takes longer
    /// than [`LOAD_TIMEOUT`]. Returns the number of assets attached.
    pub fn finish(&mut self, scene: &mut Scene) -> usize {
        let mut applied = 0;
        while self.in_flight > 0 {
            match self.receiver.recv_timeout(LOAD_TIMEOUT) {
                Ok(message) => applied += self.apply(message, scene),
                Err(RecvTimeoutError::Timeout) => {
                    log::error!("gave up waiting for {} asset(s)", self.in_flight);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        applied
    }

    fn apply(&mut self, message: LoadMessage, scene: &mut Scene) -> usize {
        self.in_flight = self.in_flight.saturating_sub(1);
        match message {
            LoadMessage::Mesh { node, path, result } => {
                let mesh = match result {
                    Ok(mesh) => mesh,
                    Err(err) => {
                        log::warn!("mesh {} failed to load: {err}", path.display());
                        return 0;
                    }
                };
                if node.index() >= scene.graph().len() {
                    log::warn!(
                        "mesh {} arrived for unknown node #{}",
                        path.display(),
                        node.index()
                    );
                    return 0;
                }
                let mesh = scene
                    .library_mut()
                    .insert_built(path.display().to_string(), mesh);
                let Some(model) = scene.graph_mut().node_mut(node).model_mut() else {
                    log::warn!("mesh {} arrived for a group node", path.display());
                    return 0;
                };
                model.set_mesh(mesh);
                let pending = model.pending_texture().map(str::to_owned);
                log::info!("loaded mesh {}", path.display());
                if let Some(source) = pending {
                    self.request_texture(source);
                }
                1
            }
            LoadMessage::Texture { source, result } => {
                let texture = match result {
                    Ok(texture) => {
                        Some(scene.library_mut().insert_texture(source.as_str(), texture))
                    }
                    Err(err) => {
                        log::warn!("texture '{source}' failed to load: {err}");
                        None
                    }
                };
                let graph = scene.graph_mut();
                let mut applied = 0;
                for index in 0..graph.len() {
                    let Some(model) = graph.node_mut(NodeId(index)).model_mut() else {
                        continue;
                    };
                    if model.pending_texture() != Some(source.as_str()) {
                        continue;
                    }
                    match &texture {
                        Some(texture) => {
                            model.set_texture(Rc::clone(texture));
                            applied += 1;
                        }
                        None => model.texture_failed(),
                    }
                }
                if texture.is_some() {
                    log::info!("loaded texture '{source}' for {applied} model(s)");
                }
                applied
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSettings;
    use crate::model::Model;
    use std::fs;

    const TRIANGLE_OBJ: &str = "v 0 0 0\nv 10 0 0\nv 0 10 0\nf 1 2 3\n";

    fn scene() -> Scene {
        Scene::init_pipeline(RenderSettings::new(64, 64)).expect("valid canvas")
    }

    #[test]
    fn mesh_arrives_and_makes_the_model_ready() {
        let path = std::env::temp_dir().join(format!("softpipe-loader-{}.obj", std::process::id()));
        fs::write(&path, TRIANGLE_OBJ).expect("temp dir is writable");

        let mut scene = scene();
        let node = scene
            .create_node("tri", Some(Model::new("tri")), None, true)
            .expect("unique name");
        assert!(!scene.graph().node(node).is_ready());

        let mut loader = AssetLoader::new(InitOptions::default());
        loader.request_mesh(node, &path);
        assert_eq!(loader.in_flight(), 1);
        assert_eq!(loader.finish(&mut scene), 1);
        assert!(loader.is_idle());
        assert!(scene.graph().node(node).is_ready());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_mesh_leaves_the_model_pending() {
        let mut scene = scene();
        let node = scene
            .create_node("ghost", Some(Model::new("ghost")), None, true)
            .expect("unique name");
        let mut loader = AssetLoader::new(InitOptions::default());
        loader.request_mesh(node, "does/not/exist.obj");
        assert_eq!(loader.finish(&mut scene), 0);
        assert!(!scene.graph().node(node).is_ready());
    }

    #[test]
    fn texture_is_shared_by_all_waiting_models() {
        let mut scene = scene();
        let a = scene
            .create_node_with_builtin("a", "plane", 10.0, Some("rgb"), None)
            .expect("built in");
        let b = scene
            .create_node_with_builtin("b", "cube", 10.0, Some("rgb"), None)
            .expect("built in");

        let mut loader = AssetLoader::new(InitOptions::default());
        loader.request_pending_textures(&scene);
        assert_eq!(loader.in_flight(), 1);
        assert_eq!(loader.finish(&mut scene), 2);
        assert!(scene.graph().node(a).is_ready());
        assert!(scene.graph().node(b).is_ready());
    }

    #[test]
    fn failed_texture_falls_back_to_untextured() {
        let mut scene = scene();
        let node = scene
            .create_node_with_builtin("plane", "plane", 10.0, Some("missing.png"), None)
            .expect("built in");
        let mut loader = AssetLoader::new(InitOptions::default());
        loader.request_pending_textures(&scene);
        assert_eq!(loader.finish(&mut scene), 0);
        let node = scene.graph().node(node);
        assert!(node.is_ready());
        assert!(node.model().and_then(Model::texture).is_none());
    }
}
