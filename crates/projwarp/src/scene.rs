use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use projwarp_geometry::Point2;
use projwarp_image::{ImageSize, PixelBuffer, Rgba8};
use projwarp_imgproc::{composite::DEFAULT_BACKGROUND, warp::WarpOptions};
use projwarp_io::{functional as F, IoError};
use projwarp_layer::{Layer, LayerError, LayerStack};

/// An error type for scene loading and rendering.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Error to read the scene file.
    #[error("Failed to read the scene file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to parse the scene description.
    #[error("Failed to parse the scene. {0}")]
    ParseError(#[from] serde_json::Error),

    /// The display size is empty.
    #[error("Invalid display size {0}x{1}")]
    InvalidSize(usize, usize),

    /// Error to read a layer image.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Error to build or paint a layer.
    #[error(transparent)]
    Layer(#[from] LayerError),
}

fn default_background() -> [u8; 4] {
    DEFAULT_BACKGROUND.to_array()
}

/// One layer of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Image file, relative to the scene file.
    pub path: PathBuf,
    /// Display shift applied after loading.
    #[serde(default)]
    pub translate: [i32; 2],
    /// Display positions of the lower-left, lower-right, upper-right and upper-left corners.
    #[serde(default)]
    pub corners: Option<[[f64; 2]; 4]>,
}

/// A display and the layers painted on it, bottom first.
///
/// ```json
/// {
///   "width": 640,
///   "height": 480,
///   "background": [13, 13, 13, 255],
///   "layers": [
///     { "path": "a.png", "translate": [10, 20] },
///     { "path": "b.png", "corners": [[0, 0], [200, 10], [190, 220], [5, 180]] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Display width in pixels.
    pub width: usize,
    /// Display height in pixels.
    pub height: usize,
    /// Display clear colour as `[r, g, b, a]`.
    #[serde(default = "default_background")]
    pub background: [u8; 4],
    /// The layers, bottom first.
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

impl SceneConfig {
    /// Parse a scene from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a scene from a JSON file.
    pub fn from_file(file_path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let json = std::fs::read_to_string(file_path)?;
        Self::from_json_str(&json)
    }

    /// The display size.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// A loaded scene ready to be painted.
#[derive(Debug, Clone)]
pub struct Scene {
    /// The display size.
    pub size: ImageSize,
    /// The display clear colour.
    pub background: Rgba8,
    /// The layers.
    pub stack: LayerStack,
    /// Options used for every warp and for compositing.
    pub options: WarpOptions,
}

impl Scene {
    /// Load a scene file and every image it references.
    ///
    /// Relative image paths are resolved against the directory of the scene file.
    pub fn load(file_path: impl AsRef<Path>, options: WarpOptions) -> Result<Self, SceneError> {
        let file_path = file_path.as_ref();
        let config = SceneConfig::from_file(file_path)?;
        let base_dir = file_path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_config(&config, base_dir, options)
    }

    /// Build a scene from its description.
    ///
    /// Each layer is pushed, shifted by `translate` and then warped onto `corners`.
    pub fn from_config(
        config: &SceneConfig,
        base_dir: &Path,
        options: WarpOptions,
    ) -> Result<Self, SceneError> {
        if config.width == 0 || config.height == 0 {
            return Err(SceneError::InvalidSize(config.width, config.height));
        }

        let mut stack = LayerStack::new();
        for layer_config in &config.layers {
            let image = F::read_image(base_dir.join(&layer_config.path))?;

            let mut layer = Layer::with_options(options);
            layer.set_image(image)?;
            let index = stack.push(layer).map_err(LayerError::from)?;

            let [dx, dy] = layer_config.translate;
            stack.translate(index, dx, dy)?;

            if let Some(corners) = layer_config.corners {
                stack.warp_quad(index, &corners.map(Point2::from))?;
            }

            log::debug!(
                "scene layer {index} from {}",
                layer_config.path.display()
            );
        }

        Ok(Self {
            size: config.size(),
            background: config.background.into(),
            stack,
            options,
        })
    }

    /// Paint every layer into a new display buffer.
    pub fn render(&self) -> Result<PixelBuffer, SceneError> {
        Ok(self
            .stack
            .composite(self.size, self.background, self.options.strategy)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projwarp_geometry::GeometryError;

    #[test]
    fn parse_defaults() -> Result<(), SceneError> {
        let config = SceneConfig::from_json_str(
            r#"{ "width": 8, "height": 6, "layers": [{ "path": "a.png" }] }"#,
        )?;
        assert_eq!(config.size(), ImageSize { width: 8, height: 6 });
        assert_eq!(config.background, [13, 13, 13, 255]);
        assert_eq!(
            config.layers,
            vec![LayerConfig {
                path: "a.png".into(),
                translate: [0, 0],
                corners: None,
            }]
        );
        Ok(())
    }

    #[test]
    fn parse_invalid() {
        let res = SceneConfig::from_json_str(r#"{ "width": 8 }"#);
        assert!(matches!(res, Err(SceneError::ParseError(_))));
    }

    #[test]
    fn load_and_render() -> Result<(), SceneError> {
        let tmp_dir = tempfile::tempdir()?;

        let red = Rgba8::new(255, 0, 0, 255);
        let image = PixelBuffer::from_size_val(ImageSize { width: 2, height: 2 }, red)
            .map_err(IoError::from)?;
        F::write_image_png(tmp_dir.path().join("red.png"), &image)?;

        let scene_path = tmp_dir.path().join("scene.json");
        std::fs::write(
            &scene_path,
            r#"{
                "width": 6,
                "height": 6,
                "background": [0, 0, 0, 255],
                "layers": [
                    { "path": "red.png", "translate": [1, 1] },
                    { "path": "red.png", "corners": [[4, 0], [6, 0], [6, 2], [4, 2]] }
                ]
            }"#,
        )?;

        let scene = Scene::load(&scene_path, WarpOptions::default())?;
        assert_eq!(scene.stack.len(), 2);

        let out = scene.render()?;
        let black = Rgba8::OPAQUE_BLACK;
        assert_eq!(out.size(), ImageSize { width: 6, height: 6 });
        assert_eq!(out.get(0, 0), Some(&black));
        assert_eq!(out.get(1, 1), Some(&red));
        assert_eq!(out.get(2, 2), Some(&red));
        assert_eq!(out.get(3, 3), Some(&black));
        assert_eq!(out.get(0, 4), Some(&red));
        assert_eq!(out.get(1, 5), Some(&red));
        Ok(())
    }

    #[test]
    fn degenerate_corners_rejected() -> Result<(), SceneError> {
        let tmp_dir = tempfile::tempdir()?;
        let image = PixelBuffer::create(2, 2, true).map_err(IoError::from)?;
        F::write_image_png(tmp_dir.path().join("a.png"), &image)?;

        let config = SceneConfig::from_json_str(
            r#"{ "width": 4, "height": 4,
                 "layers": [{ "path": "a.png", "corners": [[0, 0], [1, 1], [2, 2], [3, 3]] }] }"#,
        )?;
        let res = Scene::from_config(&config, tmp_dir.path(), WarpOptions::default());
        assert!(matches!(
            res,
            Err(SceneError::Layer(LayerError::Homography(
                GeometryError::SingularSystem
            )))
        ));
        Ok(())
    }

    #[test]
    fn empty_display_rejected() {
        let config = SceneConfig {
            width: 0,
            height: 4,
            background: default_background(),
            layers: vec![],
        };
        let res = Scene::from_config(&config, Path::new("."), WarpOptions::default());
        assert!(matches!(res, Err(SceneError::InvalidSize(0, 4))));
    }
}
