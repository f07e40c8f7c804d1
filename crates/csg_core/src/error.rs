use thiserror::Error;

/// Errors from editing or loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Light source not found: {0}")]
    LightNotFound(String),

    #[error("Name already in use: {0}")]
    DuplicateName(String),

    #[error("Cannot combine object {0} with itself")]
    SelfCombine(String),

    #[error(transparent)]
    UnknownRotationPlane(#[from] csg_math::ParsePlaneError),

    #[error("Unknown light color '{0}' (expected white, red, green or blue)")]
    UnknownLightColor(String),

    #[error("Scene description error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SceneResult<T> = Result<T, SceneError>;
