pub type FlyoverResult<T> = Result<T, FlyoverError>;

#[derive(thiserror::Error, Debug)]
pub enum FlyoverError {
    /// No mime type in the candidate list is both encodable and decodable on
    /// this runtime. Static per runtime; retrying cannot succeed.
    #[error("no supported video codec available on this runtime")]
    NoCodecAvailable,

    #[error("renderer init error: {0}")]
    RendererInit(String),

    #[error("renderer error: {0}")]
    Renderer(String),

    #[error("encoder error: {0}")]
    Encoder(String),

    /// The finalized capture payload contained zero bytes. Distinct from
    /// [`FlyoverError::Encoder`]: it can occur without any error event.
    #[error("encoder produced an empty payload")]
    EmptyOutput,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlyoverError {
    pub fn renderer_init(msg: impl Into<String>) -> Self {
        Self::RendererInit(msg.into())
    }

    pub fn renderer(msg: impl Into<String>) -> Self {
        Self::Renderer(msg.into())
    }

    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }
}
