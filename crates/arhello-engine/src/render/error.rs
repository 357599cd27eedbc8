/// Renderer setup failure. Fatal: the pipeline cannot draw without both
/// renderers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderSetupError {
    #[error("shader `{label}` failed to compile:\n{message}")]
    ShaderCompile { label: &'static str, message: String },

    #[error("shader `{label}` has no entry point `{entry_point}`")]
    ShaderLink {
        label: &'static str,
        entry_point: &'static str,
    },
}
